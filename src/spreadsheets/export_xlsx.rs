use crate::domain::{Field, FieldSchema, LeadRecord};
use crate::errors::SearchError;
use rust_xlsxwriter::{Format, Workbook};
use serde_json::Value;

/// Writes `leads` to an in-memory workbook, one column per entry of `columns`.
///
/// Numbers stay numbers so the sheet can be sorted and summed; no-data
/// markers become empty cells.
pub fn export_leads_xlsx(
    leads: &[LeadRecord],
    schema: &FieldSchema,
    columns: &[Field],
) -> Result<Vec<u8>, SearchError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    // Headers
    for (col, field) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, field.label(), &bold)
            .map_err(|e| {
                SearchError::Export(format!("Failed to write header '{}': {}", field.label(), e))
            })?;
    }

    // Rows
    for (i, lead) in leads.iter().enumerate() {
        let r = (i + 1) as u32;

        for (col, field) in columns.iter().enumerate() {
            let col = col as u16;
            let key = schema.key(*field);

            let written = match lead.value(key) {
                None => continue,
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(num) => worksheet.write_number(r, col, num).map(|_| ()),
                    None => worksheet.write_string(r, col, n.to_string()).map(|_| ()),
                },
                Some(_) => match lead.text(key) {
                    Some(text) => worksheet.write_string(r, col, text).map(|_| ()),
                    None => continue,
                },
            };

            written.map_err(|e| {
                SearchError::Export(format!(
                    "Failed to write {} for row {}: {}",
                    field.label(),
                    r,
                    e
                ))
            })?;
        }
    }

    worksheet.autofit();

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| SearchError::Export(format!("Failed to save workbook: {}", e)))?;

    Ok(buffer)
}

/// `leads_90210.xlsx`, with anything odd in the key flattened to `_`.
pub fn export_filename(key: &str) -> String {
    let safe: String = key
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("leads_{safe}.xlsx")
}
