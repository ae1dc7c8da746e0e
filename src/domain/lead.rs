// src/domain/lead.rs

use crate::domain::fields::{Field, FieldSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend marker for "we have nothing for this field".
pub const NO_DATA: &str = "-";

/// What the operator sees instead of a missing value.
pub const PLACEHOLDER: &str = "N/A";

/// Separator for the formatted address sent to the street view endpoint.
pub const ADDRESS_SEPARATOR: &str = ", ";

/// One property/owner row exactly as the backend sent it.
///
/// Kept as a generic mapping so schema drift between deployments passes
/// through untouched; go through a [`FieldSchema`] to read known fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadRecord(Map<String, Value>);

impl LeadRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Raw lookup. A flat key wins; otherwise `a.b.c` walks nested objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(v) = self.0.get(key) {
            return Some(v);
        }
        if !key.contains('.') {
            return None;
        }
        let mut parts = key.split('.');
        let first = self.0.get(parts.next()?)?;
        parts.try_fold(first, |node, part| node.get(part))
    }

    /// Like [`get`](Self::get), but null, `""` and `"-"` count as absent.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !is_no_data(v))
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.value(key).and_then(render_scalar)
    }

    /// Text for display, never empty: missing data becomes [`PLACEHOLDER`].
    pub fn display(&self, key: &str) -> String {
        self.text(key).unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn field_text(&self, schema: &FieldSchema, field: Field) -> Option<String> {
        self.text(schema.key(field))
    }

    pub fn display_field(&self, schema: &FieldSchema, field: Field) -> String {
        self.display(schema.key(field))
    }

    /// "First Last", or whichever half exists.
    pub fn owner_name(&self, schema: &FieldSchema) -> Option<String> {
        let first = self.field_text(schema, Field::OwnerFirstName);
        let last = self.field_text(schema, Field::OwnerLastName);
        match (first, last) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(one), None) | (None, Some(one)) => Some(one),
            (None, None) => None,
        }
    }

    /// "123 Main St, Austin, TX 73301"
    pub fn summary_line(&self, schema: &FieldSchema) -> String {
        format!(
            "{}, {}, {} {}",
            self.display_field(schema, Field::PropertyAddress),
            self.display_field(schema, Field::City),
            self.display_field(schema, Field::State),
            self.display_field(schema, Field::Zip),
        )
    }

    /// Street, city, state and zip for the street view lookup.
    ///
    /// Missing parts are skipped; without a street there is nothing to look up.
    pub fn street_view_address(&self, schema: &FieldSchema) -> Option<String> {
        let street = self.field_text(schema, Field::PropertyAddress)?;
        let mut parts = vec![street];
        parts.extend(
            [Field::City, Field::State, Field::Zip]
                .into_iter()
                .filter_map(|f| self.field_text(schema, f)),
        );
        Some(parts.join(ADDRESS_SEPARATOR))
    }
}

impl From<Map<String, Value>> for LeadRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

pub fn is_no_data(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s == NO_DATA
        }
        _ => false,
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter(|v| !is_no_data(v))
                .filter_map(render_scalar)
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}
