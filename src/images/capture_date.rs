use chrono::NaiveDate;

/// `"2019-05"` -> `"May, 2019"`. Anything unparseable yields `None`.
pub fn format_capture_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.format("%B, %Y").to_string())
}
