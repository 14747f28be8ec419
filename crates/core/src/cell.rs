use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Serial of 1970-01-01 in the 1900 date system
const UNIX_EPOCH_SERIAL: f64 = 25569.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// A date/time cell, kept as the spreadsheet serial number (1900 date system).
///
/// Whole part = days since 1899-12-30, fractional part = time of day. Serials
/// below 60 are one day short of that count because the 1900 system includes
/// a 1900-02-29 that never existed. Workbooks saved in the 1904 system are
/// normalized to this system on import.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExcelDate(pub f64);

impl ExcelDate {
    /// Serial for a calendar date/time, at millisecond precision
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        let days = dt.and_utc().timestamp_millis() as f64 / MS_PER_DAY + UNIX_EPOCH_SERIAL;
        // 1899-12-31 .. 1900-02-28
        if days < 61.0 {
            ExcelDate(days - 1.0)
        } else {
            ExcelDate(days)
        }
    }

    pub fn serial(&self) -> f64 {
        self.0
    }

    /// True when the serial carries a time-of-day component
    pub fn has_time(&self) -> bool {
        self.0.fract().abs() > 0.0001 // Small epsilon for float comparison
    }

    /// Convert to a calendar date/time. None when the serial is out of range.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        if !self.0.is_finite() || self.0 < 0.0 {
            return None;
        }
        let days = if self.0 < 60.0 { self.0 + 1.0 } else { self.0 };
        let millis = ((days - UNIX_EPOCH_SERIAL) * MS_PER_DAY).round() as i64;
        DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
    }

    /// ISO-8601 rendering: `YYYY-MM-DD` for pure dates, `YYYY-MM-DDTHH:MM:SS` otherwise.
    /// Falls back to the raw serial if it cannot be represented.
    pub fn to_iso(&self) -> String {
        match self.to_datetime() {
            Some(dt) if self.has_time() => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => format!("{}", self.0),
        }
    }
}

/// A single cell value as read from a workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(ExcelDate),
}

impl CellValue {
    /// Blank cells are never consolidated. Absent cells and empty strings are
    /// the same sentinel; `0`, `false` and whitespace-only text are not blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Display text. Integers render without decimals.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            CellValue::Date(d) => d.to_iso(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

// Cells serialize as plain JSON scalars, the shape consumers of the
// consolidated dataset expect.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Date(d) => serializer.serialize_str(&d.to_iso()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_sentinels() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text(String::new()).is_blank());
        assert!(!CellValue::Text(" ".to_string()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Bool(false).is_blank());
        assert!(!CellValue::Date(ExcelDate(0.0)).is_blank());
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(42.0).display(), "42");
        assert_eq!(CellValue::Number(3.5).display(), "3.5");
        assert_eq!(CellValue::Bool(false).display(), "false");
        assert_eq!(CellValue::from("abc").display(), "abc");
        assert_eq!(CellValue::Empty.display(), "");
    }

    #[test]
    fn test_excel_date_known_serials() {
        // 45292 = 2024-01-01
        assert_eq!(ExcelDate(45292.0).to_iso(), "2024-01-01");
        // 44927.5 = 2023-01-01 12:00
        assert_eq!(ExcelDate(44927.5).to_iso(), "2023-01-01T12:00:00");
        assert_eq!(ExcelDate(-1.0).to_iso(), "-1");
    }

    #[test]
    fn test_excel_date_before_march_1900() {
        assert_eq!(ExcelDate(1.0).to_iso(), "1900-01-01");
        assert_eq!(ExcelDate(59.0).to_iso(), "1900-02-28");
        assert_eq!(ExcelDate(61.0).to_iso(), "1900-03-01");
        assert_eq!(ExcelDate(32.25).to_iso(), "1900-02-01T06:00:00");
    }

    #[test]
    fn test_excel_date_from_datetime() {
        let at = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(ExcelDate::from_datetime(at(2024, 1, 1)), ExcelDate(45292.0));
        assert_eq!(ExcelDate::from_datetime(at(1900, 3, 1)), ExcelDate(61.0));
        assert_eq!(ExcelDate::from_datetime(at(1900, 2, 28)), ExcelDate(59.0));
        assert_eq!(ExcelDate::from_datetime(at(1900, 1, 1)), ExcelDate(1.0));

        let noon = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(ExcelDate::from_datetime(noon), ExcelDate(44927.5));
        assert_eq!(ExcelDate::from_datetime(noon).to_datetime(), Some(noon));
    }

    #[test]
    fn test_serialize_scalars() {
        let values = vec![
            CellValue::from("x"),
            CellValue::Number(7.0),
            CellValue::Number(0.25),
            CellValue::Bool(true),
            CellValue::Date(ExcelDate(45292.0)),
            CellValue::Empty,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"["x",7,0.25,true,"2024-01-01",null]"#);
    }
}
