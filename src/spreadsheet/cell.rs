use crate::error::FinsheetError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::SpreadsheetError;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Timelike;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;

/// Storage type of a raw cell as it appears in the package, before decoding.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Plain numeric values
    Number,
    /// Numeric values carrying a date or time number format
    DateTime,
    /// ISO 8601 date/time strings (`t="d"`)
    IsoDateTime,
    /// Inline strings and formula string results
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values (#N/A, #DIV/0!, ...)
    Error,
}

impl CellType {
    /// Built-in number format IDs that render as dates or times.
    pub(crate) fn parse_builtin_number_format_id(id: &str) -> Option<Self> {
        match id {
            "14" | "15" | "16" | "17" | "18" | "19" | "20" | "21" | "22" | "45" | "46" | "47" => Some(Self::DateTime),
            _ => None,
        }
    }

    /// Scans a custom format code for date/time tokens, skipping escapes,
    /// quoted literals and bracketed sections such as `[Red]`.
    pub(crate) fn parse_custom_number_format(format: &str) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_temporal = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' | 'H' | 'h' | 'S' | 's' => is_temporal = true,
                _ => (),
            }
        }
        if is_temporal {
            Self::DateTime
        } else {
            Self::Number
        }
    }

    /// Decodes a raw value of this type into a typed cell value.
    pub(crate) fn to_value(self, raw: &str, shared_strings: &[String], is_1904: bool) -> Result<CellValue, FinsheetError> {
        let value = match self {
            Self::Empty | Self::Error => CellValue::Empty,
            Self::Boolean => CellValue::Boolean(raw.trim() == "1" || raw.trim().eq_ignore_ascii_case("true")),
            Self::Number => CellValue::Number(raw.trim().parse::<f64>()?),
            Self::DateTime => {
                let serial = raw.trim().parse::<f64>()?;
                excel_serial_to_datetime(serial, is_1904)
                    .map(CellValue::Date)
                    .unwrap_or(CellValue::Number(serial))
            }
            Self::IsoDateTime => parse_iso_datetime(raw)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(raw.to_owned())),
            Self::InlineString => CellValue::Text(raw.to_owned()),
            Self::SharedString => {
                let index = raw.trim().parse::<usize>()?;
                let text = shared_strings
                    .get(index)
                    .ok_or(SpreadsheetError::SharedStringError(index))?;
                CellValue::Text(text.to_owned())
            }
        };
        Ok(value)
    }
}

/// Converts an Excel serial number to a date-time.
/// Serials below 60 are shifted by one day to undo the Lotus 1-2-3 leap year bug.
pub(crate) fn excel_serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch.checked_add_signed(Duration::days(days + offset) + Duration::milliseconds(milliseconds))
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Typed value of a worksheet cell.
///
/// Serializes to JSON `null`, booleans, numbers and strings for text. Dates
/// become `{"date": "2024-01-01T00:00:00"}` so that date-like text reads back
/// as text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    Date(#[serde(with = "tagged_date")] NaiveDateTime),
    Text(String),
}

mod tagged_date {
    use chrono::NaiveDateTime;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serialize;
    use serde::Serializer;

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Tagged {
        date: NaiveDateTime,
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged { date: *value }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        Tagged::deserialize(deserializer).map(|tagged| tagged.date)
    }
}

impl CellValue {
    /// True for empty cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// True for non-empty text cells.
    pub fn is_text(&self) -> bool {
        matches!(self, CellValue::Text(_)) && !self.is_empty()
    }

    /// Trimmed text content of a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text.trim()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) => Some(*number),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(value) => write!(f, "{}", value),
            CellValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => write!(f, "{}", *value as i64),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Date(value) if value.num_seconds_from_midnight() == 0 && value.nanosecond() == 0 => {
                write!(f, "{}", value.format("%Y-%m-%d"))
            }
            CellValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(value) => write!(f, "{}", value.trim()),
        }
    }
}

/// 1-based (row, column) position. Ordering is row-major.
/// Serializes as an A1-style reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Position { row, column }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.column)
    }

    pub fn right(&self) -> Position {
        Position::new(self.row, self.column + 1)
    }

    pub fn below(&self) -> Position {
        Position::new(self.row + 1, self.column)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.reference()
    }
}

impl TryFrom<String> for Position {
    type Error = String;

    fn try_from(reference: String) -> Result<Self, Self::Error> {
        reference_to_index(&reference)
            .map(|(row, column)| Position::new(row, column))
            .ok_or_else(|| format!("invalid cell reference '{}'", reference))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reference())
    }
}

/// A single decoded cell in a worksheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub position: Position,
    pub value: CellValue,
}

impl Cell {
    pub fn new(row: usize, column: usize, value: impl Into<CellValue>) -> Self {
        Cell {
            position: Position::new(row, column),
            value: value.into(),
        }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        self.position.reference()
    }
}
