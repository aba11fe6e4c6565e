//! Flat label/value fields outside of subtables.
use crate::extract::subtable::ClaimedCells;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Position;
use crate::spreadsheet::Worksheet;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

/// A label with the value found next to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub label: String,
    pub value: CellValue,
    /// Position of the value cell
    pub position: Position,
    pub label_position: Position,
}

/// Fields keyed by label in first-seen order.
pub type Fields = IndexMap<String, Field>;

/// Scans unclaimed cells row by row for label/value pairs.
///
/// The value of a label is the cell to its right, or failing that the cell
/// below it unless that cell is a label with a value of its own. Value cells
/// are consumed and never become labels. A repeated label replaces the earlier
/// field but keeps its slot in the ordering.
pub fn parse(sheet: &Worksheet, claimed: &ClaimedCells) -> Fields {
    let mut consumed = claimed.clone();
    let mut fields = Fields::new();
    for cell in sheet.cells() {
        if consumed.contains(&cell.position) {
            continue;
        }
        let Some(label) = label_text(&cell.value) else {
            continue;
        };
        let right = cell.position.right();
        let below = cell.position.below();
        let position = if is_free(sheet, &consumed, right) {
            right
        } else if is_free(sheet, &consumed, below) && !has_own_value(sheet, &consumed, below) {
            below
        } else {
            continue;
        };
        consumed.claim(position);
        let field = Field {
            label: label.to_owned(),
            value: clean_value(sheet.value_at(position)),
            position,
            label_position: cell.position,
        };
        if let Some(previous) = fields.insert(label.to_owned(), field) {
            log::debug!(
                "Label '{}' in '{}' at {} replaces the one at {}",
                label,
                sheet.name(),
                cell.position,
                previous.label_position
            );
        }
    }
    fields
}

/// Trimmed label text with a trailing colon removed, if non-empty.
pub fn label_text(value: &CellValue) -> Option<&str> {
    value
        .as_text()
        .map(|text| text.strip_suffix(':').unwrap_or(text).trim_end())
        .filter(|text| !text.is_empty())
}

fn is_free(sheet: &Worksheet, consumed: &ClaimedCells, position: Position) -> bool {
    !sheet.value_at(position).is_empty() && !consumed.contains(&position)
}

fn has_own_value(sheet: &Worksheet, consumed: &ClaimedCells, position: Position) -> bool {
    label_text(sheet.value_at(position)).is_some() && is_free(sheet, consumed, position.right())
}

fn clean_value(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(text) => CellValue::Text(text.trim().to_owned()),
        other => other.clone(),
    }
}
