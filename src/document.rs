//! The JSON document written for each extracted workbook.
use crate::extract::fields::Fields;
use crate::extract::financials::FinancialsSection;
use crate::extract::info::InfoSection;
use crate::extract::ranking::RankedEntry;
use crate::extract::ranking::Ranking;
use crate::extract::subtable::Subtable;
use crate::extract::subtable::SubtableRow;
use crate::extract::ExtractError;
use crate::error::FinsheetError;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Position;
use chrono::DateTime;
use chrono::Utc;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Everything extracted from one source file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Assembly time, UTC
    pub extracted_at: DateTime<Utc>,
    /// File name of the source workbook, without directories
    pub source_file: String,
    #[serde(rename = "i_Setup")]
    pub setup: SetupSection,
    #[serde(rename = "i_COS")]
    pub cost_of_sales: CostOfSalesSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<InfoSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financials: Option<FinancialsSection>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupSection {
    pub sheet_name: String,
    pub field_count: usize,
    /// label → value
    pub fields: IndexMap<String, CellValue>,
    /// label → position of the value cell
    pub field_cells: IndexMap<String, Position>,
    pub subtable_count: usize,
    pub subtable_row_count: usize,
    pub subtables: Vec<Subtable>,
}

impl SetupSection {
    pub fn new(sheet_name: &str, fields: Fields, subtables: Vec<Subtable>) -> Self {
        let mut section = SetupSection {
            sheet_name: sheet_name.to_owned(),
            field_count: fields.len(),
            subtable_count: subtables.len(),
            subtable_row_count: subtables.iter().map(|table| table.rows.len()).sum(),
            subtables,
            ..SetupSection::default()
        };
        for (label, field) in fields {
            section.field_cells.insert(label.to_owned(), field.position);
            section.fields.insert(label, field.value);
        }
        section
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProducts {
    pub by_weighting: Vec<RankedEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostOfSalesSection {
    pub sheet_name: String,
    pub product_count: usize,
    /// Header the ranking used, `null` when the table has none
    pub weighting_column: Option<String>,
    pub products: Vec<SubtableRow>,
    pub top_products: TopProducts,
}

impl CostOfSalesSection {
    pub fn new(sheet_name: &str, table: &Subtable, ranking: Ranking) -> Self {
        CostOfSalesSection {
            sheet_name: sheet_name.to_owned(),
            product_count: table.rows.len(),
            weighting_column: ranking.weighting_column,
            products: table.rows.clone(),
            top_products: TopProducts {
                by_weighting: ranking.entries,
            },
        }
    }

    /// Section for a sheet without any product table.
    pub fn empty(sheet_name: &str) -> Self {
        CostOfSalesSection {
            sheet_name: sheet_name.to_owned(),
            ..CostOfSalesSection::default()
        }
    }
}

impl ExtractionResult {
    pub fn to_json(&self) -> Result<String, FinsheetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<ExtractionResult, FinsheetError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// `<dir>/<stem>.json` next to the source workbook.
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension("json")
}

/// Writes the document through a temporary sibling file renamed into place,
/// so the target path never holds a partial document.
pub fn write_result(result: &ExtractionResult, path: &Path) -> Result<(), FinsheetError> {
    let json = result.to_json()?;
    let temporary = path.with_extension("json.tmp");
    let write = || -> std::io::Result<()> {
        let mut file = File::create(&temporary)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        fs::rename(&temporary, path)
    };
    if let Err(source) = write() {
        let _ = fs::remove_file(&temporary);
        Err(ExtractError::WriteFailure {
            path: path.to_owned(),
            source,
        })?
    }
    log::info!("Wrote '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fields::Field;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn result() -> ExtractionResult {
        let mut fields = Fields::new();
        fields.insert(
            "Company Name".to_owned(),
            Field {
                label: "Company Name".to_owned(),
                value: CellValue::from("Acme Corp"),
                position: Position::new(1, 2),
                label_position: Position::new(1, 1),
            },
        );
        let mut row = SubtableRow::new();
        row.insert("Product".to_owned(), CellValue::from("A"));
        row.insert("Weighting".to_owned(), CellValue::Number(0.4));
        let table = Subtable {
            sheet: "i_COS".to_owned(),
            anchor: Position::new(1, 1),
            headers: vec!["Product".to_owned(), "Weighting".to_owned()],
            rows: vec![row.clone()],
        };
        let ranking = Ranking {
            weighting_column: Some("Weighting".to_owned()),
            product_column: Some("Product".to_owned()),
            entries: vec![RankedEntry {
                product: "A".to_owned(),
                weighting: 0.4,
                row: 2,
                data: row,
            }],
        };
        ExtractionResult {
            extracted_at: Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap(),
            source_file: "acme.xlsx".to_owned(),
            setup: SetupSection::new("i_Setup", fields, Vec::new()),
            cost_of_sales: CostOfSalesSection::new("i_COS", &table, ranking),
            info: None,
            financials: None,
        }
    }

    #[test]
    fn json_shape() {
        let json: serde_json::Value = serde_json::from_str(&result().to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "extractedAt": "2026-10-18T10:00:00Z",
                "sourceFile": "acme.xlsx",
                "i_Setup": {
                    "sheetName": "i_Setup",
                    "fieldCount": 1,
                    "fields": { "Company Name": "Acme Corp" },
                    "fieldCells": { "Company Name": "B1" },
                    "subtableCount": 0,
                    "subtableRowCount": 0,
                    "subtables": []
                },
                "i_COS": {
                    "sheetName": "i_COS",
                    "productCount": 1,
                    "weightingColumn": "Weighting",
                    "products": [{ "Product": "A", "Weighting": 0.4 }],
                    "topProducts": {
                        "byWeighting": [{
                            "product": "A",
                            "weighting": 0.4,
                            "row": 2,
                            "data": { "Product": "A", "Weighting": 0.4 }
                        }]
                    }
                }
            })
        );
    }

    #[test]
    fn json_round_trip() {
        let mut original = result();
        original.info = Some(InfoSection {
            sheet_name: "Info".to_owned(),
            ..InfoSection::default()
        });
        let parsed = ExtractionResult::from_json(&original.to_json().unwrap()).unwrap();
        assert_eq!(parsed, original);
        let keys: Vec<&String> = parsed.cost_of_sales.products[0].keys().collect();
        assert_eq!(keys, vec!["Product", "Weighting"]);
    }

    #[test]
    fn output_next_to_source() {
        assert_eq!(output_path(Path::new("/data/acme.xlsx")), PathBuf::from("/data/acme.json"));
        assert_eq!(output_path(Path::new("models/acme.v2.XLSM")), PathBuf::from("models/acme.v2.json"));
    }

    #[test]
    fn writes_atomically() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("acme.json");
        write_result(&result(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(ExtractionResult::from_json(&written).unwrap(), result());
        assert!(!directory.path().join("acme.json.tmp").exists());
    }

    #[test]
    fn write_failure_is_reported() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("missing").join("acme.json");
        let error = write_result(&result(), &path).unwrap_err();
        assert!(matches!(error.as_extract_error(), Some(ExtractError::WriteFailure { .. })));
        assert!(!path.exists());
    }
}
