//! # Spreadsheet Reading Module
//!
//! Reads Excel 2007+ packages (.xlsx, .xlsm, .xlam) into in-memory worksheets.
//! Cell values are decoded into typed [`CellValue`]s (numbers, text, booleans,
//! dates) at 1-based row/column positions. Only the worksheets selected by a
//! [`Criteria`] are decoded, so callers can list sheet names cheaply and then
//! read just the sheets they need.
pub mod cell;
pub mod criteria;
mod excel;
pub mod reference;
pub mod sheet;
pub mod xlsx;

pub use cell::Cell;
pub use cell::CellValue;
pub use cell::Position;
pub use criteria::Criteria;
pub use sheet::Worksheet;

use crate::error::FinsheetError;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

/// Errors raised while decoding a spreadsheet package.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Unsupported or unrecognized file format
    #[error("Unsupported spreadsheet format: '{0}'")]
    UnsupportedFormat(String),

    /// A required part is missing from the package
    #[error("Missing '{0}' in spreadsheet package")]
    FileError(String),

    /// A cell refers past the end of the shared string table
    #[error("Shared string index {0} is out of range")]
    SharedStringError(usize),

    /// The workbook lists no worksheets
    #[error("Spreadsheet '{0}' has no worksheets")]
    SpreadsheetEmptyError(String),
}

/// Common interface of spreadsheet readers.
pub trait Spreadsheet {
    /// File name of the spreadsheet
    fn name(&self) -> String;

    /// Worksheet names in workbook order, without decoding any cells
    fn sheet_names(&self) -> Vec<String>;

    /// Decodes the worksheets accepted by `criteria`
    fn read_workbook(&mut self, criteria: &Criteria) -> Result<Workbook, FinsheetError>;
}

/// Decoded worksheets of one spreadsheet file, in workbook order.
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    name: String,
    sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new(name: &str, sheets: Vec<Worksheet>) -> Self {
        Workbook {
            name: name.to_owned(),
            sheets,
        }
    }

    /// Opens a spreadsheet and decodes every worksheet.
    pub fn open(path: &Path) -> Result<Workbook, FinsheetError> {
        open_spreadsheet(path)?.read_workbook(&Criteria::all())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Worksheet::name).collect()
    }

    /// Finds a worksheet by its exact name.
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|sheet| sheet.name() == name)
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.sheets
    }
}

/// Opens a spreadsheet reader, choosing the format from the file extension.
pub fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, FinsheetError> {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlam" => Ok(Box::new(XlsxSpreadsheet::open(path)?)),
        _ => Err(SpreadsheetError::UnsupportedFormat(path.to_string_lossy().to_string()))?,
    }
}
