//! # finsheet
//!
//! Extracts structured data from financial template workbooks (.xlsx, .xlsm)
//! and writes it as JSON next to the source file.
//!
//! ## Features
//!
//! - **Sheet resolution**: finds the setup, cost-of-sales, info and financials
//!   worksheets whatever their spelling ("i_Setup", "i Setup", "Setup", ...)
//! - **Field extraction**: label/value pairs laid out side by side or stacked
//! - **Subtable detection**: blank-row delimited tables with a text header row
//! - **Product ranking**: top products by weighting, numbers or percent text
//! - **Lazy decoding**: only the resolved worksheets are read from the package
//!
//! ## Usage
//!
//! ```no_run
//! use finsheet::config::ExtractOptions;
//! use std::path::Path;
//!
//! let extraction = finsheet::extract_file(Path::new("acme.xlsx"), &ExtractOptions::default())?;
//! for entry in &extraction.result.cost_of_sales.top_products.by_weighting {
//!     println!("{} {}", entry.product, entry.weighting);
//! }
//! # Ok::<(), finsheet::error::FinsheetError>(())
//! ```
pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
mod helpers;
pub mod spreadsheet;

use crate::config::ExtractOptions;
use crate::document::ExtractionResult;
use crate::error::FinsheetError;
use crate::error::ResultMessage;
use std::path::Path;
use std::path::PathBuf;

/// Outcome of extracting one file.
#[derive(Clone, Debug)]
pub struct Extraction {
    pub source: PathBuf,
    /// Path of the written JSON document, `None` on a dry run
    pub output: Option<PathBuf>,
    pub result: ExtractionResult,
}

/// Extracts one workbook and, unless `options.dry_run` is set, writes
/// `<stem>.json` beside it. Nothing is written when extraction fails.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<Extraction, FinsheetError> {
    let mut spreadsheet = spreadsheet::open_spreadsheet(path)
        .with_prefix(&format!("Open '{}'", path.display()))?;
    let result = extract::extract_workbook(spreadsheet.as_mut(), options)?;
    let output = if options.dry_run {
        None
    } else {
        let output = document::output_path(path);
        document::write_result(&result, &output)?;
        Some(output)
    };
    Ok(Extraction {
        source: path.to_owned(),
        output,
        result,
    })
}
