//! # Extraction Engine
//!
//! Recovers the schema of a template workbook: resolves worksheets by role,
//! separates repeating subtables from flat label/value fields, ranks products
//! by weighting and collects the optional info and financials sections.
//!
//! The passes are independent and run in a fixed order on each worksheet:
//! the subtable scan claims the cells of every table it finds, then the field
//! scan reads only unclaimed cells.
pub mod fields;
pub mod financials;
pub mod info;
pub mod ranking;
pub mod resolver;
pub mod subtable;

use crate::config::ExtractOptions;
use crate::document::CostOfSalesSection;
use crate::document::ExtractionResult;
use crate::document::SetupSection;
use crate::error::FinsheetError;
use crate::spreadsheet::Criteria;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::Worksheet;
use chrono::SubsecRound;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Logical role a worksheet plays in the template.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SheetRole {
    Setup,
    CostOfSales,
    Info,
    Financials,
}

impl SheetRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SheetRole::Setup => "setup",
            SheetRole::CostOfSales => "cost-of-sales",
            SheetRole::Info => "info",
            SheetRole::Financials => "financials",
        }
    }

    /// Whether extraction fails when no worksheet plays this role.
    pub const fn is_required(&self) -> bool {
        matches!(self, SheetRole::Setup | SheetRole::CostOfSales)
    }
}

impl Display for SheetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors of the extraction engine.
///
/// `MissingRequiredSheet` and `WriteFailure` abort the extraction of one file.
/// `MalformedSubtable` and `UnparseableWeighting` are logged where they occur
/// and the affected rows are skipped.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No worksheet found for required role '{role}' (available: {})", .available.join(", "))]
    MissingRequiredSheet { role: SheetRole, available: Vec<String> },

    #[error("Malformed subtable in '{sheet}' at {reference}: {message}")]
    MalformedSubtable { sheet: String, reference: String, message: String },

    #[error("Unparseable weighting {value:?} in '{sheet}' at {reference}")]
    UnparseableWeighting { sheet: String, reference: String, value: String },

    #[error("Write '{}' failed: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Worksheet names chosen for each role of one workbook.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSheets {
    pub setup: String,
    pub cost_of_sales: String,
    pub info: Option<String>,
    pub financials: Option<String>,
}

impl ResolvedSheets {
    /// Resolves every role against the workbook's sheet names. Setup is
    /// checked first, so a workbook missing both required sheets reports setup.
    pub fn resolve(sheet_names: &[String]) -> Result<ResolvedSheets, ExtractError> {
        let required = |role: SheetRole| {
            resolver::resolve(sheet_names, role)
                .map(str::to_owned)
                .ok_or_else(|| ExtractError::MissingRequiredSheet {
                    role,
                    available: sheet_names.to_vec(),
                })
        };
        let setup = required(SheetRole::Setup)?;
        let cost_of_sales = required(SheetRole::CostOfSales)?;
        let optional = |role: SheetRole| {
            let name = resolver::resolve(sheet_names, role).map(str::to_owned);
            if name.is_none() {
                log::warn!("No '{}' worksheet found, section omitted", role);
            }
            name
        };
        Ok(ResolvedSheets {
            setup,
            cost_of_sales,
            info: optional(SheetRole::Info),
            financials: optional(SheetRole::Financials),
        })
    }

    /// Names of all resolved worksheets, deduplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![self.setup.to_owned(), self.cost_of_sales.to_owned()];
        names.extend(self.info.iter().cloned());
        names.extend(self.financials.iter().cloned());
        names.dedup();
        names
    }
}

/// Extracts one workbook into an [`ExtractionResult`].
///
/// Only the worksheets resolved for a role are decoded.
pub fn extract_workbook(spreadsheet: &mut dyn Spreadsheet, options: &ExtractOptions) -> Result<ExtractionResult, FinsheetError> {
    let resolved = ResolvedSheets::resolve(&spreadsheet.sheet_names())?;
    log::info!(
        "Resolved '{}': setup='{}', cost-of-sales='{}'",
        spreadsheet.name(),
        resolved.setup,
        resolved.cost_of_sales
    );
    let workbook = spreadsheet.read_workbook(&Criteria::only(resolved.names()))?;
    let sheet = |name: &str| {
        workbook
            .worksheet(name)
            .ok_or_else(|| crate::spreadsheet::SpreadsheetError::FileError(name.to_owned()))
    };

    let setup = extract_setup(sheet(&resolved.setup)?);
    let cost_of_sales = extract_cost_of_sales(sheet(&resolved.cost_of_sales)?, options);
    let info = match &resolved.info {
        Some(name) => Some(info::extract(sheet(name)?)),
        None => None,
    };
    let financials = match &resolved.financials {
        Some(name) => Some(financials::extract(sheet(name)?)),
        None => None,
    };

    Ok(ExtractionResult {
        extracted_at: Utc::now().trunc_subsecs(0),
        source_file: spreadsheet.name(),
        setup,
        cost_of_sales,
        info,
        financials,
    })
}

/// Setup sheet: subtables first, then the flat fields around them.
pub fn extract_setup(sheet: &Worksheet) -> SetupSection {
    let (subtables, claimed) = subtable::parse(sheet);
    let fields = fields::parse(sheet, &claimed);
    SetupSection::new(sheet.name(), fields, subtables)
}

/// Cost-of-sales sheet: the product table and its weighting ranking.
pub fn extract_cost_of_sales(sheet: &Worksheet, options: &ExtractOptions) -> CostOfSalesSection {
    let (subtables, _) = subtable::parse(sheet);
    match ranking::select_product_table(&subtables, &options.weighting_column) {
        Some(table) => {
            let ranking = ranking::rank(table, &options.weighting_column, options.top_n);
            CostOfSalesSection::new(sheet.name(), table, ranking)
        }
        None => {
            log::warn!("No product table found in '{}'", sheet.name());
            CostOfSalesSection::empty(sheet.name())
        }
    }
}
