//! Extraction settings shared by the library and the command line.

/// Default name of the weighting column in the product table.
pub const DEFAULT_WEIGHTING_COLUMN: &str = "Weighting";

/// Default number of ranked products.
pub const DEFAULT_TOP_N: usize = 5;

/// Reference workbook shipped next to real inputs; never extracted in batch mode.
pub const REFERENCE_FIXTURE: &str = "subsectors-example.xlsx";

/// Settings for one extraction run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractOptions {
    /// Header of the weighting column, matched case-insensitively
    pub weighting_column: String,
    /// Maximum number of ranked products
    pub top_n: usize,
    /// File names skipped when scanning a directory
    pub excluded_files: Vec<String>,
    /// Extract without writing JSON files
    pub dry_run: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            weighting_column: DEFAULT_WEIGHTING_COLUMN.to_owned(),
            top_n: DEFAULT_TOP_N,
            excluded_files: vec![REFERENCE_FIXTURE.to_owned()],
            dry_run: false,
        }
    }
}

impl ExtractOptions {
    /// Whether a file name is on the batch exclusion list (case-insensitive).
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.excluded_files
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(file_name))
    }
}
