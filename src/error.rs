use thiserror::Error;

/// Main error type for finsheet.
/// Aggregates errors from the standard library, dependencies and the internal modules.
#[derive(Error, Debug)]
pub enum FinsheetError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    GlobError(#[from] glob::GlobError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Extraction errors
    #[error("{0}")]
    ExtractError(#[from] crate::extract::ExtractError),
}

impl FinsheetError {
    /// Returns the extraction error wrapped by this error, if any.
    pub fn as_extract_error(&self) -> Option<&crate::extract::ExtractError> {
        match self {
            FinsheetError::ExtractError(error) => Some(error),
            _ => None,
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, FinsheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| FinsheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
