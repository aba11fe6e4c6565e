//! Directory scanning and per-file extraction for batch runs.
use crate::config::ExtractOptions;
use crate::error::FinsheetError;
use crate::extract_file;
use crate::Extraction;
use glob::MatchOptions;
use glob::Pattern;
use std::path::Path;
use std::path::PathBuf;

const EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// Successes and failures of one batch run, in file order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub extractions: Vec<Extraction>,
    pub failures: Vec<(PathBuf, FinsheetError)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.extractions.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Lists the workbooks of a directory: `.xlsx`/`.xlsm` in any letter case,
/// without hidden files or excluded names, sorted by path.
pub fn scan(directory: &Path, options: &ExtractOptions) -> Result<Vec<PathBuf>, FinsheetError> {
    let match_options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let base = Pattern::escape(&directory.to_string_lossy());
    let mut files = Vec::new();
    for extension in EXTENSIONS {
        let pattern = format!("{}/*.{}", base, extension);
        for entry in glob::glob_with(&pattern, match_options)? {
            let path = entry?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            if name.starts_with('.') || !path.is_file() {
                continue;
            }
            if options.is_excluded(&name) {
                log::info!("Skipping reference file '{}'", path.display());
                continue;
            }
            files.push(path);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Extracts every workbook of a directory. A failing file is recorded and
/// the run moves on to the next one.
pub fn run(directory: &Path, options: &ExtractOptions) -> Result<BatchSummary, FinsheetError> {
    let files = scan(directory, options)?;
    log::info!("Found {} workbooks in '{}'", files.len(), directory.display());
    let mut summary = BatchSummary::default();
    for file in files {
        match extract_file(&file, options) {
            Ok(extraction) => summary.extractions.push(extraction),
            Err(error) => {
                log::error!("Extract '{}' failed: {}", file.display(), error);
                summary.failures.push((file, error));
            }
        }
    }
    Ok(summary)
}
