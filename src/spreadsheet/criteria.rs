use std::collections::HashSet;

/// Selects which worksheets a spreadsheet reader decodes.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Exact sheet names to read; `None` reads every sheet.
    pub sheet_names: Option<HashSet<String>>,
}

impl Criteria {
    /// Criteria accepting every sheet.
    pub fn all() -> Self {
        Criteria::default()
    }

    /// Criteria accepting only the given sheet names.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criteria {
            sheet_names: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns true if no names are specified or if the name is listed.
    pub fn accept(&self, sheet_name: &str) -> bool {
        self.sheet_names
            .as_ref()
            .map(|names| names.contains(sheet_name))
            .unwrap_or(true)
    }
}
