//! Worksheet resolution by role, tolerant of casing, spacing and prefixes.
use crate::extract::SheetRole;

/// Normalized aliases per role: primary names first, then fallbacks that are
/// only consulted when no worksheet matches a primary name.
fn aliases(role: SheetRole) -> (&'static [&'static str], &'static [&'static str]) {
    match role {
        SheetRole::Setup => (&["isetup", "setup"], &["summary", "summarysheet"]),
        SheetRole::CostOfSales => (&["icos", "cos", "costofsales", "icostofsales"], &[]),
        SheetRole::Info => (&["info", "iinfo", "information"], &[]),
        SheetRole::Financials => (
            &["financials", "ifinancials", "financial", "financialstatements", "fs"],
            &[],
        ),
    }
}

/// Lower-cases a sheet name and drops everything but letters and digits,
/// so "i_Setup", "i Setup" and "I-SETUP" all become "isetup".
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the first sheet, in workbook order, whose normalized name is an
/// alias of the role.
pub fn resolve<'a, S: AsRef<str>>(sheet_names: &'a [S], role: SheetRole) -> Option<&'a str> {
    let (primary, fallback) = aliases(role);
    let find = |aliases: &[&str]| {
        sheet_names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| aliases.contains(&normalize(name).as_str()))
    };
    let found = find(primary).or_else(|| find(fallback));
    if let Some(name) = found {
        log::debug!("Resolved {} worksheet '{}'", role, name);
    }
    found
}
