//! Package-level helpers shared by the SpreadsheetML readers
use crate::error::FinsheetError;
use crate::helpers::reader::SourceReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Workbook-level metadata read once when a package is opened
pub(super) struct Package {
    pub(super) zip: ZipArchive<SourceReader>,
    /// Cell types indexed by style (xf) id
    pub(super) number_formats: Vec<CellType>,
    /// Worksheets as (name, zip_path) pairs in workbook order
    pub(super) sheets: Vec<(String, String)>,
    /// Whether the workbook uses the 1904 date system
    pub(super) is_1904: bool,
}

/// Opens a package and loads its workbook structure and number formats
///
/// # Arguments
/// * `file_name` - Name used in error messages
/// * `reader` - Package bytes
/// * `load_workbook` - Reads sheet names/paths and the date system
/// * `load_number_formats` - Reads style-indexed cell types
pub(super) fn open<W, F>(file_name: &str, reader: SourceReader, load_workbook: W, load_number_formats: F) -> Result<Package, FinsheetError>
where
    W: Fn(&mut ZipArchive<SourceReader>) -> Result<(Vec<(String, String)>, bool), FinsheetError>,
    F: Fn(&mut ZipArchive<SourceReader>) -> Result<Vec<CellType>, FinsheetError>,
{
    let mut zip = ZipArchive::new(reader)?;
    let (sheets, is_1904) = load_workbook(&mut zip)?;
    if sheets.is_empty() {
        Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
    }
    let number_formats = load_number_formats(&mut zip)?;
    Ok(Package { zip, number_formats, sheets, is_1904 })
}

/// Loads worksheet relationships, mapping relationship ids to part paths
pub(super) fn load_relationships(zip: &mut ZipArchive<SourceReader>, path: &str) -> Result<HashMap<String, String>, FinsheetError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps style format ids to cell types using custom and built-in formats
pub(super) fn resolve_number_formats(format_ids: Vec<String>, custom_formats: HashMap<String, CellType>) -> Vec<CellType> {
    format_ids
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target to a path inside the package
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path(Cow::from("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn number_formats() {
        let custom = HashMap::from([("164".to_owned(), CellType::DateTime), ("165".to_owned(), CellType::Number)]);
        let resolved = resolve_number_formats(
            vec!["0".to_owned(), "164".to_owned(), "14".to_owned(), "165".to_owned(), "10".to_owned()],
            custom,
        );
        assert_eq!(
            resolved,
            vec![CellType::Number, CellType::DateTime, CellType::DateTime, CellType::Number, CellType::Number]
        );
    }
}
