//! Optional info sheet: flat metrics keyed by snake_case label.
use crate::extract::fields;
use crate::extract::subtable;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Worksheet;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("Hardcode regex pattern"));
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_]+").expect("Hardcode regex pattern"));

/// Labels that title a label/value block rather than name a metric.
const HEADER_LABELS: [&str; 5] = ["label", "metric", "name", "description", "info"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoSection {
    pub sheet_name: String,
    /// snake_case key → value
    pub metrics: IndexMap<String, CellValue>,
    /// snake_case key → label as written in the sheet
    pub labels: IndexMap<String, String>,
}

/// Turns a label into a snake_case key: "Gross Margin (%)" → "gross_margin".
pub fn snake_case(label: &str) -> String {
    let words = NON_WORD.replace_all(label, "");
    SEPARATORS
        .replace_all(words.trim(), "_")
        .to_lowercase()
        .trim_matches('_')
        .to_owned()
}

pub fn extract(sheet: &Worksheet) -> InfoSection {
    let (_, claimed) = subtable::parse(sheet);
    let mut section = InfoSection {
        sheet_name: sheet.name().to_owned(),
        ..InfoSection::default()
    };
    for (label, field) in fields::parse(sheet, &claimed) {
        if label.starts_with('#') || HEADER_LABELS.contains(&label.to_lowercase().as_str()) {
            continue;
        }
        let key = snake_case(&label);
        if key.is_empty() {
            continue;
        }
        section.metrics.insert(key.to_owned(), field.value);
        section.labels.insert(key, label);
    }
    log::info!("Read {} info metrics from '{}'", section.metrics.len(), sheet.name());
    section
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_keys() {
        assert_eq!(snake_case("Gross Margin (%)"), "gross_margin");
        assert_eq!(snake_case("  Number of   Employees "), "number_of_employees");
        assert_eq!(snake_case("EBITDA__Margin"), "ebitda_margin");
        assert_eq!(snake_case("_Total_"), "total");
        assert_eq!(snake_case("%"), "");
    }

    #[test]
    fn extracts_metrics() {
        let sheet = Worksheet::from_rows(
            "Info",
            vec![
                vec![CellValue::from("Info")],
                vec![CellValue::from("Description"), CellValue::from("Company facts")],
                vec![CellValue::from("Employees"), CellValue::Number(120.0)],
                vec![CellValue::from("# internal"), CellValue::from("skip")],
                vec![CellValue::from("Founded:"), CellValue::Number(1998.0)],
                vec![CellValue::from("Head Office"), CellValue::from("Nairobi")],
            ],
        );
        let section = extract(&sheet);
        assert_eq!(section.sheet_name, "Info");
        let keys: Vec<&str> = section.metrics.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["employees", "founded", "head_office"]);
        assert_eq!(section.metrics["employees"], CellValue::Number(120.0));
        assert_eq!(section.labels["head_office"], "Head Office");
    }
}
