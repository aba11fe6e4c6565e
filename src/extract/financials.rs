//! Optional financials sheet: the category → subcategory → sub-subcategory
//! hierarchy of the line items.
//!
//! Column A (or E when A is blank) names the category, F the subcategory and
//! G the sub-subcategory.
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Worksheet;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::sync::LazyLock;

const CATEGORY_COLUMN: usize = 1;
const ALTERNATE_CATEGORY_COLUMN: usize = 5;
const SUBCATEGORY_COLUMN: usize = 6;
const SUB_SUBCATEGORY_COLUMN: usize = 7;

/// Group for sub-subcategories listed without a subcategory.
pub const OTHER: &str = "_other";

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_\-/&]+").expect("Hardcode regex pattern"));
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+(]?[$€£]?[\d,]*\.?\d+\)?%?$").expect("Hardcode regex pattern"));

/// Normalized category names with their exact aliases and the keywords
/// matched by containment. Keywords are tried in table order, so the more
/// specific cost categories come before revenue.
const CATEGORIES: [(&str, &[&str], &[&str]); 5] = [
    (
        "cost_of_sale",
        &[
            "cost of sale",
            "cost of sales",
            "cos",
            "cogs",
            "cost of goods",
            "cost of goods sold",
            "cost of revenue",
            "direct cost",
            "direct costs",
        ],
        &["cost of sale", "cogs", "cost of goods", "direct cost"],
    ),
    (
        "opex",
        &[
            "opex",
            "operating expenses",
            "operating expense",
            "operating costs",
            "operating cost",
            "overheads",
            "overhead",
            "expenses",
            "expenditure",
            "expenditures",
        ],
        &["opex", "operating expense", "operating cost", "operating expenditure", "overhead"],
    ),
    ("revenue", &["revenue", "revenues", "sales", "income", "turnover"], &["revenue", "turnover", "income", "sales"]),
    (
        "financing_cost",
        &[
            "financing cost",
            "financing costs",
            "finance cost",
            "finance costs",
            "interest",
            "interest expense",
            "interest expenses",
        ],
        &["financ", "interest"],
    ),
    (
        "capex",
        &["capex", "capital expenditure", "capital expenditures", "capital investment", "fixed assets"],
        &["capex", "capital"],
    ),
];

/// Column titles that are never category values.
const HEADER_WORDS: [&str; 8] = [
    "category",
    "subcategory",
    "sub category",
    "sub subcategory",
    "sub sub category",
    "type",
    "item",
    "description",
];

/// Subcategory → sub-subcategories, both in first-seen order.
pub type Subcategories = IndexMap<String, Vec<String>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsSection {
    pub sheet_name: String,
    pub categories: IndexMap<String, Subcategories>,
}

fn normalize_text(text: &str) -> String {
    SEPARATORS.replace_all(text.trim(), " ").trim().to_lowercase()
}

/// Maps a free-form category name to one of the canonical categories.
pub fn normalize_category(text: &str) -> Option<&'static str> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return None;
    }
    CATEGORIES
        .iter()
        .find(|(_, aliases, _)| aliases.contains(&normalized.as_str()))
        .or_else(|| {
            CATEGORIES
                .iter()
                .find(|(_, _, keywords)| keywords.iter().any(|keyword| normalized.contains(keyword)))
        })
        .map(|(name, _, _)| *name)
}

/// Text of a hierarchy cell, ignoring header words and numbers.
fn label(value: &CellValue) -> Option<String> {
    let text = value.as_text()?;
    let normalized = normalize_text(text);
    if normalized.is_empty() || HEADER_WORDS.contains(&normalized.as_str()) || NUMERIC.is_match(&normalized) {
        return None;
    }
    Some(text.to_owned())
}

pub fn extract(sheet: &Worksheet) -> FinancialsSection {
    let mut categories: IndexMap<String, Subcategories> = IndexMap::new();
    for row in 1..=sheet.max_row() {
        let category = [CATEGORY_COLUMN, ALTERNATE_CATEGORY_COLUMN]
            .into_iter()
            .filter_map(|column| label(sheet.get(row, column)))
            .find_map(|text| normalize_category(&text));
        let Some(category) = category else {
            continue;
        };
        let subcategory = label(sheet.get(row, SUBCATEGORY_COLUMN));
        let sub_subcategory = label(sheet.get(row, SUB_SUBCATEGORY_COLUMN));
        let group = match (subcategory, &sub_subcategory) {
            (Some(subcategory), _) => subcategory,
            (None, Some(_)) => OTHER.to_owned(),
            (None, None) => continue,
        };
        let children = categories.entry(category.to_owned()).or_default().entry(group).or_default();
        if let Some(item) = sub_subcategory {
            if !children.contains(&item) {
                children.push(item);
            }
        }
    }
    log::info!("Read {} financial categories from '{}'", categories.len(), sheet.name());
    FinancialsSection {
        sheet_name: sheet.name().to_owned(),
        categories,
    }
}
