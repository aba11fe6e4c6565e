//! Top-N products of a cost-of-sales table by weighting.
use crate::extract::subtable::Subtable;
use crate::extract::subtable::SubtableRow;
use crate::extract::ExtractError;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Position;
use serde::Deserialize;
use serde::Serialize;

/// A product row chosen by the ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub product: String,
    pub weighting: f64,
    /// 1-based sheet row of the product
    pub row: usize,
    pub data: SubtableRow,
}

/// Result of ranking one table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ranking {
    pub weighting_column: Option<String>,
    pub product_column: Option<String>,
    pub entries: Vec<RankedEntry>,
}

/// Finds the weighting header: an exact case-insensitive match with the
/// configured name, else the first header mentioning "weight".
pub fn weighting_column<'a>(table: &'a Subtable, configured: &str) -> Option<&'a str> {
    let configured = configured.trim().to_lowercase();
    table
        .find_header(|name| name.trim() == configured)
        .or_else(|| table.find_header(|name| name.contains("weight")))
}

/// Finds the header naming the product, skipping the weighting column.
pub fn product_column<'a>(table: &'a Subtable, weighting: Option<&str>) -> Option<&'a str> {
    table
        .find_header(|name| name.trim() == "product")
        .or_else(|| table.find_header(|name| name.contains("product")))
        .or_else(|| table.find_header(|name| name.contains("name")))
        .or_else(|| {
            table
                .headers
                .iter()
                .map(String::as_str)
                .find(|name| Some(*name) != weighting)
        })
}

/// Picks the product table among the subtables of a cost-of-sales sheet.
pub fn select_product_table<'a>(tables: &'a [Subtable], configured: &str) -> Option<&'a Subtable> {
    tables
        .iter()
        .find(|table| weighting_column(table, configured).is_some())
        .or_else(|| {
            tables
                .iter()
                .find(|table| table.find_header(|name| name.contains("product")).is_some())
        })
        .or_else(|| tables.first())
}

/// Reads a weighting: numbers as they are, text such as "1,250" or "35%".
pub fn parse_weighting(value: &CellValue) -> Option<f64> {
    let number = match value {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => {
            let cleaned = text.trim().replace(',', "");
            match cleaned.strip_suffix('%') {
                Some(percent) => percent.trim().parse::<f64>().ok().map(|number| number / 100.0),
                None => cleaned.parse::<f64>().ok(),
            }
        }
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Ranks the table rows by descending weighting and keeps the first `top`.
///
/// Rows without a parseable weighting are left out. Ties keep sheet order.
pub fn rank(table: &Subtable, configured: &str, top: usize) -> Ranking {
    let Some(weighting) = weighting_column(table, configured) else {
        log::info!("No weighting column in the product table of '{}'", table.sheet);
        return Ranking {
            product_column: product_column(table, None).map(str::to_owned),
            ..Ranking::default()
        };
    };
    let product = product_column(table, Some(weighting));

    let mut entries = Vec::new();
    for (index, row) in table.rows.iter().enumerate() {
        let value = row.get(weighting).unwrap_or(&CellValue::Empty);
        match parse_weighting(value) {
            Some(number) => entries.push(RankedEntry {
                product: product
                    .and_then(|name| row.get(name))
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                weighting: number,
                row: table.row_number(index),
                data: row.clone(),
            }),
            None => {
                let column = table.column_of(weighting).unwrap_or(table.anchor.column);
                let error = ExtractError::UnparseableWeighting {
                    sheet: table.sheet.to_owned(),
                    reference: Position::new(table.row_number(index), column).reference(),
                    value: value.to_string(),
                };
                log::debug!("{}", error);
            }
        }
    }
    entries.sort_by(|a, b| b.weighting.total_cmp(&a.weighting));
    entries.truncate(top);

    Ranking {
        weighting_column: Some(weighting.to_owned()),
        product_column: product.map(str::to_owned),
        entries,
    }
}
