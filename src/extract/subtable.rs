//! Detection of repeating tabular regions inside a worksheet.
//!
//! A header row is the first run of at least two adjacent text cells in a row
//! that sits at the top of the sheet or directly below a fully empty row. Data
//! rows follow until a row that is empty across the header span. Every cell
//! of a detected table is recorded in [`ClaimedCells`] so the field scan can
//! leave it alone.
use crate::extract::ranking;
use crate::extract::ExtractError;
use crate::spreadsheet::CellValue;
use crate::spreadsheet::Position;
use crate::spreadsheet::Worksheet;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// One data row: header → value, in header order. Empty cells are `null`.
pub type SubtableRow = IndexMap<String, CellValue>;

/// A header row plus the data rows beneath it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtable {
    /// Worksheet the table was read from
    pub sheet: String,
    /// Position of the first header cell
    pub anchor: Position,
    /// Unique column names, left to right
    pub headers: Vec<String>,
    pub rows: Vec<SubtableRow>,
}

impl Subtable {
    /// 1-based sheet row of the data row at `index`.
    pub fn row_number(&self, index: usize) -> usize {
        self.anchor.row + 1 + index
    }

    /// 1-based sheet column of a header.
    pub fn column_of(&self, header: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|name| name == header)
            .map(|index| self.anchor.column + index)
    }

    /// First header satisfying the predicate on its lower-cased name.
    pub fn find_header<P>(&self, predicate: P) -> Option<&str>
    where
        P: Fn(&str) -> bool,
    {
        self.headers
            .iter()
            .find(|name| predicate(&name.to_lowercase()))
            .map(String::as_str)
    }
}

/// Cell positions already consumed by a parsing pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClaimedCells(HashSet<Position>);

impl ClaimedCells {
    pub fn new() -> Self {
        ClaimedCells::default()
    }

    /// Returns false if the position was already claimed.
    pub fn claim(&mut self, position: Position) -> bool {
        self.0.insert(position)
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.0.contains(position)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Finds every subtable of the sheet, top to bottom.
pub fn parse(sheet: &Worksheet) -> (Vec<Subtable>, ClaimedCells) {
    let mut tables = Vec::new();
    let mut claimed = ClaimedCells::new();
    let mut row = 1;
    while row <= sheet.max_row() {
        let after_blank = row == 1 || sheet.row(row - 1).next().is_none();
        if let Some(span) = after_blank.then(|| header_run(sheet, row)).flatten() {
            if span.clone().count() > 2 || has_values_below(sheet, row, &span) {
                let table = read_table(sheet, row, span, &mut claimed);
                row = table.row_number(table.rows.len());
                tables.push(table);
                continue;
            }
        }
        row += 1;
    }
    log::debug!(
        "Found {} subtables in '{}' claiming {} cells",
        tables.len(),
        sheet.name(),
        claimed.len()
    );
    (tables, claimed)
}

/// Columns of the first run of two or more adjacent text cells in a row.
fn header_run(sheet: &Worksheet, row: usize) -> Option<RangeInclusive<usize>> {
    let mut run: Option<RangeInclusive<usize>> = None;
    for cell in sheet.row(row) {
        let column = cell.position.column;
        let extends = run.as_ref().is_some_and(|span| *span.end() + 1 == column);
        if cell.value.is_text() && extends {
            run = run.map(|span| *span.start()..=column);
            continue;
        }
        if let Some(span) = run.take().filter(|span| span.clone().count() >= 2) {
            return Some(span);
        }
        run = cell.value.is_text().then_some(column..=column);
    }
    run.filter(|span| span.clone().count() >= 2)
}

/// A two-column run is only a header if one of its columns holds a numeric
/// block beneath it: every non-empty cell down to the first row empty across
/// the run is a number, a date or number text such as "40%", and there is at
/// least one. A label column next to mixed values reads as label/value pairs.
fn has_values_below(sheet: &Worksheet, header_row: usize, span: &RangeInclusive<usize>) -> bool {
    let rows = (header_row + 1..=sheet.max_row())
        .take_while(|row| !sheet.is_row_empty(*row, span.clone()))
        .collect::<Vec<_>>();
    span.clone().any(|column| {
        let mut values = rows
            .iter()
            .map(|row| sheet.get(*row, column))
            .filter(|value| !value.is_empty())
            .peekable();
        values.peek().is_some() && values.all(is_numeric)
    })
}

fn is_numeric(value: &CellValue) -> bool {
    match value {
        CellValue::Number(_) | CellValue::Date(_) => true,
        CellValue::Text(_) => ranking::parse_weighting(value).is_some(),
        _ => false,
    }
}

fn read_table(sheet: &Worksheet, header_row: usize, span: RangeInclusive<usize>, claimed: &mut ClaimedCells) -> Subtable {
    let anchor = Position::new(header_row, *span.start());
    let names = span
        .clone()
        .map(|column| sheet.get(header_row, column).to_string())
        .collect::<Vec<_>>();
    let headers = unique_headers(names);
    for column in span.clone() {
        claimed.claim(Position::new(header_row, column));
    }

    let mut rows = Vec::new();
    let mut row = header_row + 1;
    while row <= sheet.max_row() && !sheet.is_row_empty(row, span.clone()) {
        if row == header_row + 1 && header_run(sheet, row) == Some(span.clone()) {
            report(sheet, Position::new(row, *span.start()), "header-like row without a blank separator kept as data");
        }
        let mut values = SubtableRow::with_capacity(headers.len());
        for (header, column) in headers.iter().zip(span.clone()) {
            let position = Position::new(row, column);
            values.insert(header.to_owned(), sheet.value_at(position).clone());
            claimed.claim(position);
        }
        for cell in sheet.row(row).filter(|cell| cell.position.column > *span.end()) {
            report(sheet, cell.position, "value outside the header span left unclaimed");
        }
        rows.push(values);
        row += 1;
    }

    Subtable {
        sheet: sheet.name().to_owned(),
        anchor,
        headers,
        rows,
    }
}

fn report(sheet: &Worksheet, position: Position, message: &str) {
    let error = ExtractError::MalformedSubtable {
        sheet: sheet.name().to_owned(),
        reference: position.reference(),
        message: message.to_owned(),
    };
    log::warn!("{}", error);
}

/// Suffixes repeated header names with " (2)", " (3)", ...
fn unique_headers(names: Vec<String>) -> Vec<String> {
    let mut used = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut occurrence = 1;
            while !used.insert(candidate.clone()) {
                occurrence += 1;
                candidate = format!("{} ({})", name, occurrence);
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> CellValue {
        CellValue::from(value)
    }

    fn number(value: f64) -> CellValue {
        CellValue::Number(value)
    }

    fn empty() -> CellValue {
        CellValue::Empty
    }

    #[test]
    fn detects_product_table() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![
                vec![text("Product"), text("Weighting")],
                vec![text("A"), number(0.4)],
                vec![text("B"), number(0.25)],
            ],
        );
        let (tables, claimed) = parse(&sheet);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.anchor, Position::new(1, 1));
        assert_eq!(table.headers, vec!["Product", "Weighting"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["Product"], text("B"));
        assert_eq!(table.rows[1]["Weighting"], number(0.25));
        assert_eq!(table.row_number(1), 3);
        assert_eq!(table.column_of("Weighting"), Some(2));
        assert_eq!(claimed.len(), 6);
    }

    #[test]
    fn two_text_cells_without_values_below_are_a_field() {
        let sheet = Worksheet::from_rows("i_Setup", vec![vec!["Company Name", "Acme Corp"], vec!["Currency", "USD"]]);
        let (tables, claimed) = parse(&sheet);
        assert!(tables.is_empty());
        assert!(claimed.is_empty());
    }

    #[test]
    fn percent_text_column_makes_a_table() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![vec!["Product", "Weighting"], vec!["A", "40%"], vec!["B", "25%"], vec!["C", "35%"]],
        );
        let (tables, claimed) = parse(&sheet);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].rows[2]["Weighting"], text("35%"));
        assert_eq!(claimed.len(), 8);
    }

    #[test]
    fn mixed_value_column_stays_fields() {
        let sheet = Worksheet::from_rows(
            "i_Setup",
            vec![
                vec![text("Company Name"), text("Acme Corp")],
                vec![text("Start Year"), number(2024.0)],
                vec![text("Currency"), text("USD")],
            ],
        );
        let (tables, claimed) = parse(&sheet);
        assert!(tables.is_empty());
        assert!(claimed.is_empty());
    }

    #[test]
    fn requires_blank_row_above_header() {
        let sheet = Worksheet::from_rows(
            "i_Setup",
            vec![
                vec![text("Company"), empty(), empty()],
                vec![text("Year"), text("Revenue"), text("Cost")],
                vec![number(2024.0), number(10.0), number(5.0)],
                vec![],
                vec![text("Year"), text("Revenue"), text("Cost")],
                vec![number(2025.0), number(12.0), number(6.0)],
            ],
        );
        let (tables, _) = parse(&sheet);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].anchor, Position::new(5, 1));
    }

    #[test]
    fn stops_at_empty_row_and_keeps_nulls() {
        let sheet = Worksheet::from_rows(
            "i_Setup",
            vec![
                vec![empty(), text("Item"), text("Qty"), text("Price")],
                vec![empty(), text("Bolt"), empty(), number(0.1)],
                vec![empty(), text("Nut"), number(50.0), empty()],
                vec![],
                vec![empty(), text("Note"), empty(), empty()],
            ],
        );
        let (tables, claimed) = parse(&sheet);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.anchor, Position::new(1, 2));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Qty"], CellValue::Empty);
        assert_eq!(table.rows[1]["Price"], CellValue::Empty);
        assert!(claimed.contains(&Position::new(2, 3)));
        assert!(!claimed.contains(&Position::new(5, 2)));
    }

    #[test]
    fn header_without_data_rows() {
        let sheet = Worksheet::from_rows("i_Setup", vec![vec!["Region", "Country", "City"]]);
        let (tables, claimed) = parse(&sheet);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].rows.is_empty());
        assert_eq!(claimed.len(), 3);
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![
                vec![text("Cost"), text("Cost"), text("Cost (2)"), text("Cost")],
                vec![number(1.0), number(2.0), number(3.0), number(4.0)],
            ],
        );
        let (tables, _) = parse(&sheet);
        assert_eq!(tables[0].headers, vec!["Cost", "Cost (2)", "Cost (2) (2)", "Cost (3)"]);
        assert_eq!(tables[0].rows[0]["Cost (3)"], number(4.0));
    }

    #[test]
    fn cells_right_of_span_stay_unclaimed() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![
                vec![text("Product"), text("Weighting"), empty()],
                vec![text("A"), number(0.4), text("note")],
            ],
        );
        let (tables, claimed) = parse(&sheet);
        assert_eq!(tables[0].headers.len(), 2);
        assert!(!claimed.contains(&Position::new(2, 3)));
    }

    #[test]
    fn header_like_first_row_is_data() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![
                vec![text("Product"), text("Weighting"), text("Notes")],
                vec![text("Sub"), text("Heading"), text("Here")],
                vec![text("A"), number(0.4), text("ok")],
            ],
        );
        let (tables, _) = parse(&sheet);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[0]["Product"], text("Sub"));
    }

    #[test]
    fn first_run_in_row_is_used() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![
                vec![text("Title"), empty(), text("Product"), text("Weighting"), text("Notes")],
                vec![empty(), empty(), text("A"), number(0.4), empty()],
            ],
        );
        let (tables, _) = parse(&sheet);
        assert_eq!(tables[0].anchor, Position::new(1, 3));
        assert_eq!(tables[0].headers, vec!["Product", "Weighting", "Notes"]);
    }

    #[test]
    fn serializes_anchor_as_reference() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![vec![text("Product"), text("Weighting")], vec![text("A"), number(0.4)]],
        );
        let (tables, _) = parse(&sheet);
        let json = serde_json::to_value(&tables[0]).unwrap();
        assert_eq!(json["anchor"], "A1");
        assert_eq!(json["rows"][0]["Weighting"], 0.4);
        let parsed: Subtable = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, tables[0]);
    }
}
