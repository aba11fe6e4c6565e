use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::cell::Position;
use std::collections::HashMap;
use std::ops::RangeInclusive;

static EMPTY: CellValue = CellValue::Empty;

/// A named worksheet: an immutable, row-major grid of non-empty cells.
#[derive(Clone, Debug, Default)]
pub struct Worksheet {
    /// Sheet name as written in the workbook
    name: String,
    /// Non-empty cells in row-major order
    cells: Vec<Cell>,
    /// Index mapping from position to cell vector position
    indexes: HashMap<Position, usize>,
    /// Actual data range (determined from cell data)
    max_row: usize,
    max_column: usize,
}

impl Worksheet {
    pub(crate) fn new(name: &str) -> Self {
        Worksheet {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Builds a worksheet from rows of values, the first row being row 1.
    pub fn from_rows<R, V>(name: &str, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut sheet = Worksheet::new(name);
        for (row_index, row) in rows.into_iter().enumerate() {
            for (column_index, value) in row.into_iter().enumerate() {
                sheet.push(Cell::new(row_index + 1, column_index + 1, value));
            }
        }
        sheet.finish();
        sheet
    }

    /// Adds a cell. Empty values are dropped; a later cell at the same
    /// position replaces the earlier one.
    pub(crate) fn push(&mut self, cell: Cell) {
        if cell.value.is_empty() {
            return;
        }
        self.max_row = self.max_row.max(cell.position.row);
        self.max_column = self.max_column.max(cell.position.column);
        match self.indexes.get(&cell.position) {
            Some(index) => self.cells[*index] = cell,
            None => {
                self.indexes.insert(cell.position, self.cells.len());
                self.cells.push(cell);
            }
        }
    }

    /// Restores row-major order after all cells have been added.
    pub(crate) fn finish(&mut self) {
        if self.cells.windows(2).all(|pair| pair[0].position < pair[1].position) {
            return;
        }
        self.cells.sort_by_key(|cell| cell.position);
        self.indexes = self
            .cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (cell.position, index))
            .collect();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value at a 1-based position, empty when nothing is stored there.
    pub fn get(&self, row: usize, column: usize) -> &CellValue {
        self.value_at(Position::new(row, column))
    }

    pub fn value_at(&self, position: Position) -> &CellValue {
        self.indexes
            .get(&position)
            .map(|index| &self.cells[*index].value)
            .unwrap_or(&EMPTY)
    }

    /// Non-empty cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Non-empty cells of one row, left to right.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &Cell> {
        let start = self.cells.partition_point(|cell| cell.position.row < row);
        self.cells[start..]
            .iter()
            .take_while(move |cell| cell.position.row == row)
    }

    /// True if the row holds no value within the given columns.
    pub fn is_row_empty(&self, row: usize, columns: RangeInclusive<usize>) -> bool {
        self.row(row).all(|cell| !columns.contains(&cell.position.column))
    }

    pub fn max_row(&self) -> usize {
        self.max_row
    }

    pub fn max_column(&self) -> usize {
        self.max_column
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_initial() {
        let sheet = Worksheet::new("Setup");
        assert!(sheet.is_empty());
        assert_eq!(sheet.max_row(), 0);
        assert_eq!(sheet.max_column(), 0);
        assert_eq!(sheet.get(1, 1), &CellValue::Empty);
    }

    #[test]
    fn sheet_from_rows() {
        let sheet = Worksheet::from_rows(
            "i_COS",
            vec![
                vec![CellValue::from("Product"), CellValue::from("Weighting")],
                vec![],
                vec![CellValue::Empty, CellValue::Number(0.4)],
            ],
        );
        assert_eq!(sheet.cells().count(), 3);
        assert_eq!(sheet.max_row(), 3);
        assert_eq!(sheet.max_column(), 2);
        assert_eq!(sheet.get(1, 2), &CellValue::from("Weighting"));
        assert_eq!(sheet.get(3, 1), &CellValue::Empty);
        assert!(sheet.is_row_empty(2, 1..=10));
        assert!(sheet.is_row_empty(3, 1..=1));
        assert!(!sheet.is_row_empty(3, 1..=2));
    }

    #[test]
    fn sheet_out_of_order_push() {
        let mut sheet = Worksheet::new("Info");
        sheet.push(Cell::new(3, 1, "c"));
        sheet.push(Cell::new(1, 2, "b"));
        sheet.push(Cell::new(1, 1, "a"));
        sheet.push(Cell::new(1, 1, "a2"));
        sheet.push(Cell::new(2, 1, "   "));
        sheet.finish();

        let references: Vec<String> = sheet.cells().map(Cell::reference).collect();
        assert_eq!(references, vec!["A1", "B1", "A3"]);
        assert_eq!(sheet.get(1, 1), &CellValue::from("a2"));
        assert_eq!(sheet.row(1).count(), 2);
        assert_eq!(sheet.row(2).count(), 0);
        assert_eq!(sheet.row(3).count(), 1);
    }
}
