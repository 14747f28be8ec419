// In-memory workbook model, anchored at A1

use crate::cell::CellValue;

/// One sheet materialized as a row-major grid.
///
/// Row index 0 is spreadsheet row 1. Rows may be ragged; cells past the end
/// of a row read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), rows: Vec::new() }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { name: name.into(), rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, col), both zero-based. Absent cells are `Empty`.
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Set a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, CellValue::default);
        }
        cells[col] = value;
    }
}

/// A workbook: sheets in declared order, hidden sheets included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<SheetGrid>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sheet: SheetGrid) {
        self.sheets.push(sheet);
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_out_of_bounds_is_empty() {
        let sheet = SheetGrid::with_rows("S", vec![vec![CellValue::from("a")]]);
        assert_eq!(sheet.get(0, 0), &CellValue::from("a"));
        assert_eq!(sheet.get(0, 5), &CellValue::Empty);
        assert_eq!(sheet.get(9, 0), &CellValue::Empty);
    }

    #[test]
    fn test_set_grows_grid() {
        let mut sheet = SheetGrid::new("S");
        sheet.set(4, 2, CellValue::Number(1.0));
        assert_eq!(sheet.row_count(), 5);
        assert_eq!(sheet.get(4, 2), &CellValue::Number(1.0));
        assert_eq!(sheet.get(4, 1), &CellValue::Empty);
        assert_eq!(sheet.get(3, 2), &CellValue::Empty);
    }
}
