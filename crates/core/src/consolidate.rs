// Column consolidation across every sheet of a workbook

use serde::{Deserialize, Serialize};

use crate::column::{validate_column_label, ColumnLabel};
use crate::error::ConsolidateError;
use crate::grid::Workbook;
use crate::record::{ConsolidatedRecord, ConsolidationResult, SheetSummary};

/// Column used when none is configured
pub const DEFAULT_COLUMN: &str = "B";

/// First 1-based row read from each sheet; rows above it are skipped unconditionally
pub const DEFAULT_START_ROW: usize = 4;

/// Which column to read and where to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRules {
    pub column: String,
    /// 1-based
    pub start_row: usize,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            column: DEFAULT_COLUMN.to_string(),
            start_row: DEFAULT_START_ROW,
        }
    }
}

impl ExtractionRules {
    pub fn new(column: impl Into<String>, start_row: usize) -> Self {
        Self { column: column.into(), start_row }
    }

    /// Check the rules before any workbook is read.
    pub fn validate(&self) -> Result<ColumnLabel, ConsolidateError> {
        if self.start_row == 0 {
            return Err(ConsolidateError::Validation(
                "start row is 1-based and must be at least 1".to_string(),
            ));
        }
        validate_column_label(&self.column)
    }
}

/// Collect the non-blank cells of the configured column from every sheet.
///
/// Sheets are visited in declared order. Within a sheet, rows before
/// `start_row` are skipped and blank cells are dropped. Row numbers in the
/// output are 1-based positions in the source sheet.
pub fn consolidate(
    workbook: &Workbook,
    file_name: &str,
    rules: &ExtractionRules,
) -> Result<ConsolidationResult, ConsolidateError> {
    let column = rules.validate()?;
    let col = column.index();
    let first_row = rules.start_row - 1;

    let mut data = Vec::new();
    let mut sheets = Vec::with_capacity(workbook.sheet_count());

    for sheet in &workbook.sheets {
        let before = data.len();
        let rows_scanned = sheet.row_count().saturating_sub(first_row);

        for (row_idx, row) in sheet.rows.iter().enumerate().skip(first_row) {
            let Some(value) = row.get(col) else { continue };
            if value.is_blank() {
                continue;
            }
            data.push(ConsolidatedRecord {
                source_sheet: sheet.name.clone(),
                value: value.clone(),
                row_number: row_idx + 1,
            });
        }

        let emitted = data.len() - before;
        log::debug!(
            "sheet '{}': {} rows scanned, {} values in column {}",
            sheet.name, rows_scanned, emitted, column
        );
        sheets.push(SheetSummary {
            name: sheet.name.clone(),
            rows_scanned,
            records_emitted: emitted,
        });
    }

    Ok(ConsolidationResult {
        file_name: file_name.to_string(),
        total_sheets: workbook.sheet_count(),
        total_rows: data.len(),
        data,
        sheets,
    })
}
