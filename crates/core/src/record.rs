use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

/// One extracted cell. Never mutated after consolidation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedRecord {
    pub source_sheet: String,
    pub value: CellValue,
    /// 1-based row in the source sheet
    pub row_number: usize,
}

/// Per-sheet counts for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub name: String,
    /// Rows at or after the start row that were inspected
    pub rows_scanned: usize,
    pub records_emitted: usize,
}

/// Output of one consolidation run.
///
/// `total_rows == data.len()`; data follows sheet order, then row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationResult {
    pub file_name: String,
    pub total_sheets: usize,
    pub total_rows: usize,
    pub data: Vec<ConsolidatedRecord>,
    pub sheets: Vec<SheetSummary>,
}

impl ConsolidationResult {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values only, in record order
    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.data.iter().map(|r| &r.value)
    }

    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} sheet{} · {} value{}",
            self.total_sheets,
            if self.total_sheets == 1 { "" } else { "s" },
            self.total_rows,
            if self.total_rows == 1 { "" } else { "s" },
        )
    }
}

/// Structured summary returned by the insight service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub summary: String,
    /// Usually three entries; not enforced
    pub insights: Vec<String>,
    pub suggested_categories: Vec<String>,
}
