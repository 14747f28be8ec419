// Consolidation core: pure transformations with no I/O

pub mod cell;
pub mod column;
pub mod consolidate;
pub mod error;
pub mod grid;
pub mod record;
pub mod session;

pub use cell::{CellValue, ExcelDate};
pub use column::{validate_column_label, ColumnLabel};
pub use consolidate::{consolidate, ExtractionRules, DEFAULT_COLUMN, DEFAULT_START_ROW};
pub use error::ConsolidateError;
pub use grid::{SheetGrid, Workbook};
pub use record::{ConsolidatedRecord, ConsolidationResult, InsightResult, SheetSummary};
