// File I/O operations

pub mod csv;
pub mod xlsx;

pub use xlsx::{
    export_file_name, export_xlsx, export_xlsx_bytes, read_workbook_bytes, read_workbook_path,
    ExportResult, EXPORT_FILE_PREFIX, EXPORT_HEADERS, EXPORT_SHEET_NAME,
};
