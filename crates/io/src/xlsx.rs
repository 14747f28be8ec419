// Excel workbook import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import: the whole workbook is read into memory and converted to the core
//         grid model, one sheet per declared sheet, anchored at A1.
// Export: a single "Consolidado" sheet with value / sheet / row columns.

use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Instant;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, SheetType, SheetVisible, Sheets};
use consolidator_core::cell::{CellValue, ExcelDate};
use consolidator_core::error::ConsolidateError;
use consolidator_core::grid::{SheetGrid, Workbook};
use consolidator_core::record::ConsolidatedRecord;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

/// Name of the single sheet in an exported workbook
pub const EXPORT_SHEET_NAME: &str = "Consolidado";

/// Prefix prepended to the original file name on export
pub const EXPORT_FILE_PREFIX: &str = "Consolidado_";

/// Header row of an exported workbook: value, source sheet, original row
pub const EXPORT_HEADERS: [&str; 3] = ["Valor Consolidado", "Aba de Origem", "Linha Original"];

// ============================================================================
// Import
// ============================================================================

/// Read a workbook from raw file bytes. The container format is sniffed
/// from the content, not from a file extension.
pub fn read_workbook_bytes(bytes: Vec<u8>) -> Result<Workbook, ConsolidateError> {
    let start_time = Instant::now();
    let size = bytes.len();

    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ConsolidateError::Parse(format!("unsupported or corrupt spreadsheet: {}", e)))?;

    let workbook = read_sheets(&mut sheets)?;

    log::debug!(
        "read {} sheet(s) from {} bytes in {}ms",
        workbook.sheet_count(),
        size,
        start_time.elapsed().as_millis()
    );
    Ok(workbook)
}

/// Read a workbook from disk
pub fn read_workbook_path(path: &Path) -> Result<Workbook, ConsolidateError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ConsolidateError::Parse(format!("cannot read {}: {}", path.display(), e)))?;
    read_workbook_bytes(bytes)
}

fn read_sheets<RS: Read + Seek>(sheets: &mut Sheets<RS>) -> Result<Workbook, ConsolidateError> {
    // Metadata carries every declared sheet, hidden ones included
    let metadata = sheets.sheets_metadata().to_vec();
    let mut workbook = Workbook::new();

    for meta in metadata {
        if !matches!(meta.typ, SheetType::WorkSheet) {
            // Chart/dialog/macro sheets have no cells but still count as sheets
            log::debug!("sheet '{}' is {:?}; treated as empty", meta.name, meta.typ);
            workbook.push(SheetGrid::new(meta.name));
            continue;
        }
        if !matches!(meta.visible, SheetVisible::Visible) {
            log::debug!("sheet '{}' is hidden; reading anyway", meta.name);
        }

        let range = sheets
            .worksheet_range(&meta.name)
            .map_err(|e| ConsolidateError::Parse(format!("failed to read sheet '{}': {}", meta.name, e)))?;

        workbook.push(range_to_grid(meta.name, &range));
    }

    Ok(workbook)
}

/// Materialize a calamine range as a rectangular grid at its real offset.
///
/// The used range may not begin at A1 (data starting at C5 has start (4, 2));
/// rows and columns before it are filled with `Empty` so row numbers stay absolute.
fn range_to_grid(name: String, range: &Range<Data>) -> SheetGrid {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let (height, _) = range.get_size();

    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(start_row + height);
    rows.resize_with(start_row, Vec::new);

    for row in range.rows() {
        let mut cells = Vec::with_capacity(start_col + row.len());
        cells.resize_with(start_col, CellValue::default);
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    SheetGrid::with_rows(name, rows)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Elapsed-time formats ([h]:mm) hold a length of time, not a date
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        // as_datetime honors the workbook's 1900/1904 date system
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(at) => CellValue::Date(ExcelDate::from_datetime(at)),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Error cells (#N/A, #DIV/0!) carry no value
        Data::Error(_) => CellValue::Empty,
    }
}

// ============================================================================
// Export
// ============================================================================

/// Result of an Excel export operation
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Where the workbook was written
    pub path: PathBuf,
    /// Data rows written (header excluded)
    pub rows_exported: usize,
    /// Total export duration in milliseconds
    pub export_duration_ms: u128,
}

impl ExportResult {
    /// File name component of the written path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} row{} written to {}",
            self.rows_exported,
            if self.rows_exported == 1 { "" } else { "s" },
            self.path.display()
        )
    }
}

/// Output file name for an export: fixed prefix + original name, verbatim.
pub fn export_file_name(original: &str) -> String {
    format!("{}{}", EXPORT_FILE_PREFIX, original)
}

/// Build the export workbook in memory and return the xlsx bytes.
pub fn export_xlsx_bytes(records: &[ConsolidatedRecord]) -> Result<Vec<u8>, ConsolidateError> {
    let mut workbook = build_workbook(records)?;
    workbook
        .save_to_buffer()
        .map_err(|e| ConsolidateError::Export(format!("failed to serialize workbook: {}", e)))
}

/// Write `Consolidado_<original_name>` into `out_dir`.
pub fn export_xlsx(
    records: &[ConsolidatedRecord],
    out_dir: &Path,
    original_name: &str,
) -> Result<ExportResult, ConsolidateError> {
    let start_time = Instant::now();
    let path = out_dir.join(export_file_name(original_name));

    let mut workbook = build_workbook(records)?;
    workbook
        .save(&path)
        .map_err(|e| ConsolidateError::Export(format!("failed to save {}: {}", path.display(), e)))?;

    log::info!("exported {} records to {}", records.len(), path.display());

    Ok(ExportResult {
        path,
        rows_exported: records.len(),
        export_duration_ms: start_time.elapsed().as_millis(),
    })
}

fn build_workbook(records: &[ConsolidatedRecord]) -> Result<XlsxWorkbook, ConsolidateError> {
    let mut workbook = XlsxWorkbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(EXPORT_SHEET_NAME)
        .map_err(|e| ConsolidateError::Export(format!("failed to create sheet: {}", e)))?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(write_error)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = u32::try_from(idx + 1)
            .map_err(|_| ConsolidateError::Export("too many rows for one sheet".to_string()))?;

        write_value(worksheet, row, &record.value, &date_format, &datetime_format)?;
        worksheet
            .write_string(row, 1, &record.source_sheet)
            .map_err(write_error)?;
        worksheet
            .write_number(row, 2, record.row_number as f64)
            .map_err(write_error)?;
    }

    worksheet.autofit();
    Ok(workbook)
}

/// Write a value into column 0, keeping its type.
fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    value: &CellValue,
    date_format: &Format,
    datetime_format: &Format,
) -> Result<(), ConsolidateError> {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, 0, s).map_err(write_error)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, 0, *n).map_err(write_error)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, 0, *b).map_err(write_error)?;
        }
        CellValue::Date(d) => {
            let format = if d.has_time() { datetime_format } else { date_format };
            worksheet
                .write_number_with_format(row, 0, d.serial(), format)
                .map_err(write_error)?;
        }
    }
    Ok(())
}

fn write_error(e: rust_xlsxwriter::XlsxError) -> ConsolidateError {
    ConsolidateError::Export(format!("failed to write cell: {}", e))
}
