// CSV export of consolidated records

use std::io::Write;
use std::path::Path;

use consolidator_core::error::ConsolidateError;
use consolidator_core::record::ConsolidatedRecord;

use crate::xlsx::EXPORT_HEADERS;

/// Write records as CSV (header row + value, sheet, row) to any writer.
pub fn export_to_writer<W: Write>(records: &[ConsolidatedRecord], out: W) -> Result<(), ConsolidateError> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| ConsolidateError::Export(e.to_string()))?;

    for record in records {
        let row_number = record.row_number.to_string();
        writer
            .write_record([record.value.display().as_str(), record.source_sheet.as_str(), row_number.as_str()])
            .map_err(|e| ConsolidateError::Export(e.to_string()))?;
    }

    writer.flush().map_err(|e| ConsolidateError::Export(e.to_string()))?;
    Ok(())
}

pub fn export(records: &[ConsolidatedRecord], path: &Path) -> Result<(), ConsolidateError> {
    let file = std::fs::File::create(path)
        .map_err(|e| ConsolidateError::Export(format!("cannot create {}: {}", path.display(), e)))?;
    export_to_writer(records, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consolidator_core::cell::CellValue;
    use std::fs;
    use tempfile::tempdir;

    fn records() -> Vec<ConsolidatedRecord> {
        vec![
            ConsolidatedRecord { source_sheet: "Jan".into(), value: CellValue::from("a, b"), row_number: 4 },
            ConsolidatedRecord { source_sheet: "Feb".into(), value: CellValue::Number(0.0), row_number: 7 },
            ConsolidatedRecord { source_sheet: "Feb".into(), value: CellValue::Bool(false), row_number: 8 },
        ]
    }

    #[test]
    fn test_export_to_writer() {
        let mut buf = Vec::new();
        export_to_writer(&records(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Valor Consolidado,Aba de Origem,Linha Original");
        assert_eq!(lines[1], "\"a, b\",Jan,4");
        assert_eq!(lines[2], "0,Feb,7");
        assert_eq!(lines[3], "false,Feb,8");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export(&records(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Valor Consolidado"));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let err = export(&records(), Path::new("/nonexistent/dir/out.csv")).unwrap_err();
        assert!(matches!(err, ConsolidateError::Export(_)));
    }
}
