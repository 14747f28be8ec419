// Text and JSON rendering of a consolidation run

use consolidator_core::consolidate::ExtractionRules;
use consolidator_core::record::{ConsolidationResult, InsightResult};
use consolidator_io::ExportResult;

use crate::util::{display_width, one_line, pad_left, pad_right};

const MAX_VALUE_WIDTH: usize = 48;
const MAX_SHEET_WIDTH: usize = 24;

/// Result table: header, per-sheet counts, then the first `preview` records.
pub fn render_result(result: &ConsolidationResult, rules: &ExtractionRules, preview: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}  ({})\n", result.file_name, result.summary()));
    out.push_str(&format!(
        "column {} from row {}\n",
        rules.column.to_ascii_uppercase(),
        rules.start_row
    ));
    out.push('\n');

    let sheet_width = result
        .sheets
        .iter()
        .map(|s| display_width(&s.name))
        .max()
        .unwrap_or(0)
        .clamp(5, MAX_SHEET_WIDTH);

    for sheet in &result.sheets {
        out.push_str(&format!(
            "  {}  {} value{}\n",
            pad_right(&sheet.name, sheet_width),
            pad_left(&sheet.records_emitted.to_string(), 6),
            if sheet.records_emitted == 1 { "" } else { "s" }
        ));
    }

    if result.is_empty() {
        out.push_str("\nNo values found.\n");
        return out;
    }

    let shown = &result.data[..preview.min(result.data.len())];
    if shown.is_empty() {
        return out;
    }

    let values: Vec<String> = shown.iter().map(|r| one_line(&r.value.display())).collect();
    let value_width = values
        .iter()
        .map(|v| display_width(v))
        .max()
        .unwrap_or(0)
        .clamp(5, MAX_VALUE_WIDTH);
    let index_width = shown.len().to_string().len().max(1);

    out.push('\n');
    out.push_str(&format!(
        "{}  {}  {}  {}\n",
        pad_left("#", index_width),
        pad_right("Value", value_width),
        pad_right("Sheet", sheet_width),
        "Row"
    ));
    out.push_str(&format!(
        "{}  {}  {}  {}\n",
        "-".repeat(index_width),
        "-".repeat(value_width),
        "-".repeat(sheet_width),
        "---"
    ));

    for (i, (record, value)) in shown.iter().zip(&values).enumerate() {
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            pad_left(&(i + 1).to_string(), index_width),
            pad_right(value, value_width),
            pad_right(&record.source_sheet, sheet_width),
            record.row_number
        ));
    }

    let hidden = result.data.len() - shown.len();
    if hidden > 0 {
        out.push_str(&format!("… {} more\n", hidden));
    }

    out
}

pub fn render_insights(analysis: &InsightResult) -> String {
    let mut out = String::new();
    out.push_str("Insights\n");
    out.push_str("--------\n");
    out.push_str(&analysis.summary);
    out.push('\n');
    if !analysis.insights.is_empty() {
        out.push('\n');
        for (i, insight) in analysis.insights.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, insight));
        }
    }
    if !analysis.suggested_categories.is_empty() {
        out.push_str(&format!("\nCategories: {}\n", analysis.suggested_categories.join(", ")));
    }
    out
}

/// Machine-readable form of a run. `analysis` and `export` appear only when present.
pub fn result_json(
    result: &ConsolidationResult,
    analysis: Option<&InsightResult>,
    exported: Option<&ExportResult>,
) -> serde_json::Value {
    let mut value = serde_json::json!({
        "fileName": result.file_name,
        "totalSheets": result.total_sheets,
        "totalRows": result.total_rows,
        "sheets": result.sheets,
        "data": result.data,
    });
    if let Some(analysis) = analysis {
        value["analysis"] = serde_json::json!(analysis);
    }
    if let Some(exported) = exported {
        value["export"] = serde_json::json!({
            "path": exported.path.to_string_lossy(),
            "rows": exported.rows_exported,
            "durationMs": exported.export_duration_ms as u64,
        });
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use consolidator_core::cell::CellValue;
    use consolidator_core::record::{ConsolidatedRecord, SheetSummary};

    fn result() -> ConsolidationResult {
        ConsolidationResult {
            file_name: "vendas.xlsx".into(),
            total_sheets: 2,
            total_rows: 3,
            data: vec![
                ConsolidatedRecord { source_sheet: "Jan".into(), value: CellValue::from("x"), row_number: 4 },
                ConsolidatedRecord { source_sheet: "Jan".into(), value: CellValue::Number(0.0), row_number: 5 },
                ConsolidatedRecord { source_sheet: "Fev".into(), value: CellValue::from("a\nb"), row_number: 9 },
            ],
            sheets: vec![
                SheetSummary { name: "Jan".into(), rows_scanned: 2, records_emitted: 2 },
                SheetSummary { name: "Fev".into(), rows_scanned: 6, records_emitted: 1 },
            ],
        }
    }

    #[test]
    fn renders_header_sheets_and_rows() {
        let text = render_result(&result(), &ExtractionRules::default(), 50);
        assert!(text.starts_with("vendas.xlsx  (2 sheets · 3 values)\n"));
        assert!(text.contains("column B from row 4"));
        assert!(text.contains("2 values"));
        assert!(text.contains("1 value\n"));
        assert!(text.contains("a b"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn preview_is_capped() {
        let text = render_result(&result(), &ExtractionRules::default(), 1);
        assert!(text.contains("… 2 more"));
        assert!(!text.contains("Fev    9"));
    }

    #[test]
    fn empty_result_says_so() {
        let mut empty = result();
        empty.data.clear();
        empty.total_rows = 0;
        let text = render_result(&empty, &ExtractionRules::default(), 50);
        assert!(text.contains("No values found."));
    }

    #[test]
    fn json_shape() {
        let json = result_json(&result(), None, None);
        assert_eq!(json["totalSheets"], 2);
        assert_eq!(json["totalRows"], 3);
        assert_eq!(json["data"][0]["sourceSheet"], "Jan");
        assert_eq!(json["data"][1]["value"], 0);
        assert_eq!(json["data"][2]["rowNumber"], 9);
        assert!(json.get("analysis").is_none());
        assert!(json.get("export").is_none());
    }

    #[test]
    fn insights_text() {
        let analysis = InsightResult {
            summary: "Vendas por mês".into(),
            insights: vec!["a".into(), "b".into()],
            suggested_categories: vec!["Frutas".into(), "Legumes".into()],
        };
        let text = render_insights(&analysis);
        assert!(text.contains("Vendas por mês"));
        assert!(text.contains("2. b"));
        assert!(text.contains("Categories: Frutas, Legumes"));
    }
}
