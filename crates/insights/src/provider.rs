// Prompt building, sampling and the provider seam

use consolidator_core::record::{ConsolidatedRecord, InsightResult};

use crate::error::InsightError;

/// What a provider is asked to analyze
#[derive(Debug, Clone, PartialEq)]
pub struct InsightRequest {
    /// Comma-joined sample of the consolidated values
    pub sample: String,
    /// Values included in the sample
    pub sample_size: usize,
    /// Full instruction text sent to the model
    pub prompt: String,
}

/// Something that can turn a prompt into an `InsightResult`.
///
/// Implementations make exactly one attempt; there is no retry or caching.
pub trait InsightProvider {
    fn generate(&self, request: &InsightRequest) -> Result<InsightResult, InsightError>;
}

/// First `limit` values, rendered and joined with ", "
pub fn sample_values(records: &[ConsolidatedRecord], limit: usize) -> (String, usize) {
    let values: Vec<String> = records
        .iter()
        .take(limit)
        .map(|r| r.value.display())
        .collect();
    let count = values.len();
    (values.join(", "), count)
}

pub fn build_prompt(sample: &str, limit: usize) -> String {
    format!(
        "Analise os seguintes dados consolidados de uma planilha Excel \
(mostrando apenas os primeiros {limit} itens se houver mais):\n\n\
Dados: {sample}\n\n\
Por favor, forneça um resumo do que esses dados representam, 3 insights principais \
baseados nos valores e sugira categorias para organizar esses dados."
    )
}

/// Parse the model's text reply. Anything but the exact JSON object is malformed.
pub fn parse_insight_json(text: &str) -> Result<InsightResult, InsightError> {
    if text.trim().is_empty() {
        return Err(InsightError::MalformedResponse("empty response text".to_string()));
    }
    serde_json::from_str(text).map_err(|e| InsightError::MalformedResponse(e.to_string()))
}

/// Ask `provider` for insights on the first `sample_limit` records.
///
/// Fails with `EmptyDataset` without calling the provider when there is
/// nothing to analyze.
pub fn request_insights<P: InsightProvider + ?Sized>(
    provider: &P,
    records: &[ConsolidatedRecord],
    sample_limit: usize,
) -> Result<InsightResult, InsightError> {
    if records.is_empty() {
        return Err(InsightError::EmptyDataset);
    }

    let limit = sample_limit.max(1);
    let (sample, sample_size) = sample_values(records, limit);
    log::info!("requesting insights on {} of {} values", sample_size, records.len());

    let request = InsightRequest {
        prompt: build_prompt(&sample, limit),
        sample,
        sample_size,
    };
    provider.generate(&request)
}
