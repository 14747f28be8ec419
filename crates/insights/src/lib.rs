// AI insights over consolidated values
//
// `request_insights` builds the prompt from a capped sample and hands it to an
// `InsightProvider`. `GeminiProvider` is the HTTP implementation; tests use
// stubs.

pub mod error;
pub mod gemini;
pub mod provider;

pub use error::InsightError;
pub use gemini::GeminiProvider;
pub use provider::{build_prompt, parse_insight_json, request_insights, sample_values, InsightProvider, InsightRequest};
