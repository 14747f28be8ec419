use consolidator_core::session::AnalysisFailure;

/// Error from an insight request
#[derive(Debug, Clone, PartialEq)]
pub enum InsightError {
    /// Nothing to analyze
    EmptyDataset,
    /// Provider is set to none
    Disabled,
    /// API key not configured
    MissingKey,
    /// Transport failure (connect, timeout, TLS)
    Network(String),
    /// Service answered with a non-success status
    Api { status: u16, message: String },
    /// Service answered, but not with the expected JSON shape
    MalformedResponse(String),
}

impl InsightError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, InsightError::MalformedResponse(_))
    }

    /// Service could not be reached or refused the request
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            InsightError::Disabled
                | InsightError::MissingKey
                | InsightError::Network(_)
                | InsightError::Api { .. }
        )
    }
}

impl std::fmt::Display for InsightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightError::EmptyDataset => write!(f, "No consolidated values to analyze"),
            InsightError::Disabled => write!(f, "AI insights are disabled (provider = none)"),
            InsightError::MissingKey => write!(f, "API key not configured"),
            InsightError::Network(msg) => write!(f, "Network error: {}", msg),
            InsightError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            InsightError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for InsightError {}

impl From<InsightError> for AnalysisFailure {
    fn from(err: InsightError) -> Self {
        if err.is_malformed() {
            AnalysisFailure::Malformed(err.to_string())
        } else {
            AnalysisFailure::Unavailable(err.to_string())
        }
    }
}
