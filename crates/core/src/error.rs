use std::fmt;

/// Errors raised while validating input, reading a workbook or exporting records.
///
/// Each variant is terminal for the operation that raised it.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsolidateError {
    /// Column label or extraction rule rejected before any file is read
    Validation(String),
    /// Workbook bytes could not be read as a supported spreadsheet
    Parse(String),
    /// Export workbook could not be built or written
    Export(String),
}

impl ConsolidateError {
    /// Short machine-readable tag, used in JSON error output
    pub fn kind(&self) -> &'static str {
        match self {
            ConsolidateError::Validation(_) => "validation_error",
            ConsolidateError::Parse(_) => "parse_error",
            ConsolidateError::Export(_) => "export_error",
        }
    }

    /// Underlying cause. Parse and export causes are logged, never shown verbatim.
    pub fn detail(&self) -> &str {
        match self {
            ConsolidateError::Validation(msg)
            | ConsolidateError::Parse(msg)
            | ConsolidateError::Export(msg) => msg,
        }
    }
}

impl fmt::Display for ConsolidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsolidateError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            ConsolidateError::Parse(msg) => write!(f, "Failed to read workbook: {}", msg),
            ConsolidateError::Export(msg) => write!(f, "Failed to export workbook: {}", msg),
        }
    }
}

impl std::error::Error for ConsolidateError {}
