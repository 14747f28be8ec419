//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                                  |
//! |---------|------------------|----------------------------------------------|
//! | 0       | Universal        | Success                                      |
//! | 1       | Universal        | General error (unspecified)                  |
//! | 2       | Universal        | Usage error (bad args, invalid column label) |
//! | 3-9     | consolidate      | Workbook read and export failures            |
//! | 10-19   | ai               | AI provider, keychain and insight failures   |

use consolidator_insights::InsightError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid column label or start row.
/// Reported before the workbook is opened.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Consolidate (3-9)
// =============================================================================

/// Workbook could not be read (missing, corrupt, unsupported format).
pub const EXIT_PARSE: u8 = 3;

/// Consolidated workbook or CSV could not be written.
pub const EXIT_EXPORT: u8 = 4;

// =============================================================================
// AI (10-19)
// =============================================================================

/// AI disabled (provider=none).
pub const EXIT_AI_DISABLED: u8 = 10;

/// AI provider configured but API key missing.
pub const EXIT_AI_MISSING_KEY: u8 = 11;

/// Keychain error (cannot read/write credentials).
pub const EXIT_AI_KEYCHAIN_ERR: u8 = 12;

/// Insight service unreachable or returned an error status.
pub const EXIT_AI_UNAVAILABLE: u8 = 13;

/// Insight service replied with something other than the expected JSON.
pub const EXIT_AI_MALFORMED: u8 = 14;

/// Nothing to analyze (no consolidated values).
pub const EXIT_AI_EMPTY_DATASET: u8 = 15;

/// Map an insight failure to its exit code.
pub fn insight_exit_code(err: &InsightError) -> u8 {
    match err {
        InsightError::EmptyDataset => EXIT_AI_EMPTY_DATASET,
        InsightError::Disabled => EXIT_AI_DISABLED,
        InsightError::MissingKey => EXIT_AI_MISSING_KEY,
        InsightError::Network(_) | InsightError::Api { .. } => EXIT_AI_UNAVAILABLE,
        InsightError::MalformedResponse(_) => EXIT_AI_MALFORMED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_PARSE,
            EXIT_EXPORT,
            EXIT_AI_DISABLED,
            EXIT_AI_MISSING_KEY,
            EXIT_AI_KEYCHAIN_ERR,
            EXIT_AI_UNAVAILABLE,
            EXIT_AI_MALFORMED,
            EXIT_AI_EMPTY_DATASET,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn test_insight_exit_codes() {
        assert_eq!(insight_exit_code(&InsightError::MissingKey), 11);
        assert_eq!(insight_exit_code(&InsightError::Network("x".into())), 13);
        assert_eq!(insight_exit_code(&InsightError::Api { status: 503, message: String::new() }), 13);
        assert_eq!(insight_exit_code(&InsightError::MalformedResponse("x".into())), 14);
        assert_eq!(insight_exit_code(&InsightError::EmptyDataset), 15);
    }
}
