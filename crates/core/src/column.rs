// Column labels: "A" -> 0, "Z" -> 25, "AA" -> 26 (bijective base-26)

use std::fmt;

use crate::error::ConsolidateError;

/// A column label that passed validation. Always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    label: String,
    index: usize,
}

impl ColumnLabel {
    /// Zero-based column index
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Validate a user-supplied column label against `^[A-Za-z]+$`.
///
/// No trimming: `" B"` is rejected. Labels too long to index are rejected too.
pub fn validate_column_label(input: &str) -> Result<ColumnLabel, ConsolidateError> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConsolidateError::Validation(format!(
            "column must be letters only (e.g. A, B, AA), got {:?}",
            input
        )));
    }

    let label = input.to_ascii_uppercase();
    let index = resolve_column(&label).ok_or_else(|| {
        ConsolidateError::Validation(format!("column {:?} is out of range", input))
    })?;

    Ok(ColumnLabel { label, index })
}

/// Resolve letters to a zero-based index.
///
/// Returns None for empty input, non-letters, or overflow.
pub fn resolve_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut number: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let value = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        number = number.checked_mul(26)?.checked_add(value)?;
    }
    Some(number - 1)
}
