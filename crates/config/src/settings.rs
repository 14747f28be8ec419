// Application settings
// Loaded from ~/.config/consolidator/settings.json (or an explicit path)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use consolidator_core::consolidate::{ExtractionRules, DEFAULT_COLUMN, DEFAULT_START_ROW};

/// Default number of records shown in the terminal preview
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

/// Default cap on values sent to the insight service
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    /// AI insights disabled
    None,
    /// Google Gemini API (default)
    #[default]
    Gemini,
}

impl AIProvider {
    /// Returns true if AI features are enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AIProvider::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AIProvider::None => "none",
            AIProvider::Gemini => "gemini",
        }
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::Gemini => "gemini-3-flash-preview",
        }
    }

    /// Returns the default API base URL for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            AIProvider::None => "",
            AIProvider::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        self.is_enabled()
    }
}

/// Which column to read and where to start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionSettings {
    pub column: String,
    /// 1-based
    pub start_row: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            column: DEFAULT_COLUMN.to_string(),
            start_row: DEFAULT_START_ROW,
        }
    }
}

/// Terminal output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub preview_rows: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { preview_rows: DEFAULT_PREVIEW_ROWS }
    }
}

/// AI-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AISettings {
    /// Selected AI provider
    pub provider: AIProvider,

    /// Model identifier (provider-specific)
    pub model: String,

    /// API base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Maximum number of values included in the prompt
    pub sample_limit: usize,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            provider: AIProvider::Gemini,
            model: String::new(), // Empty = use provider default
            endpoint: None,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl AISettings {
    /// Get the effective model (user-specified or provider default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    /// Get the effective API base URL
    pub fn effective_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extraction: ExtractionSettings,
    pub display: DisplaySettings,
    pub ai: AISettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("consolidator");
        config_dir.join("settings.json")
    }

    /// Load settings from a path, falling back to defaults.
    ///
    /// A missing file is not an error and is never created here.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no settings at {}; using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Extraction rules for a run, with optional per-run overrides
    pub fn rules(&self, column: Option<&str>, start_row: Option<usize>) -> ExtractionRules {
        ExtractionRules::new(
            column.unwrap_or(&self.extraction.column),
            start_row.unwrap_or(self.extraction.start_row),
        )
    }
}
