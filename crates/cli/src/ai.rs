// `consolidator ai ...` commands

use std::path::Path;

use consolidator_config::ai::{self, AIConfigStatus, AIDiagnostics, ResolvedAIConfig};
use consolidator_config::settings::Settings;

use crate::exit_codes::{EXIT_AI_DISABLED, EXIT_AI_KEYCHAIN_ERR, EXIT_AI_MISSING_KEY};
use crate::CliError;

pub fn cmd_ai_doctor(settings: &Settings, config_path: &Path, json: bool) -> Result<(), CliError> {
    let config = ResolvedAIConfig::from_settings(&settings.ai);
    let diag = AIDiagnostics::from_resolved(&config);

    if json {
        let json_output = serde_json::json!({
            "schema_version": 1,
            "status": diag.status.as_str(),
            "blocking_reason": config.blocking_reason,
            "provider": diag.provider,
            "model": diag.model,
            "endpoint": diag.endpoint,
            "key": if diag.key_present { "present" } else { "missing" },
            "key_source": diag.key_source.as_str(),
            "keychain": if diag.keychain_available { "ok" } else { "unavailable" },
            "sample_limit": diag.sample_limit,
        });
        let text = serde_json::to_string_pretty(&json_output)
            .map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", text);
    } else {
        print!("{}", diag);
        match config.status {
            AIConfigStatus::Disabled => {
                println!();
                println!("AI is disabled. To enable:");
                println!("  Set ai.provider to \"gemini\" in {}", config_path.display());
            }
            AIConfigStatus::MissingKey => {
                println!();
                println!(
                    "Fix: set {} or store the key with `consolidator ai set-key`",
                    ai::env_var_name(config.provider_name())
                );
            }
            AIConfigStatus::Ready => {}
        }
    }

    match config.status {
        AIConfigStatus::Ready => Ok(()),
        AIConfigStatus::Disabled => Err(CliError {
            code: EXIT_AI_DISABLED,
            message: "AI is disabled".to_string(),
            hint: None,
        }),
        AIConfigStatus::MissingKey => Err(CliError {
            code: EXIT_AI_MISSING_KEY,
            message: "API key not configured".to_string(),
            hint: config.blocking_reason,
        }),
    }
}

pub fn cmd_ai_set_key(settings: &Settings, key: &str) -> Result<(), CliError> {
    let provider = settings.ai.provider;
    if !provider.is_enabled() {
        return Err(CliError {
            code: EXIT_AI_DISABLED,
            message: "AI is disabled; no provider to store a key for".to_string(),
            hint: None,
        });
    }
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::args("API key is empty"));
    }

    ai::set_api_key(provider.name(), key).map_err(|e| CliError {
        code: EXIT_AI_KEYCHAIN_ERR,
        message: e,
        hint: Some(format!("export {}=<key>", ai::env_var_name(provider.name()))),
    })?;

    eprintln!("Stored {} key in the system keychain", provider.name());
    Ok(())
}

pub fn cmd_ai_clear_key(settings: &Settings) -> Result<(), CliError> {
    let provider = settings.ai.provider;
    ai::delete_api_key(provider.name()).map_err(|e| CliError {
        code: EXIT_AI_KEYCHAIN_ERR,
        message: e,
        hint: None,
    })?;

    eprintln!("Removed {} key from the system keychain", provider.name());
    Ok(())
}
