//! Config loading helpers (env + file + overrides).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{EngineConfig, EngineEnv, LogFormat, LogLevel, ValidatedEngineConfig, apply_env_overrides};
use serde::Deserialize;
use snapdiff_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the engine config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`EngineEnv`)
/// - overrides JSON (partial config)
/// - config JSON (file content)
/// - defaults (`EngineConfig::default()`)
pub fn load_engine_config_from_sources(
    config_json: Option<&str>,
    overrides_json: Option<&str>,
    env: &EngineEnv,
) -> Result<ValidatedEngineConfig, ErrorEnvelope> {
    let mut config = match config_json {
        None => EngineConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };

    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        apply_overrides(&mut config, &overrides);
    }

    // env is applied last and also validates the resulting config.
    apply_env_overrides(config, env)
}

/// Load the engine config from an optional file path (`.json` or `.toml`).
pub fn load_engine_config_from_path(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &EngineEnv,
) -> Result<ValidatedEngineConfig, ErrorEnvelope> {
    let mut config = match config_path {
        None => EngineConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };

    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        apply_overrides(&mut config, &overrides);
    }

    apply_env_overrides(config, env)
}

/// Load the engine config from std env and an optional file path.
pub fn load_engine_config_std_env(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ValidatedEngineConfig, ErrorEnvelope> {
    let env = EngineEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_engine_config_from_path(config_path, overrides_json, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &EngineConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_json"),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &EngineConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<EngineConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn parse_overrides_json(input: &str) -> Result<EngineConfigOverrides, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid overrides JSON: {error}"),
        )
        .with_metadata("source", "overrides")
    })
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct EngineConfigOverrides {
    version: Option<u32>,
    snapshot: SnapshotConfigOverrides,
    logging: LoggingConfigOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct SnapshotConfigOverrides {
    max_entries: Option<u32>,
    reuse_fingerprints: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct LoggingConfigOverrides {
    level: Option<LogLevel>,
    format: Option<LogFormat>,
}

fn apply_overrides(config: &mut EngineConfig, overrides: &EngineConfigOverrides) {
    set(&mut config.version, overrides.version);
    set(&mut config.snapshot.max_entries, overrides.snapshot.max_entries);
    set(
        &mut config.snapshot.reuse_fingerprints,
        overrides.snapshot.reuse_fingerprints,
    );
    set(&mut config.logging.level, overrides.logging.level);
    set(&mut config.logging.format, overrides.logging.format);
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_precedence_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
        let config_json = r#"{
          "version": 1,
          "snapshot": { "maxEntries": 100 },
          "logging": { "level": "warn" }
        }"#;

        let overrides_json = r#"{
          "snapshot": { "maxEntries": 200 },
          "logging": { "format": "json" }
        }"#;

        let env = EngineEnv {
            snapshot_max_entries: Some(300),
            ..EngineEnv::default()
        };

        let config =
            load_engine_config_from_sources(Some(config_json), Some(overrides_json), &env)?;
        assert_eq!(config.snapshot.max_entries, 300);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.logging.format, LogFormat::Json);
        Ok(())
    }

    #[test]
    fn serialization_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_engine_config_from_sources(None, None, &EngineEnv::default())?;
        let first = to_pretty_json(&config)?;
        let second = to_pretty_json(&config)?;
        assert_eq!(first, second);
        assert!(first.contains("\"maxEntries\": 1000000"));

        let toml_text = to_pretty_toml(&config)?;
        let reparsed = crate::parse_engine_config_toml(&toml_text)?;
        assert_eq!(*reparsed, *config);
        Ok(())
    }

    #[test]
    fn invalid_config_value_overridden_by_valid_env_succeeds()
    -> Result<(), Box<dyn std::error::Error>> {
        let config_json = r#"{ "version": 1, "snapshot": { "maxEntries": 0 } }"#;
        let env = EngineEnv {
            snapshot_max_entries: Some(10),
            ..EngineEnv::default()
        };

        let config = load_engine_config_from_sources(Some(config_json), None, &env)?;
        assert_eq!(config.limits().snapshot_max_entries.get(), 10);
        Ok(())
    }

    #[test]
    fn malformed_overrides_fail_with_source() -> Result<(), Box<dyn std::error::Error>> {
        let result = load_engine_config_from_sources(
            None,
            Some(r#"{ "snapshot": { "maxEntries": }"#),
            &EngineEnv::default(),
        );

        let error = result
            .err()
            .ok_or_else(|| std::io::Error::other("expected overrides error"))?;
        assert_eq!(error.code, ErrorCode::new("config", "invalid_json"));
        assert_eq!(
            error.metadata.get("source").map(String::as_str),
            Some("overrides")
        );
        Ok(())
    }

    #[test]
    fn env_value_is_still_validated() -> Result<(), Box<dyn std::error::Error>> {
        let env = EngineEnv {
            snapshot_max_entries: Some(20_000_000),
            ..EngineEnv::default()
        };

        let error = load_engine_config_from_sources(None, None, &env)
            .err()
            .ok_or_else(|| std::io::Error::other("expected limit error"))?;
        assert_eq!(error.code, ErrorCode::new("config", "invalid_limit"));
        Ok(())
    }

    #[test]
    fn unknown_extension_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let error = detect_config_format(Path::new("engine.yaml"))
            .err()
            .ok_or_else(|| std::io::Error::other("expected format error"))?;
        assert_eq!(error.code, ErrorCode::new("config", "unsupported_format"));
        assert_eq!(detect_config_format(Path::new("engine.TOML"))?, ConfigFormat::Toml);
        Ok(())
    }
}
