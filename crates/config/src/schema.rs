//! Engine configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Unknown fields are rejected so typos never silently fall back to defaults.

use serde::{Deserialize, Serialize};
use snapdiff_shared::{BoundedU32, ErrorCode, ErrorEnvelope};
use std::fmt;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const SNAPSHOT_MAX_ENTRIES_MIN: u32 = 1;
const SNAPSHOT_MAX_ENTRIES_MAX: u32 = 10_000_000;
const SNAPSHOT_MAX_ENTRIES_DEFAULT: u32 = 1_000_000;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Snapshot construction settings.
    pub snapshot: SnapshotConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            snapshot: SnapshotConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(self) -> Result<ValidatedEngineConfig, ConfigSchemaError> {
        self.validate_version()?;
        let limits = ConfigLimits::new(&self)?;
        Ok(ValidatedEngineConfig { raw: self, limits })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

/// Validated config wrapper carrying bounded numeric values.
#[derive(Debug, Clone)]
pub struct ValidatedEngineConfig {
    raw: EngineConfig,
    limits: ConfigLimits,
}

impl ValidatedEngineConfig {
    /// Access validated numeric bounds.
    #[must_use]
    pub const fn limits(&self) -> &ConfigLimits {
        &self.limits
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> EngineConfig {
        self.raw
    }
}

impl AsRef<EngineConfig> for ValidatedEngineConfig {
    fn as_ref(&self) -> &EngineConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedEngineConfig {
    type Target = EngineConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Validated numeric limits derived from the config.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLimits {
    /// Maximum number of entries one snapshot may hold.
    pub snapshot_max_entries: BoundedU32<SNAPSHOT_MAX_ENTRIES_MIN, SNAPSHOT_MAX_ENTRIES_MAX>,
}

impl ConfigLimits {
    fn new(config: &EngineConfig) -> Result<Self, ConfigSchemaError> {
        Ok(Self {
            snapshot_max_entries: bounded_u32(
                "snapshot",
                "maxEntries",
                config.snapshot.max_entries,
                SNAPSHOT_MAX_ENTRIES_MIN,
                SNAPSHOT_MAX_ENTRIES_MAX,
            )?,
        })
    }
}

/// Parse an engine config from a JSON string, applying validation and normalization.
pub fn parse_engine_config_json(input: &str) -> Result<ValidatedEngineConfig, ErrorEnvelope> {
    let config: EngineConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse an engine config from a TOML string, applying validation and normalization.
pub fn parse_engine_config_toml(input: &str) -> Result<ValidatedEngineConfig, ErrorEnvelope> {
    let config: EngineConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Snapshot construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SnapshotConfig {
    /// Reject collections with more entries than this.
    pub max_entries: u32,
    /// Let snapshotters reuse a recorded digest when length and mtime match.
    pub reuse_fingerprints: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_entries: SNAPSHOT_MAX_ENTRIES_DEFAULT,
            reuse_fingerprints: true,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Default verbosity when `RUST_LOG` is unset.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Engine internals (diff summaries, merge counts).
    Debug,
    /// Normal operation.
    #[default]
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Stable lowercase name, also a valid `EnvFilter` directive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parse a level name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// Multi-line human readable output.
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }

    /// Parse a format name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A numeric limit is out of bounds.
    LimitOutOfRange {
        /// Schema section (e.g. `snapshot`).
        section: &'static str,
        /// Field name in the config file (e.g. `maxEntries`).
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version {found} (supported: {supported})"
            ),
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min}, {max}] (got {value})"
            ),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
        }
    }
}

fn bounded_u32<const MIN: u32, const MAX: u32>(
    section: &'static str,
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<BoundedU32<MIN, MAX>, ConfigSchemaError> {
    BoundedU32::try_new(value).map_err(|_| ConfigSchemaError::LimitOutOfRange {
        section,
        field,
        value: u64::from(value),
        min: u64::from(min),
        max: u64::from(max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn defaults_are_applied() -> Result<(), Box<dyn Error>> {
        let config = parse_engine_config_json("{}")?;

        assert_eq!(config.version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.snapshot, SnapshotConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.limits().snapshot_max_entries.get(), 1_000_000);
        assert!(config.snapshot.reuse_fingerprints);
        Ok(())
    }

    #[test]
    fn out_of_range_limit_returns_error_code() -> Result<(), Box<dyn Error>> {
        let payload = serde_json::json!({
            "version": 1,
            "snapshot": { "maxEntries": 0 }
        });

        let error = parse_engine_config_json(&payload.to_string())
            .err()
            .ok_or_else(|| std::io::Error::other("expected validation error"))?;
        assert_eq!(error.code, ErrorCode::new("config", "invalid_limit"));
        assert_eq!(
            error.metadata.get("section").map(String::as_str),
            Some("snapshot")
        );
        assert_eq!(
            error.metadata.get("field").map(String::as_str),
            Some("maxEntries")
        );
        Ok(())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = parse_engine_config_json(r#"{ "snapshot": { "maxEntry": 5 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn unsupported_version_is_rejected() -> Result<(), Box<dyn Error>> {
        let error = parse_engine_config_json(r#"{ "version": 2 }"#)
            .err()
            .ok_or_else(|| std::io::Error::other("expected version error"))?;
        assert!(error.has_code("config", "unsupported_version"));
        assert_eq!(error.metadata.get("found").map(String::as_str), Some("2"));
        Ok(())
    }

    #[test]
    fn logging_enums_parse_leniently() {
        assert_eq!(LogLevel::parse(" WARNING "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn toml_sections_use_camel_case_keys() -> Result<(), Box<dyn Error>> {
        let config = parse_engine_config_toml(
            "version = 1\n[snapshot]\nmaxEntries = 10\nreuseFingerprints = false\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
        )?;
        assert_eq!(config.snapshot.max_entries, 10);
        assert!(!config.snapshot.reuse_fingerprints);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        Ok(())
    }
}
