//! # snapdiff-config
//!
//! Configuration schema, validation, and loading for the snapshot engine.
//! This crate depends on `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigLimits, ConfigSchemaError, EngineConfig, LogFormat, LogLevel,
    LoggingConfig, SnapshotConfig, ValidatedEngineConfig, parse_engine_config_json,
    parse_engine_config_toml,
};

pub use env::{EngineEnv, EnvParseError, apply_env_overrides};
pub use load::{
    load_engine_config_from_path, load_engine_config_from_sources, load_engine_config_std_env,
    to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
