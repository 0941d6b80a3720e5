//! Shared configuration loader for the manuscript interchange engine.
//!
//! `defaults/manuscript.default.toml` is embedded into every host so that docs and runtime
//! behavior stay in sync. Hosts layer user-specific files on top of those defaults via
//! [`Loader`] before deserializing into [`ManuscriptConfig`], then turn the sections into the
//! option structs `manuscript-transform` takes.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use manuscript_transform::formats::jats::{ExportOptions, ImportOptions, JatsVersion};
use manuscript_transform::formats::json::JsonOptions;
use manuscript_transform::FormatError;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const DEFAULT_TOML: &str = include_str!("../defaults/manuscript.default.toml");

/// Top-level configuration consumed by hosts of the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ManuscriptConfig {
    pub import: ImportConfig,
    pub export: ExportConfig,
    pub migration: MigrationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub max_depth: usize,
    pub default_title: String,
}

impl TryFrom<&ImportConfig> for ImportOptions {
    type Error = FormatError;

    fn try_from(config: &ImportConfig) -> Result<Self, Self::Error> {
        if config.max_depth == 0 {
            return Err(FormatError::InvalidInput(
                "import.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(ImportOptions {
            max_depth: config.max_depth,
            default_title: config.default_title.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub version: String,
    pub front_matter_only: bool,
}

impl TryFrom<&ExportConfig> for ExportOptions {
    type Error = FormatError;

    fn try_from(config: &ExportConfig) -> Result<Self, Self::Error> {
        Ok(ExportOptions {
            version: config.version.parse::<JatsVersion>()?,
            front_matter_only: config.front_matter_only,
            ..ExportOptions::default()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    pub allow_newer: bool,
}

impl From<&MigrationConfig> for JsonOptions {
    fn from(config: &MigrationConfig) -> Self {
        JsonOptions {
            allow_newer: config.allow_newer,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `("export.version", "1.1")`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ManuscriptConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ManuscriptConfig, ConfigError> {
    Loader::new().build()
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error(transparent)]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// The filter `init_logging` installs: `RUST_LOG` when it is set and valid, else the
/// configured directives.
pub fn log_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|source| LoggingError::Filter {
        filter: config.filter.clone(),
        source,
    })
}

/// Installs a global `fmt` subscriber writing to stderr.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(log_filter(config)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
