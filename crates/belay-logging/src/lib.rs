//! Structured logging for the Belay catalog
//!
//! Wraps `tracing-subscriber` with a configuration layer and a caller
//! context layer, so that every span opened while serving a request is
//! tagged with the identity the request runs as.
//!
//! # Features
//!
//! - **JSONL output**: one JSON object per line, on the console or in files
//! - **Caller context**: spans carry the active [`belay_core::Caller`]
//! - **File rotation**: daily, hourly or never
//!
//! # Quick Start
//!
//! ```ignore
//! use belay_logging::{BelaySubscriberBuilder, CallerContextGuard, LogConfig};
//!
//! let _guard = BelaySubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init()?;
//!
//! let _caller = CallerContextGuard::new(&belay_core::Caller::Anonymous);
//! tracing::info!(kind = "crag", "Listing children");
//! ```

pub mod config;
pub mod context;
pub mod layers;

pub use config::*;
pub use context::*;
pub use layers::*;

use std::fs::{self, File};
use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Layer, Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Errors raised while installing the global subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log file in {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Keeps background log writers alive; dropping it flushes them
#[must_use = "dropping the guard stops file logging"]
#[derive(Default)]
pub struct LoggingGuard {
    writers: Vec<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether a file writer is attached
    pub fn has_file_writer(&self) -> bool {
        !self.writers.is_empty()
    }
}

type Base = Layered<CallerContextLayer, Layered<EnvFilter, Registry>>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

/// Builder for configuring the tracing subscriber
pub struct BelaySubscriberBuilder {
    config: LogConfig,
}

impl BelaySubscriberBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Use pretty console format instead of JSONL
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.config.console.pretty = pretty;
        self
    }

    /// Enable file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Build the subscriber and install it as the global default
    ///
    /// Fails if a global subscriber is already installed or the log file
    /// cannot be prepared.
    pub fn init(self) -> Result<LoggingGuard, LoggingError> {
        let env_filter = self.env_filter()?;
        let (layers, guard) = self.output_layers()?;

        Registry::default()
            .with(env_filter)
            .with(CallerContextLayer::new())
            .with(layers)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

        Ok(guard)
    }

    /// Like [`init`](Self::init), but a subscriber that is already
    /// installed is not an error
    pub fn try_init(self) -> Option<LoggingGuard> {
        self.init().ok()
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.config.default_level)
                .map_err(|e| LoggingError::Filter(e.to_string())),
        }
    }

    fn output_layers(&self) -> Result<(Vec<BoxedLayer>, LoggingGuard), LoggingError> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = LoggingGuard::default();

        if self.config.console.enabled {
            if self.config.console.pretty {
                layers.push(pretty_layer(self.config.console.ansi));
            } else {
                layers.push(jsonl_layer(&self.config.jsonl, std::io::stdout));
            }
        }

        if let Some(file_config) = &self.config.file {
            let (writer, worker) = tracing_appender::non_blocking(create_file_writer(file_config)?);
            layers.push(jsonl_layer(&self.config.jsonl, writer));
            guard.writers.push(worker);
        }

        Ok((layers, guard))
    }
}

impl Default for BelaySubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn create_file_writer(
    config: &FileConfig,
) -> Result<Box<dyn std::io::Write + Send + 'static>, LoggingError> {
    let io_err = |source| LoggingError::LogFile {
        path: config.directory.clone(),
        source,
    };
    fs::create_dir_all(&config.directory).map_err(io_err)?;

    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.jsonl", config.prefix));
            let file = File::create(&path).map_err(io_err)?;
            return Ok(Box::new(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&config.prefix)
        .filename_suffix("jsonl")
        .build(&config.directory)
        .map_err(|e| LoggingError::LogFile {
            path: config.directory.clone(),
            source: std::io::Error::other(e),
        })?;
    Ok(Box::new(appender))
}

/// Install the default configuration
pub fn init_default() -> Result<LoggingGuard, LoggingError> {
    BelaySubscriberBuilder::new().init()
}

/// Install the development configuration
pub fn init_development() -> Result<LoggingGuard, LoggingError> {
    BelaySubscriberBuilder::new()
        .with_config(LogConfig::development())
        .init()
}

/// Install the testing configuration, ignoring an existing subscriber
pub fn init_testing() {
    let _ = BelaySubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
