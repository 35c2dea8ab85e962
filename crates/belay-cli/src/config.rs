use std::path::{Path, PathBuf};

use belay_catalog::CatalogConfig;
use belay_core::{Caller, ResourceKind};
use belay_logging::LogConfig;
use belay_storage::RedbStoreConfig;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// Settings read from the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BelayConfig {
    pub store: RedbStoreConfig,
    pub catalog: CatalogConfig,
    pub log: LogConfig,
}

impl BelayConfig {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply command line overrides
    pub fn apply(&mut self, cli: &Cli) {
        if let Some(db) = &cli.db {
            self.store.db_path = db.clone();
        }
        if let Some(level) = &cli.log_level {
            self.log.default_level = level.clone();
        }
        if cli.pretty {
            self.log.console.pretty = true;
        }
    }
}

#[derive(Parser)]
#[command(name = "belay", about = "Browse and edit a crag catalog")]
pub struct Cli {
    /// Config file path
    #[arg(long, default_value = "belay.toml")]
    pub config: PathBuf,
    /// Database file, overriding the config file
    #[arg(long)]
    pub db: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Human readable log output
    #[arg(long)]
    pub pretty: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Identity a read runs as
#[derive(Args, Debug, Clone, Default)]
pub struct CallerArgs {
    /// Read as a signed-in user
    #[arg(long, conflicts_with = "admin")]
    pub user: Option<String>,
    /// Read as an administrator (sees resources in review)
    #[arg(long)]
    pub admin: Option<String>,
}

impl CallerArgs {
    pub fn caller(&self) -> Caller {
        match (&self.admin, &self.user) {
            (Some(admin), _) => Caller::administrator(admin.as_str()),
            (None, Some(user)) => Caller::user(user.as_str()),
            (None, None) => Caller::Anonymous,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Write resources from a JSON array file as-is
    Seed {
        /// JSON file holding an array of resources
        file: PathBuf,
    },
    /// Show one resource
    Get {
        kind: ResourceKind,
        id: String,
        #[command(flatten)]
        caller: CallerArgs,
    },
    /// List the children of a resource at one level
    Children {
        kind: ResourceKind,
        parent: String,
        /// Return orderable levels in chain order
        #[arg(long)]
        ordered: bool,
        #[command(flatten)]
        caller: CallerArgs,
    },
    /// Show a resource with its descendants
    Subtree {
        kind: ResourceKind,
        id: String,
        /// Number of levels below the resource to include
        #[arg(long, default_value_t = 1)]
        depth: u32,
        #[command(flatten)]
        caller: CallerArgs,
    },
    /// Create an ordered chain of siblings from a JSON array of attributes
    BatchCreate {
        kind: ResourceKind,
        parent: String,
        file: PathBuf,
    },
    /// Delete several resources of one level, all or nothing
    BatchDelete {
        kind: ResourceKind,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every child of a resource at one level
    Clear { kind: ResourceKind, parent: String },
    /// Delete one resource that has no children
    Delete { kind: ResourceKind, id: String },
}
