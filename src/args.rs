//! The CLI interface for the standalone widget binary.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// ynab-mirror: a smart-mirror budget widget backed by the YNAB API.
///
/// Polls a YNAB budget for category balances and recent spending, and renders the widget
/// markup to stdout whenever it changes. The access token comes from the configuration file
/// or the YNAB_TOKEN environment variable.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    /// The path to the widget configuration file (JSON).
    #[arg(long, env = "YNAB_MIRROR_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// The YNAB personal access token. Overrides the token in the configuration file.
    #[arg(long, env = "YNAB_TOKEN")]
    token: Option<String>,

    /// The logging verbosity. One of, from least to most verbose:
    /// none, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,
}

impl Args {
    pub fn config(&self) -> &Path {
        &self.config
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}
