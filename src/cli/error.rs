use std::io;

use tally_config::ConfigError;
use tally_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0} tenant(s) failed during the run; see `audit` for details")]
    RunFailures(usize),
    #[error("unknown tenant `{slug}`{}", suggestion_suffix(.suggestion))]
    UnknownTenant {
        slug: String,
        suggestion: Option<String>,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean `{s}`?)"))
        .unwrap_or_default()
}
