use chembox::core::chemistry::compositions::RulesLoadError;
use chembox::core::chemistry::templates::TemplateLoadError;
use chembox::engine::config::ConfigLoadError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("Composition rules error: {0}")]
    Rules(#[from] RulesLoadError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateLoadError),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}
