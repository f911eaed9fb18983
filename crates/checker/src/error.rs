use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Config file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Analysis error: {0}")]
    Analyzer(#[from] tablecompat_core::analyzer::error::AnalyzerError),

    #[error("No [output] section configured")]
    MissingOutput,

    #[error("Invalid queries: {}", .0.join(", "))]
    InvalidQueries(Vec<String>),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
