use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoongImcError {
    #[error("Physical memory operation failed: {0}")]
    MemError(String),

    #[error("IOCSR operation failed: {0}")]
    IocsrError(String),

    #[error("Affinity operation failed: {0}")]
    AffinityError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Nix error: {0}")]
    NixError(#[from] nix::Error),

    #[error("Prometheus error: {0}")]
    PrometheusError(#[from] prometheus::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl From<loongimc_raw::MemError> for LoongImcError {
    fn from(e: loongimc_raw::MemError) -> Self {
        LoongImcError::MemError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LoongImcError>;
