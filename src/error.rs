use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CashbuildError {
    #[error("Config directory not found at {0}. Run 'cashbuild init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'cashbuild list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Invoice '{0}' is already paid; reminders cannot be sent")]
    AlreadyPaid(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD or an RFC 3339 timestamp.")]
    InvalidDate(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CashbuildError>;
