use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Unknown source type: {0}")]
    UnknownSource(String),

    #[error("Unknown destination: {0}")]
    UnknownDestination(String),

    #[error("No data to transform. Run extract() first.")]
    NotExtracted,

    #[error("No transformed data to load. Run transform() first.")]
    NotTransformed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown session: {0}")]
    UnknownSession(uuid::Uuid),
}

pub type Result<T> = std::result::Result<T, EtlError>;
