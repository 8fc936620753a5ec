use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required column is absent, duplicated, or holds the wrong kind of data
    #[error("schema error: {0}")]
    Schema(String),

    /// A search location names a column the table does not have
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Cross-reference lookup or construction failure
    #[error(transparent)]
    Index(#[from] uniprot::Error),

    /// A post-condition of the record linker does not hold
    #[error("linkage integrity error: {0}")]
    LinkageIntegrity(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
