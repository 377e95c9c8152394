#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bit pattern 0x{bits:X} does not fit in {total_bits} bits")]
    InvalidInput { bits: u32, total_bits: u32 },

    #[error("unknown float format: {0}")]
    NotFound(String),

    #[error("invalid float format: {0}")]
    InvalidFormat(String),

    #[error("invalid reference value: {0:?}")]
    InvalidReference(String),

    #[error("{0}")]
    Usage(String),

    #[error("JSON error ({0})")]
    Json(#[from] serde_json::Error),

    #[error("I/O error ({0})")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for String {
    fn from(err: Error) -> Self { err.to_string() }
}
