use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request to host failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("host returned error {code}: {msg}")]
    Host { code: i64, msg: String },

    #[error("local store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unreadable document: {0}")]
    Map(#[from] MapError),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// A block that could not be turned back into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("block {block}: missing attribute {attr}")]
    MissingAttr { block: String, attr: &'static str },

    #[error("block {block}: invalid {attr} value {value:?}")]
    InvalidAttr {
        block: String,
        attr: &'static str,
        value: String,
    },
}
