use thiserror::Error;

/// Failures reading or writing a backing medium.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("request to spreadsheet service failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 401: the access token is missing, expired or revoked.
    #[error("spreadsheet service rejected the credential (HTTP 401): {message}")]
    Unauthorized { message: String },

    #[error("spreadsheet service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Only raised when the reset-on-mismatch policy is turned off.
    #[error("{medium} has a foreign header [{found}]; refusing to reset it")]
    SchemaMismatch { medium: String, found: String },

    #[error("row {row} is malformed: {reason}")]
    MalformedRow { row: usize, reason: String },
}

/// Failures of query and mutation operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("company name must not be empty")]
    EmptyCompany,

    #[error("position {position} is out of range ({len} applications)")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("job link '{0}' contains the reserved separator '|'")]
    InvalidLink(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
