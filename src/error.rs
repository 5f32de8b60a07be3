//! Error types for busbar-sf-extract.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// The underlying SOQL error, if this error came from query construction.
    pub fn soql_error(&self) -> Option<&busbar_sf_soql::Error> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<busbar_sf_soql::Error>())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("SOQL error: {0}")]
    Soql(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Query on {sobject} does not select primary key(s): {}", keys.join(", "))]
    MissingPrimaryKeys { sobject: String, keys: Vec<String> },
}

impl From<busbar_sf_soql::Error> for Error {
    fn from(err: busbar_sf_soql::Error) -> Self {
        Error { kind: ErrorKind::Soql(err.to_string()), source: Some(Box::new(err)) }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error { kind: ErrorKind::Json(err.to_string()), source: Some(Box::new(err)) }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error { kind: ErrorKind::Io(err.to_string()), source: Some(Box::new(err)) }
    }
}
