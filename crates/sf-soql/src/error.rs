//! Error types for sf-soql.

use std::fmt;

/// Result type alias for sf-soql operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for SOQL construction and mutation.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the query text itself was rejected by validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NotAString | ErrorKind::MissingClause(_) | ErrorKind::UnsupportedClause(_)
        )
    }

    /// Returns true if a field name did not match the object's describe result.
    pub fn is_field_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidField { .. } | ErrorKind::FieldNotFound { .. }
        )
    }
}

/// SOQL clause keywords referenced by validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    From,
    Offset,
    TypeOf,
}

impl Clause {
    /// Lowercase token that marks the clause in query text.
    pub fn token(&self) -> &'static str {
        match self {
            Clause::Select => "select",
            Clause::From => "from",
            Clause::Offset => "offset",
            Clause::TypeOf => "typeof",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token().to_ascii_uppercase())
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Query type string did not name a known variant.
    #[error("Invalid query type: '{0}'")]
    InvalidQueryType(String),

    /// Requested fields are missing from the object's describe result.
    #[error(
        "The following field(s) are not available for the '{sobject}' object: {}",
        fields.join(", ")
    )]
    InvalidField { sobject: String, fields: Vec<String> },

    /// A non-string value was supplied where a query string is required.
    #[error("SOQL query must be a single string")]
    NotAString,

    /// A mandatory clause keyword is absent.
    #[error("SOQL query must contain {0}")]
    MissingClause(Clause),

    /// A clause the bulk API rejects is present.
    #[error("SOQL bulk queries do not support {0} clauses")]
    UnsupportedClause(Clause),

    /// Incremental field is not a field of the target object.
    #[error("Field {field} is not present in the {sobject} object")]
    FieldNotFound { field: String, sobject: String },

    /// No object name follows the FROM keyword of an already validated query.
    #[error("Could not find an object name after FROM in query: {0}")]
    ObjectNameNotFound(String),
}
