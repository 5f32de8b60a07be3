//! Non-fatal query diagnostics.

use std::fmt;

/// A condition that left the query unchanged without being an error.
///
/// Mutations return these instead of failing; each one is also logged at
/// warn level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryWarning {
    /// `add_limit` found an existing `limit` in the query text.
    LimitAlreadyPresent,
    /// Deleted records were requested but the object has no `IsDeleted` field.
    DeletedFieldMissing { sobject: String },
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryWarning::LimitAlreadyPresent => write!(
                f,
                "The SOQL query already contains a LIMIT clause. Ignoring add_limit request."
            ),
            QueryWarning::DeletedFieldMissing { sobject } => write!(
                f,
                "IsDeleted is not a field in the {sobject} object, cannot fetch deleted records"
            ),
        }
    }
}
