//! Lexical validation of bulk "get" queries.

use crate::error::{Clause, Error, ErrorKind, Result};
use crate::tokenize;

/// Check that `query` is usable as a bulk query.
///
/// The check is token membership only: the lowercase whitespace words must
/// include `select` and `from` and must not include `offset` or `typeof`.
/// Clause order and syntax are not inspected.
///
/// # Example
///
/// ```rust
/// use busbar_sf_soql::check_query;
///
/// assert!(check_query("SELECT Id FROM Account").is_ok());
/// assert!(check_query("SELECT Id FROM Account OFFSET 10").is_err());
/// ```
pub fn check_query(query: &str) -> Result<()> {
    let words = tokenize::words(query);
    let has = |clause: Clause| words.iter().any(|w| w == clause.token());

    for required in [Clause::Select, Clause::From] {
        if !has(required) {
            return Err(Error::new(ErrorKind::MissingClause(required)));
        }
    }

    for unsupported in [Clause::Offset, Clause::TypeOf] {
        if has(unsupported) {
            return Err(Error::new(ErrorKind::UnsupportedClause(unsupported)));
        }
    }

    Ok(())
}

/// Check a loosely typed value, as found in JSON configuration.
///
/// Anything other than a JSON string fails with [`ErrorKind::NotAString`].
pub fn check_query_value(value: &serde_json::Value) -> Result<&str> {
    let query = value
        .as_str()
        .ok_or_else(|| Error::new(ErrorKind::NotAString))?;
    check_query(query)?;
    Ok(query)
}
