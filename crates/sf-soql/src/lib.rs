//! # busbar-sf-soql
//!
//! SOQL query construction for Salesforce bulk "get" queries.
//!
//! ## Features
//!
//! - **Build from an object** - `SELECT <fields> FROM <object>` from a describe result
//! - **Wrap a raw query** - validate caller-written SOQL and find its object
//! - **Bulk validation** - reject queries without SELECT/FROM or with OFFSET/TYPEOF
//! - **Incremental extraction** - splice `field >= value` into the WHERE clause
//! - **Deleted records** - filter on `IsDeleted` when the object has it
//! - **Limits** - append a single LIMIT clause
//! - **Primary key checks** - find keys a raw query forgot to select
//!
//! Queries are treated as text. Nothing here parses SOQL beyond splitting on
//! whitespace and punctuation, and nothing talks to Salesforce: field names
//! come from a caller-supplied [`FieldDescriber`].
//!
//! ## Example
//!
//! ```rust
//! use busbar_sf_soql::{QueryType, SoqlQuery};
//!
//! let describe = |_: &str| {
//!     vec!["Id".to_string(), "LastModifiedDate".to_string(), "IsDeleted".to_string()]
//! };
//!
//! let mut query = SoqlQuery::build_from_object("Account", &describe, None, QueryType::Get)?;
//! query.set_incremental("LastModifiedDate", "2024-01-01T00:00:00.000Z")?;
//! query.set_deleted_option(false);
//!
//! assert_eq!(
//!     query.as_str(),
//!     "SELECT Id,LastModifiedDate,IsDeleted FROM Account  WHERE IsDeleted = false  and  \
//!      LastModifiedDate >= 2024-01-01T00:00:00.000Z"
//! );
//! # Ok::<(), busbar_sf_soql::Error>(())
//! ```

mod describe;
mod error;
mod query;
pub mod tokenize;
mod validate;
mod warning;

pub use describe::{
    DescribeCatalog, DescribeSObjectResult, FieldDescribe, FieldDescriber,
    NON_SUPPORTED_BULK_FIELD_TYPES,
};
pub use error::{Clause, Error, ErrorKind, Result};
pub use query::{object_name_from_query, QueryType, SoqlQuery, DEFAULT_LIMIT};
pub use validate::{check_query, check_query_value};
pub use warning::QueryWarning;
