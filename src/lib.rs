//! # busbar-sf-extract
//!
//! Plans the SOQL queries of a Salesforce bulk extraction run.
//!
//! The heavy lifting lives in **busbar-sf-soql**, re-exported here as
//! [`soql`]. This crate adds what a run needs around it:
//!
//! - [`ExtractorConfig`] - which objects or which raw query to extract,
//!   incremental and deleted-record options, limits and primary keys
//! - [`ExtractionState`] - the `last_run` checkpoint kept between runs
//! - [`plan_queries`] - config + state + describer into finished queries
//! - [`catalog_from_json`] / [`load_catalog`] - describe-sobject payloads as a
//!   field describer
//!
//! Nothing here talks to Salesforce. Describe results are fetched elsewhere
//! and the planned query strings are handed to whatever runs bulk jobs.
//!
//! ## Example
//!
//! ```rust
//! use busbar_sf_extract::{plan_queries, ExtractionState, ExtractorConfig};
//!
//! let describe = |_: &str| vec!["Id".to_string(), "LastModifiedDate".to_string()];
//!
//! let config = ExtractorConfig::builder()
//!     .with_objects("Account, Contact")
//!     .with_incremental(true)
//!     .build();
//! let state = ExtractionState::from_json(r#"{"last_run": "2024-01-01T00:00:00.000Z"}"#)?;
//!
//! let plan = plan_queries(&config, &describe, &state)?;
//! assert_eq!(
//!     plan.statements(),
//!     vec![
//!         "SELECT Id,LastModifiedDate FROM Account WHERE LastModifiedDate >= 2024-01-01T00:00:00.000Z",
//!         "SELECT Id,LastModifiedDate FROM Contact WHERE LastModifiedDate >= 2024-01-01T00:00:00.000Z",
//!     ]
//! );
//! # Ok::<(), busbar_sf_extract::Error>(())
//! ```

mod config;
mod describe;
mod error;
mod plan;
mod state;

pub use busbar_sf_soql as soql;

pub use config::{ExtractorConfig, ExtractorConfigBuilder, QuerySource, DEFAULT_INCREMENTAL_FIELD};
pub use describe::{catalog_from_json, load_catalog};
pub use error::{Error, ErrorKind, Result};
pub use plan::{plan_queries, QueryPlan};
pub use state::{ExtractionState, STATE_TIMESTAMP_FORMAT};

// Re-export commonly used types at the top level
pub use busbar_sf_soql::{
    check_query, DescribeCatalog, FieldDescriber, QueryType, QueryWarning, SoqlQuery,
};
