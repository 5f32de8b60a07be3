//! Extractor configuration.

use busbar_sf_soql::QueryType;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::{Error, ErrorKind, Result};

/// Field used for incremental extraction when none is configured.
pub const DEFAULT_INCREMENTAL_FIELD: &str = "LastModifiedDate";

/// Parameters of one extraction run.
///
/// Either `soql_query` or `objects` must be set; when both are, the query
/// wins. All keys are optional in JSON.
///
/// ```json
/// {
///   "objects": "Account, Contact",
///   "incremental": true,
///   "incremental_field": "SystemModstamp",
///   "is_deleted": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Comma-separated object names, each queried for all its fields.
    #[serde(default)]
    pub objects: Option<String>,

    /// A caller-written query. Kept loosely typed so a non-string value is
    /// reported as such instead of as a JSON shape error.
    #[serde(default)]
    pub soql_query: Option<serde_json::Value>,

    /// Only fetch records changed since the last run.
    #[serde(default)]
    pub incremental: bool,

    #[serde(default = "default_incremental_field")]
    pub incremental_field: String,

    /// Include soft-deleted records.
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(default, deserialize_with = "deserialize_query_type")]
    pub query_type: QueryType,

    /// Append a LIMIT clause to every query.
    #[serde(default)]
    pub limit: Option<u32>,

    /// Keys a raw `soql_query` must select.
    #[serde(default)]
    pub primary_keys: Vec<String>,
}

fn default_incremental_field() -> String {
    DEFAULT_INCREMENTAL_FIELD.to_string()
}

/// Parse the query type through `FromStr` so unknown values keep the
/// "Invalid query type" message.
fn deserialize_query_type<'de, D>(deserializer: D) -> std::result::Result<QueryType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            objects: None,
            soql_query: None,
            incremental: false,
            incremental_field: default_incremental_field(),
            is_deleted: false,
            query_type: QueryType::default(),
            limit: None,
            primary_keys: Vec::new(),
        }
    }
}

/// Where the queries of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource<'a> {
    /// A single validated caller-written query.
    Raw(&'a str),
    /// One generated query per object.
    Objects(Vec<&'a str>),
}

impl ExtractorConfig {
    /// Create a new config builder.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading extractor config");
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Object names from `objects`, trimmed, empty entries dropped.
    pub fn object_names(&self) -> Vec<&str> {
        self.objects
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Decide between the raw query and the object list.
    ///
    /// A null or blank `soql_query` counts as unset. A non-string one, or a
    /// string that fails bulk validation, is an error.
    pub fn query_source(&self) -> Result<QuerySource<'_>> {
        let raw = self.soql_query.as_ref().filter(|value| match value {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });

        if let Some(value) = raw {
            let query = busbar_sf_soql::check_query_value(value)?;
            return Ok(QuerySource::Raw(query));
        }

        let objects = self.object_names();
        if objects.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "either 'soql_query' or 'objects' must be set".to_string(),
            )));
        }

        Ok(QuerySource::Objects(objects))
    }
}

/// Builder for ExtractorConfig.
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Set the comma-separated object list.
    pub fn with_objects(mut self, objects: impl Into<String>) -> Self {
        self.config.objects = Some(objects.into());
        self
    }

    /// Set a caller-written query.
    pub fn with_soql_query(mut self, query: impl Into<String>) -> Self {
        self.config.soql_query = Some(serde_json::Value::String(query.into()));
        self
    }

    /// Enable incremental extraction on `field`.
    pub fn with_incremental_field(mut self, field: impl Into<String>) -> Self {
        self.config.incremental = true;
        self.config.incremental_field = field.into();
        self
    }

    /// Enable or disable incremental extraction.
    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.config.incremental = incremental;
        self
    }

    /// Include or exclude soft-deleted records.
    pub fn with_deleted(mut self, include_deleted: bool) -> Self {
        self.config.is_deleted = include_deleted;
        self
    }

    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.config.query_type = query_type;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.config.limit = Some(limit);
        self
    }

    pub fn with_primary_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.primary_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Build the extractor configuration.
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}
