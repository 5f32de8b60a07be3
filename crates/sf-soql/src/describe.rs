//! Field describers and describe-result types.
//!
//! A query only needs to know which field names exist on its target object.
//! That knowledge comes from a [`FieldDescriber`], supplied by the caller.
//! Closures work directly; [`DescribeCatalog`] adapts describe-sobject
//! payloads that were fetched elsewhere.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field types the bulk API cannot export.
pub const NON_SUPPORTED_BULK_FIELD_TYPES: &[&str] = &["address", "location", "base64", "reference"];

/// Maps an object name to the names of its fields.
///
/// Called synchronously, at most once per query construction.
pub trait FieldDescriber {
    /// Return the field names of `sobject`, in describe order.
    fn describe_fields(&self, sobject: &str) -> Vec<String>;
}

impl<F> FieldDescriber for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn describe_fields(&self, sobject: &str) -> Vec<String> {
        self(sobject)
    }
}

// ============================================================================
// Describe SObject Types
// ============================================================================

/// The parts of a describe-sobject result needed to build bulk queries.
///
/// Unknown keys in the payload are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescribeSObjectResult {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub custom: bool,
    #[serde(default = "default_true")]
    pub queryable: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescribe>,
}

impl DescribeSObjectResult {
    /// Names of fields the bulk API can export, in describe order.
    pub fn bulk_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.is_bulk_supported())
            .map(|field| field.name.clone())
            .collect()
    }
}

/// Field metadata from a describe-sobject result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDescribe {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(rename = "soapType")]
    pub soap_type: Option<String>,
    pub custom: Option<bool>,
    #[serde(default)]
    pub nillable: bool,
    #[serde(rename = "relationshipName")]
    pub relationship_name: Option<String>,
    #[serde(rename = "referenceTo", default)]
    pub reference_to: Option<Vec<String>>,
}

impl FieldDescribe {
    /// Returns true unless the field's type is one the bulk API rejects.
    pub fn is_bulk_supported(&self) -> bool {
        !NON_SUPPORTED_BULK_FIELD_TYPES.contains(&self.field_type.as_str())
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Describe Catalog
// ============================================================================

/// A [`FieldDescriber`] backed by describe results held in memory.
///
/// Object names are matched case-insensitively. An unknown object is logged
/// and described as having no fields.
#[derive(Debug, Clone, Default)]
pub struct DescribeCatalog {
    objects: HashMap<String, Vec<String>>,
}

impl DescribeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a describe result, keeping only bulk-supported fields.
    pub fn insert_describe(&mut self, describe: &DescribeSObjectResult) {
        if !describe.queryable {
            tracing::warn!(sobject = %describe.name, "object is not queryable");
        }
        self.insert_fields(&describe.name, describe.bulk_field_names());
    }

    /// Register an explicit field list for an object.
    pub fn insert_fields(&mut self, sobject: &str, fields: Vec<String>) {
        self.objects.insert(sobject.to_lowercase(), fields);
    }

    pub fn contains(&self, sobject: &str) -> bool {
        self.objects.contains_key(&sobject.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FieldDescriber for DescribeCatalog {
    fn describe_fields(&self, sobject: &str) -> Vec<String> {
        match self.objects.get(&sobject.to_lowercase()) {
            Some(fields) => fields.clone(),
            None => {
                tracing::error!(
                    sobject,
                    "Object type {sobject} does not exist in Salesforce, enter a valid object"
                );
                Vec::new()
            }
        }
    }
}

impl FromIterator<DescribeSObjectResult> for DescribeCatalog {
    fn from_iter<I: IntoIterator<Item = DescribeSObjectResult>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for describe in iter {
            catalog.insert_describe(&describe);
        }
        catalog
    }
}
