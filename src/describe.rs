//! Loading describe-sobject payloads into a field describer.

use busbar_sf_soql::{DescribeCatalog, DescribeSObjectResult};
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

#[derive(Deserialize)]
#[serde(untagged)]
enum DescribePayload {
    Many(Vec<DescribeSObjectResult>),
    One(Box<DescribeSObjectResult>),
}

/// Parse one describe result or an array of them.
///
/// Fields of bulk-unsupported types are dropped.
pub fn catalog_from_json(json: &str) -> Result<DescribeCatalog> {
    let catalog: DescribeCatalog = match serde_json::from_str::<DescribePayload>(json)? {
        DescribePayload::Many(describes) => describes.into_iter().collect(),
        DescribePayload::One(describe) => std::iter::once(*describe).collect(),
    };
    Ok(catalog)
}

pub fn load_catalog(path: impl AsRef<Path>) -> Result<DescribeCatalog> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading describe results");
    catalog_from_json(&std::fs::read_to_string(path)?)
}
