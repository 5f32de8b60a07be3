//! Turning a configuration into the queries of one extraction run.

use busbar_sf_soql::{FieldDescriber, QueryWarning, SoqlQuery};

use crate::config::{ExtractorConfig, QuerySource};
use crate::error::{Error, ErrorKind, Result};
use crate::state::ExtractionState;

/// Finished queries plus the non-fatal warnings raised while building them.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    pub queries: Vec<SoqlQuery>,
    pub warnings: Vec<QueryWarning>,
}

impl QueryPlan {
    /// Query texts, in plan order.
    pub fn statements(&self) -> Vec<&str> {
        self.queries.iter().map(SoqlQuery::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Build every query of a run.
///
/// A raw `soql_query` yields one query and must select the configured
/// primary keys; otherwise each configured object yields a query over all
/// of its fields. Then, per query and in this order: the incremental filter
/// (only when enabled and `state` has a checkpoint), the deleted-records
/// option, and the limit.
pub fn plan_queries<D>(
    config: &ExtractorConfig,
    describer: &D,
    state: &ExtractionState,
) -> Result<QueryPlan>
where
    D: FieldDescriber + ?Sized,
{
    let mut plan = QueryPlan::default();

    match config.query_source()? {
        QuerySource::Raw(query_string) => {
            let query =
                SoqlQuery::build_from_query_string(query_string, describer, config.query_type)?;
            ensure_primary_keys(&query, &config.primary_keys)?;
            plan.queries.push(query);
        }
        QuerySource::Objects(objects) => {
            for sf_object in objects {
                plan.queries.push(SoqlQuery::build_from_object(
                    sf_object,
                    describer,
                    None,
                    config.query_type,
                )?);
            }
        }
    }

    match (config.incremental, state.last_run()) {
        (true, Some(last_run)) => {
            for query in &mut plan.queries {
                query.set_incremental(&config.incremental_field, last_run)?;
            }
        }
        (true, None) => {
            tracing::info!("no previous run recorded, extracting all records");
        }
        (false, _) => {}
    }

    for query in &mut plan.queries {
        plan.warnings.extend(query.set_deleted_option(config.is_deleted));
        if let Some(limit) = config.limit {
            plan.warnings.extend(query.add_limit(limit));
        }
    }

    tracing::info!(
        queries = plan.len(),
        warnings = plan.warnings.len(),
        "planned extraction queries"
    );

    Ok(plan)
}

fn ensure_primary_keys(query: &SoqlQuery, primary_keys: &[String]) -> Result<()> {
    let missing = query.missing_primary_keys(primary_keys);
    if missing.is_empty() {
        return Ok(());
    }

    Err(Error::new(ErrorKind::MissingPrimaryKeys {
        sobject: query.sf_object().to_string(),
        keys: missing,
    }))
}
