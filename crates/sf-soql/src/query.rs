//! The bulk "get" query value and its mutations.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::describe::FieldDescriber;
use crate::error::{Error, ErrorKind, Result};
use crate::tokenize;
use crate::validate::check_query;
use crate::warning::QueryWarning;

/// Limit used by [`SoqlQuery::add_default_limit`].
pub const DEFAULT_LIMIT: u32 = 1;

const AND_STRING: &str = " and ";
const IS_DELETED_FIELD: &str = "isdeleted";
const IS_DELETED_FILTER: &str = " WHERE IsDeleted = false ";

/// Kind of query being built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Read records through a bulk query job.
    #[default]
    Get,
}

impl QueryType {
    /// Wire name of the query type.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Get => "get",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("get") {
            Ok(QueryType::Get)
        } else {
            Err(Error::new(ErrorKind::InvalidQueryType(s.to_string())))
        }
    }
}

/// A validated SOQL query for one Salesforce object.
///
/// The object name, its field list and the query type are fixed at
/// construction. Only the query text changes, and only through the
/// append-style mutations below. A mutation that fails leaves the text as it
/// was.
///
/// # Example
///
/// ```rust
/// use busbar_sf_soql::{QueryType, SoqlQuery};
///
/// let describe = |_: &str| vec!["Id".to_string(), "Name".to_string(), "IsDeleted".to_string()];
///
/// let mut query = SoqlQuery::build_from_object("Account", &describe, None, QueryType::Get)?;
/// assert_eq!(query.as_str(), "SELECT Id,Name,IsDeleted FROM Account");
///
/// query.set_incremental("Name", "'Acme'")?;
/// query.add_limit(50);
/// assert_eq!(
///     query.as_str(),
///     "SELECT Id,Name,IsDeleted FROM Account WHERE Name >= 'Acme' LIMIT 50"
/// );
/// # Ok::<(), busbar_sf_soql::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    query: String,
    sf_object: String,
    sf_object_fields: Vec<String>,
    query_type: QueryType,
}

impl SoqlQuery {
    /// Wrap already assembled parts, validating the query text.
    pub fn new(
        query: impl Into<String>,
        sf_object: impl Into<String>,
        sf_object_fields: Vec<String>,
        query_type: QueryType,
    ) -> Result<Self> {
        let query = query.into();
        check_query(&query)?;

        Ok(Self {
            query,
            sf_object: sf_object.into(),
            sf_object_fields,
            query_type,
        })
    }

    /// Build `SELECT <fields> FROM <sf_object>` from the object's describe result.
    ///
    /// With `fields` set (and non-empty) only those fields are selected, in
    /// describe order. Every requested name missing from the describe result
    /// is reported in a single [`ErrorKind::InvalidField`].
    pub fn build_from_object<D>(
        sf_object: &str,
        describer: &D,
        fields: Option<&[&str]>,
        query_type: QueryType,
    ) -> Result<Self>
    where
        D: FieldDescriber + ?Sized,
    {
        let mut sf_object_fields = describer.describe_fields(sf_object);

        if let Some(requested) = fields.filter(|f| !f.is_empty()) {
            let invalid_fields: Vec<String> = requested
                .iter()
                .filter(|field| !sf_object_fields.iter().any(|known| known.as_str() == **field))
                .map(|field| field.to_string())
                .collect();

            if !invalid_fields.is_empty() {
                return Err(Error::new(ErrorKind::InvalidField {
                    sobject: sf_object.to_string(),
                    fields: invalid_fields,
                }));
            }

            sf_object_fields.retain(|known| requested.contains(&known.as_str()));
        }

        if sf_object_fields.is_empty() {
            tracing::warn!(sobject = sf_object, "describe returned no fields");
        }

        let query = construct_soql_from_fields(sf_object, &sf_object_fields);
        tracing::debug!(sobject = sf_object, %query, "built SOQL from object");

        Self::new(query, sf_object, sf_object_fields, query_type)
    }

    /// Wrap a caller-written query, describing the object it reads from.
    pub fn build_from_query_string<D>(
        query_string: &str,
        describer: &D,
        query_type: QueryType,
    ) -> Result<Self>
    where
        D: FieldDescriber + ?Sized,
    {
        check_query(query_string)?;
        let sf_object = object_name_from_query(query_string)?;
        let sf_object_fields = describer.describe_fields(&sf_object);
        tracing::debug!(sobject = %sf_object, query = query_string, "parsed SOQL query string");

        Self::new(query_string, sf_object, sf_object_fields, query_type)
    }

    /// The current query text.
    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn into_string(self) -> String {
        self.query
    }

    pub fn sf_object(&self) -> &str {
        &self.sf_object
    }

    pub fn sf_object_fields(&self) -> &[String] {
        &self.sf_object_fields
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Case-insensitive membership test against the object's fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.sf_object_fields
            .iter()
            .any(|known| known.eq_ignore_ascii_case(field))
    }

    /// Restrict the query to rows where `field >= continue_from_value`.
    ///
    /// The value is inserted verbatim: quote it yourself if SOQL needs quotes.
    pub fn set_incremental(&mut self, field: &str, continue_from_value: &str) -> Result<()> {
        if !self.has_field(field) {
            return Err(Error::new(ErrorKind::FieldNotFound {
                field: field.to_string(),
                sobject: self.sf_object.clone(),
            }));
        }

        let incremental = format!(" WHERE {field} >= {continue_from_value}");
        let candidate = add_to_where_clause(&self.query, &incremental);
        check_query(&candidate)?;

        tracing::debug!(
            sobject = %self.sf_object,
            field,
            continue_from_value,
            "set incremental filter"
        );
        self.query = candidate;
        Ok(())
    }

    /// Apply the deleted-records option.
    ///
    /// Excluding deleted records adds `IsDeleted = false` when the object has
    /// that field. Including them needs no filter, but returns a warning when
    /// the object has no `IsDeleted` field at all. Excluding on an object
    /// without the field does nothing.
    pub fn set_deleted_option(&mut self, include_deleted: bool) -> Option<QueryWarning> {
        let has_is_deleted = self.has_field(IS_DELETED_FIELD);

        match (include_deleted, has_is_deleted) {
            (false, true) => {
                self.query = add_to_where_clause(&self.query, IS_DELETED_FILTER);
                None
            }
            (true, false) => {
                let warning = QueryWarning::DeletedFieldMissing {
                    sobject: self.sf_object.clone(),
                };
                tracing::warn!("{warning}");
                Some(warning)
            }
            _ => None,
        }
    }

    /// Append ` LIMIT <limit>` unless the text already mentions `limit`.
    ///
    /// The check is a case-insensitive substring test, so a field such as
    /// `CreditLimit__c` also blocks the clause.
    pub fn add_limit(&mut self, limit: u32) -> Option<QueryWarning> {
        if self.query.to_lowercase().contains("limit") {
            let warning = QueryWarning::LimitAlreadyPresent;
            tracing::warn!("{warning}");
            return Some(warning);
        }

        let _ = write!(self.query, " LIMIT {limit}");
        None
    }

    /// [`add_limit`](Self::add_limit) with [`DEFAULT_LIMIT`].
    pub fn add_default_limit(&mut self) -> Option<QueryWarning> {
        self.add_limit(DEFAULT_LIMIT)
    }

    /// Return the keys of `pkeys` that the query text does not mention.
    ///
    /// Matching is case-insensitive against tokens split on whitespace, commas
    /// and periods, so `Account.Name` mentions both `account` and `name`.
    pub fn missing_primary_keys<S: AsRef<str>>(&self, pkeys: &[S]) -> Vec<String> {
        let tokens = tokenize::key_tokens(&self.query);
        let mut missing_keys = Vec::new();

        for pkey in pkeys {
            let pkey: &str = pkey.as_ref();
            if !tokens.contains(&pkey.to_lowercase()) {
                missing_keys.push(pkey.to_string());
            }
        }

        missing_keys
    }
}

impl fmt::Display for SoqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

impl AsRef<str> for SoqlQuery {
    fn as_ref(&self) -> &str {
        &self.query
    }
}

impl From<SoqlQuery> for String {
    fn from(query: SoqlQuery) -> Self {
        query.query
    }
}

fn construct_soql_from_fields(sf_object: &str, fields: &[String]) -> String {
    format!("SELECT {} FROM {}", fields.join(","), sf_object)
}

/// Name of the object a query reads from.
///
/// Parenthesized groups (subqueries, function calls) are removed first, then
/// the word after the first `FROM` is taken and stripped of punctuation.
/// The name comes back lowercased.
pub fn object_name_from_query(query: &str) -> Result<String> {
    let without_groups = tokenize::strip_parenthesized(query).to_lowercase();
    let mut words = without_groups.split_whitespace();

    words
        .by_ref()
        .find(|word| *word == "from")
        .and_then(|_| words.next())
        .map(tokenize::strip_non_word)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::new(ErrorKind::ObjectNameNotFound(query.to_string())))
}

/// Splice `new_where` into the first WHERE clause of `soql`.
///
/// `new_where` carries its own leading ` WHERE `. When the text already has
/// a `where` keyword, that keyword is replaced by `new_where` followed by
/// ` and `, making the new predicate the first conjunct. Otherwise `new_where`
/// is appended. A `where` inside a string literal or subquery is taken as the
/// clause boundary too.
fn add_to_where_clause(soql: &str, new_where: &str) -> String {
    match tokenize::find_where_keyword(soql) {
        Some(keyword) => {
            let (before, after) = (&soql[..keyword.start], &soql[keyword.end..]);
            [before, new_where, AND_STRING, after].concat()
        }
        None => [soql, new_where].concat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Clause;

    fn describe(fields: &[&str]) -> impl Fn(&str) -> Vec<String> {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        move |_: &str| fields.clone()
    }

    fn account() -> impl Fn(&str) -> Vec<String> {
        describe(&["Id", "Name", "IsDeleted", "LastModifiedDate"])
    }

    fn from_object<D: FieldDescriber>(sf_object: &str, describer: &D) -> SoqlQuery {
        SoqlQuery::build_from_object(sf_object, describer, None, QueryType::Get).unwrap()
    }

    fn raw(query: &str, sf_object: &str, fields: &[&str]) -> SoqlQuery {
        let fields = fields.iter().map(|f| f.to_string()).collect();
        SoqlQuery::new(query, sf_object, fields, QueryType::Get).unwrap()
    }

    #[test]
    fn test_query_type_parsing() {
        assert_eq!("get".parse::<QueryType>().unwrap(), QueryType::Get);
        assert_eq!("GET".parse::<QueryType>().unwrap(), QueryType::Get);
        assert_eq!(QueryType::default(), QueryType::Get);
        assert_eq!(QueryType::Get.to_string(), "get");

        let err = "upsert".parse::<QueryType>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidQueryType(ref s) if s == "upsert"));
    }

    #[test]
    fn test_query_type_serde() {
        let parsed: QueryType = serde_json::from_str("\"get\"").unwrap();
        assert_eq!(parsed, QueryType::Get);
        assert!(serde_json::from_str::<QueryType>("\"delete\"").is_err());
    }

    #[test]
    fn test_build_from_object_selects_all_fields() {
        let query = from_object("Account", &describe(&["Id", "Name", "IsDeleted"]));

        assert_eq!(query.as_str(), "SELECT Id,Name,IsDeleted FROM Account");
        assert_eq!(query.sf_object(), "Account");
        assert_eq!(query.sf_object_fields(), ["Id", "Name", "IsDeleted"]);
        assert_eq!(query.query_type(), QueryType::Get);
    }

    #[test]
    fn test_build_from_object_keeps_describe_order() {
        let query = SoqlQuery::build_from_object(
            "Account",
            &account(),
            Some(&["LastModifiedDate", "Id"][..]),
            QueryType::Get,
        )
        .unwrap();

        assert_eq!(query.as_str(), "SELECT Id,LastModifiedDate FROM Account");
        assert_eq!(query.sf_object_fields(), ["Id", "LastModifiedDate"]);
    }

    #[test]
    fn test_build_from_object_reports_every_invalid_field() {
        let err = SoqlQuery::build_from_object(
            "Account",
            &account(),
            Some(&["Id", "Foo__c", "name", "Bar"][..]),
            QueryType::Get,
        )
        .unwrap_err();

        match err.kind {
            ErrorKind::InvalidField { sobject, fields } => {
                assert_eq!(sobject, "Account");
                assert_eq!(fields, vec!["Foo__c", "name", "Bar"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_build_from_object_empty_request_means_all_fields() {
        let query =
            SoqlQuery::build_from_object("Account", &account(), Some(&[][..]), QueryType::Get)
                .unwrap();
        assert_eq!(
            query.as_str(),
            "SELECT Id,Name,IsDeleted,LastModifiedDate FROM Account"
        );
    }

    #[test]
    fn test_build_from_object_calls_describer_with_object_name() {
        let describer = |sobject: &str| {
            assert_eq!(sobject, "Custom_Object__c");
            vec!["Id".to_string()]
        };
        let query = from_object("Custom_Object__c", &describer);
        assert_eq!(query.as_str(), "SELECT Id FROM Custom_Object__c");
    }

    #[test]
    fn test_new_validates_text() {
        let text = "SELECT Id FROM Account OFFSET 5";
        let err = SoqlQuery::new(text, "Account", vec![], QueryType::Get).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnsupportedClause(Clause::Offset)));
    }

    #[test]
    fn test_build_from_query_string() {
        let describer = |sobject: &str| {
            assert_eq!(sobject, "contact");
            vec!["Id".to_string(), "Email".to_string()]
        };
        let query = SoqlQuery::build_from_query_string(
            "SELECT Id, Email FROM Contact WHERE Email != null",
            &describer,
            QueryType::Get,
        )
        .unwrap();

        assert_eq!(query.sf_object(), "contact");
        assert_eq!(query.sf_object_fields(), ["Id", "Email"]);
        assert_eq!(
            query.to_string(),
            "SELECT Id, Email FROM Contact WHERE Email != null"
        );
    }

    #[test]
    fn test_build_from_query_string_rejects_before_describing() {
        let describer = |_: &str| -> Vec<String> { panic!("describer must not be called") };

        let err = SoqlQuery::build_from_query_string(
            "SELECT Id FROM Account OFFSET 10",
            &describer,
            QueryType::Get,
        )
        .unwrap_err();
        assert!(err.is_validation_error());

        let err = SoqlQuery::build_from_query_string("SELECT Id", &describer, QueryType::Get)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingClause(Clause::From)));
    }

    #[test]
    fn test_object_name_ignores_subqueries() {
        assert_eq!(
            object_name_from_query("SELECT Id, (SELECT Id FROM Contacts) FROM Account").unwrap(),
            "account"
        );
        assert_eq!(
            object_name_from_query("select count(Id) from Opportunity;").unwrap(),
            "opportunity"
        );
        assert_eq!(
            object_name_from_query("SELECT Id FROM My_Object__c WHERE Name = 'x'").unwrap(),
            "my_object__c"
        );
    }

    #[test]
    fn test_build_from_query_string_describes_lowercased_object() {
        use std::cell::RefCell;

        let seen = RefCell::new(Vec::new());
        let describer = |sobject: &str| {
            seen.borrow_mut().push(sobject.to_string());
            vec!["Id".to_string()]
        };

        let query =
            SoqlQuery::build_from_query_string("SELECT Id FROM Account", &describer, QueryType::Get)
                .unwrap();

        assert_eq!(*seen.borrow(), vec!["account"]);
        assert_eq!(query.sf_object(), "account");
        assert_eq!(query.as_str(), "SELECT Id FROM Account");

        let mut query = query;
        let err = query.set_incremental("SystemModstamp", "2024-01-01").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field SystemModstamp is not present in the account object"
        );
    }

    #[test]
    fn test_object_name_missing_is_internal_fault() {
        let err = object_name_from_query("SELECT Id FROM").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ObjectNameNotFound(_)));

        // FROM only inside a parenthesized group.
        let err = object_name_from_query("SELECT (SELECT Id FROM Contacts)").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ObjectNameNotFound(_)));
    }

    #[test]
    fn test_set_incremental_appends_where() {
        let mut query = raw("SELECT Id FROM Account", "Account", &["Id", "LastModifiedDate"]);

        query.set_incremental("LastModifiedDate", "2024-01-01").unwrap();
        assert_eq!(
            query.as_str(),
            "SELECT Id FROM Account WHERE LastModifiedDate >= 2024-01-01"
        );
    }

    #[test]
    fn test_set_incremental_twice_conjoins() {
        let mut query = raw("SELECT Id FROM Account", "Account", &["Id", "LastModifiedDate"]);

        query.set_incremental("LastModifiedDate", "2024-01-01").unwrap();
        query.set_incremental("lastmodifieddate", "2024-02-01").unwrap();

        assert_eq!(
            query.as_str(),
            "SELECT Id FROM Account  WHERE lastmodifieddate >= 2024-02-01 and  \
             LastModifiedDate >= 2024-01-01"
        );
        let where_count = tokenize::words(query.as_str())
            .iter()
            .filter(|w| *w == "where")
            .count();
        assert_eq!(where_count, 1);
    }

    #[test]
    fn test_set_incremental_merges_into_existing_where() {
        let mut query = raw(
            "SELECT Id FROM Account where Name = 'Acme' ORDER BY Id",
            "Account",
            &["Id", "SystemModstamp"],
        );

        query.set_incremental("SystemModstamp", "2023-06-01T00:00:00Z").unwrap();
        assert_eq!(
            query.as_str(),
            "SELECT Id FROM Account  WHERE SystemModstamp >= 2023-06-01T00:00:00Z and  \
             Name = 'Acme' ORDER BY Id"
        );
    }

    #[test]
    fn test_set_incremental_unknown_field_leaves_text() {
        let mut query = from_object("Account", &describe(&["Id"]));

        let err = query.set_incremental("LastModifiedDate", "2024-01-01").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field LastModifiedDate is not present in the Account object"
        );
        assert_eq!(query.as_str(), "SELECT Id FROM Account");
    }

    #[test]
    fn test_set_incremental_rejects_value_that_breaks_bulk_rules() {
        let mut query = from_object("Account", &account());
        let before = query.clone();

        let err = query
            .set_incremental("LastModifiedDate", "2024-01-01 OFFSET 10")
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnsupportedClause(Clause::Offset)));
        assert_eq!(query, before);
    }

    #[test]
    fn test_deleted_option_excludes_deleted_records() {
        let mut query = from_object("Account", &account());

        assert_eq!(query.set_deleted_option(false), None);
        assert_eq!(
            query.as_str(),
            "SELECT Id,Name,IsDeleted,LastModifiedDate FROM Account WHERE IsDeleted = false "
        );
    }

    #[test]
    fn test_deleted_option_branches() {
        let base = from_object("Lead", &describe(&["Id"]));

        // Include deleted, field missing: warning only.
        let mut query = base.clone();
        assert_eq!(
            query.set_deleted_option(true),
            Some(QueryWarning::DeletedFieldMissing {
                sobject: "Lead".to_string()
            })
        );
        assert_eq!(query, base);

        // Exclude deleted, field missing: silently nothing.
        let mut query = base.clone();
        assert_eq!(query.set_deleted_option(false), None);
        assert_eq!(query, base);

        // Include deleted, field present: nothing.
        let mut query = from_object("Account", &account());
        let before = query.clone();
        assert_eq!(query.set_deleted_option(true), None);
        assert_eq!(query, before);
    }

    #[test]
    fn test_deleted_option_is_case_insensitive() {
        let mut query = raw("SELECT Id FROM Task", "Task", &["ISDELETED"]);
        query.set_deleted_option(false);
        assert_eq!(query.as_str(), "SELECT Id FROM Task WHERE IsDeleted = false ");
    }

    #[test]
    fn test_add_limit_once() {
        let mut query = from_object("Account", &describe(&["Id"]));

        assert_eq!(query.add_limit(50), None);
        assert_eq!(query.as_str(), "SELECT Id FROM Account LIMIT 50");
        assert_eq!(query.to_string(), "SELECT Id FROM Account LIMIT 50");

        assert_eq!(query.add_limit(10), Some(QueryWarning::LimitAlreadyPresent));
        assert_eq!(query.as_str(), "SELECT Id FROM Account LIMIT 50");
    }

    #[test]
    fn test_add_default_limit() {
        let mut query = from_object("Account", &describe(&["Id"]));
        query.add_default_limit();
        assert_eq!(query.as_str(), "SELECT Id FROM Account LIMIT 1");
    }

    #[test]
    fn test_add_limit_is_substring_based() {
        let mut query = raw("SELECT Id, CreditLimit__c FROM Account", "Account", &[]);
        assert_eq!(query.add_limit(5), Some(QueryWarning::LimitAlreadyPresent));
        assert_eq!(query.as_str(), "SELECT Id, CreditLimit__c FROM Account");
    }

    #[test]
    fn test_end_to_end_mutations() {
        let mut query = from_object("Account", &describe(&["Id", "Name", "IsDeleted"]));
        assert_eq!(query.as_str(), "SELECT Id,Name,IsDeleted FROM Account");

        query.set_deleted_option(false);
        assert_eq!(
            query.as_str(),
            "SELECT Id,Name,IsDeleted FROM Account WHERE IsDeleted = false "
        );

        query.add_limit(50);
        assert!(query.as_str().ends_with(" LIMIT 50"));
        assert_eq!(
            String::from(query),
            "SELECT Id,Name,IsDeleted FROM Account WHERE IsDeleted = false  LIMIT 50"
        );
    }

    #[test]
    fn test_missing_primary_keys() {
        let query = raw("SELECT Id, Account.Name FROM Contact", "Contact", &[]);

        assert_eq!(query.missing_primary_keys(&["Id", "Email"]), vec!["Email"]);
        assert!(query.missing_primary_keys(&["ID", "name"]).is_empty());
        assert!(query.missing_primary_keys::<&str>(&[]).is_empty());
    }
}
