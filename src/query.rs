//! Query construction: translates [`SearchParams`] into the backend's query
//! DSL.
//!
//! The DSL subset this service emits is deliberately flat: every clause
//! (free-text multi-match, exact-match terms, date range) is AND-joined under
//! a single top-level `bool.must`. There is no OR composition, no nested
//! boolean grouping, and no negation; that flatness is part of the API
//! contract, not an omission.
//!
//! [`build_query`] is a pure function and never fails. Malformed input such
//! as an unparsable date is passed through as-is; rejecting it is the
//! backend's job.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::models::SearchParams;

/// Page size applied when the request carries none.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// The document field date-range filters apply to.
pub const PUBLICATION_DATE_FIELD: &str = "publication_date";

/// Maximum number of hits a type-ahead lookup returns.
pub const TYPEAHEAD_LIMIT: i64 = 5;

/// Wire fields kept in type-ahead results.
pub const TYPEAHEAD_FIELDS: &[&str] = &["title", "primary_url"];

// ============ Query AST ============

/// A backend query expression. One variant per DSL construct this service
/// uses; the serializer below is the only place wire syntax is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Matches every document; used when a request carries no constraints.
    MatchAll,
    /// Free-text match across several fields. `fields` empty means the
    /// backend default field set.
    MultiMatch {
        query: String,
        fields: Vec<String>,
        fuzziness: Option<String>,
        match_type: Option<String>,
    },
    /// Exact-match constraint on one field path.
    Term { field: String, value: String },
    /// Inclusive date range; either bound may be absent for a one-sided
    /// range.
    Range {
        field: String,
        gte: Option<String>,
        lte: Option<String>,
    },
    /// AND-conjunction of subqueries. The builder only ever produces one
    /// flat level of this.
    Bool { must: Vec<Query> },
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Query::MatchAll => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("match_all", &serde_json::json!({}))?;
                map.end()
            }
            Query::MultiMatch {
                query,
                fields,
                fuzziness,
                match_type,
            } => {
                let mut body = serde_json::Map::new();
                body.insert("query".to_string(), serde_json::json!(query));
                if !fields.is_empty() {
                    body.insert("fields".to_string(), serde_json::json!(fields));
                }
                if let Some(fuzziness) = fuzziness {
                    body.insert("fuzziness".to_string(), serde_json::json!(fuzziness));
                }
                if let Some(match_type) = match_type {
                    body.insert("type".to_string(), serde_json::json!(match_type));
                }
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("multi_match", &body)?;
                map.end()
            }
            Query::Term { field, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("term", &serde_json::json!({ field: value }))?;
                map.end()
            }
            Query::Range { field, gte, lte } => {
                let mut bounds = serde_json::Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), serde_json::json!(gte));
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), serde_json::json!(lte));
                }
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("range", &serde_json::json!({ field: bounds }))?;
                map.end()
            }
            Query::Bool { must } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("bool", &serde_json::json!({ "must": must }))?;
                map.end()
            }
        }
    }
}

/// The request body submitted to the backend's `_search` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub from: i64,
    pub size: i64,
    /// Storage-layer field restriction (wire names). Applied in addition to
    /// any client-side projection done by the result mapper.
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<String>>,
    pub query: Query,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<serde_json::Value>>,
}

// ============ Builder ============

/// Builds the backend query for a structured search request. Deterministic,
/// no I/O.
pub fn build_query(params: &SearchParams) -> SearchRequest {
    let size = if params.per_page > 0 {
        params.per_page
    } else {
        DEFAULT_PAGE_SIZE
    };
    let from = if params.page > 0 {
        (params.page - 1) * size
    } else {
        0
    };

    let mut must: Vec<Query> = Vec::new();

    if !params.query.is_empty() {
        must.push(Query::MultiMatch {
            query: params.query.clone(),
            fields: params.search_fields.clone(),
            fuzziness: Some("AUTO".to_string()),
            match_type: None,
        });
    }

    for (field, value) in &params.exact_match {
        must.push(Query::Term {
            field: field.clone(),
            value: value.clone(),
        });
    }

    if !params.start_date.is_empty() || !params.end_date.is_empty() {
        must.push(Query::Range {
            field: PUBLICATION_DATE_FIELD.to_string(),
            gte: non_empty(&params.start_date),
            lte: non_empty(&params.end_date),
        });
    }

    let query = if must.is_empty() {
        Query::MatchAll
    } else {
        Query::Bool { must }
    };

    let source = if params.return_fields.is_empty() {
        None
    } else {
        Some(params.return_fields.clone())
    };

    let sort = if params.sort_field.is_empty() {
        None
    } else {
        let direction = normalize_sort_direction(&params.sort_direction);
        Some(vec![serde_json::json!({
            &params.sort_field: { "order": direction }
        })])
    };

    SearchRequest {
        from,
        size,
        source,
        query,
        sort,
    }
}

/// Builds the prefix-biased query behind `GET /v1/typeahead`. Matching runs
/// over the title field and its prefix sub-field; results are capped at
/// [`TYPEAHEAD_LIMIT`] and restricted to [`TYPEAHEAD_FIELDS`].
pub fn build_typeahead_query(q: &str) -> SearchRequest {
    SearchRequest {
        from: 0,
        size: TYPEAHEAD_LIMIT,
        source: Some(TYPEAHEAD_FIELDS.iter().map(|f| f.to_string()).collect()),
        query: Query::MultiMatch {
            query: q.to_string(),
            fields: vec!["title".to_string(), "title.prefix".to_string()],
            fuzziness: None,
            match_type: Some("bool_prefix".to_string()),
        },
        sort: None,
    }
}

/// Anything other than exactly `desc` sorts ascending.
fn normalize_sort_direction(direction: &str) -> &'static str {
    if direction == "desc" {
        "desc"
    } else {
        "asc"
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
