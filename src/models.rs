//! Core data models shared by the query builder, the store client, and the
//! HTTP/CLI surfaces.
//!
//! Wire names follow the index schema: store-assigned ids travel as `_id`,
//! the stable cross-reindex identifier as `_internal_id`. String fields use
//! the empty string as their zero value and are omitted from JSON when empty,
//! so a projected document serializes only the fields that were kept.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user embedded in a document, either as owner or as a contributor.
/// Users have no lifecycle of their own; they exist only as part of a
/// document snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_node: String,
}

/// One indexed item.
///
/// `internal_id` is stable across reindexing; `id` is the store's current
/// handle, assigned on create. A document submitted for creation must not
/// carry an `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(
        rename = "_internal_id",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub internal_id: String,
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<User>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub primary_url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub publication_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub modified_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_node: String,
}

/// A structured search request, assembled from HTTP query parameters or CLI
/// flags before being handed to the query builder.
///
/// `exact_match` keys are field paths (`content_type`, `owner.username`, ...);
/// each entry becomes a required term filter. Empty `return_fields` means
/// "return everything"; empty `search_fields` means the backend default set.
/// Dates are inclusive ISO-8601 bounds; an empty bound is unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub exact_match: BTreeMap<String, String>,
    pub return_fields: Vec<String>,
    pub search_fields: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub sort_field: String,
    pub sort_direction: String,
    pub page: i64,
    pub per_page: i64,
    pub request_id: String,
}

/// One page of search results, shaped for API consumers.
///
/// `total` is the backend-reported match count and may exceed the number of
/// hits returned. Page, per-page and request id are echoed from the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub request_id: String,
    pub hits: Vec<Document>,
}

// ============ Raw backend result ============

/// The raw payload of an OpenSearch `_search` call, as far as the result
/// mapper needs it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResult {
    #[serde(default)]
    pub took: i64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub hits: RawHits,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHits {
    #[serde(default)]
    pub total: RawTotal,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTotal {
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub relation: String,
}

/// One matched document with its engine-assigned id and score. The `_source`
/// snapshot may carry a stale or absent id; the mapper overwrites it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Document,
}
