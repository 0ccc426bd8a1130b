//! Result shaping: turns a raw backend search payload into the response
//! types the API and CLI expose.
//!
//! The backend's hit order is authoritative (relevance or requested sort) and
//! is never re-sorted here. Each hit's `_source` snapshot may carry a stale
//! or missing id, so the store-assigned `_id` always wins.

use crate::fields::{project, ProjectionMode};
use crate::models::{Document, RawSearchResult, SearchParams, SearchResponse};

/// Assembles a [`SearchResponse`] page from a raw result.
///
/// `total` comes from the backend's reported total, independent of how many
/// hits this page holds. Page, per-page and request id are echoed from the
/// request, not recomputed. When the request named `return_fields`, each hit
/// is projected down to those wire names after the id overwrite.
pub fn to_response(raw: &RawSearchResult, params: &SearchParams) -> SearchResponse {
    let hits = raw
        .hits
        .hits
        .iter()
        .map(|hit| {
            let mut doc = hit.source.clone();
            doc.id = hit.id.clone();
            if !params.return_fields.is_empty() {
                doc = project(&doc, &params.return_fields, ProjectionMode::KeepWire);
            }
            doc
        })
        .collect();

    SearchResponse {
        total: raw.hits.total.value,
        page: params.page,
        per_page: params.per_page,
        request_id: params.request_id.clone(),
        hits,
    }
}

/// Extracts hits as plain documents, without the response envelope or total
/// count. Used by type-ahead.
pub fn to_document_list(raw: &RawSearchResult) -> Vec<Document> {
    raw.hits
        .hits
        .iter()
        .map(|hit| {
            let mut doc = hit.source.clone();
            doc.id = hit.id.clone();
            doc
        })
        .collect()
}
