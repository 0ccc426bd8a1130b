//! OpenSearch document store client.
//!
//! One [`SearchClient`] is built at process start from the loaded config and
//! shared read-only across requests; reqwest pools connections underneath,
//! so no additional locking is needed for concurrent use.
//!
//! Every call is best-effort-once: a non-2xx backend response becomes an
//! error carrying the raw response body, with no retry and no backoff.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::models::{Document, RawSearchResult, SearchParams, SearchResponse};
use crate::query::{build_query, build_typeahead_query, SearchRequest};
use crate::results::{to_document_list, to_response};

pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
    username: String,
    password: String,
    use_basic_auth: bool,
}

// ============ Backend response shapes ============

#[derive(Debug, Deserialize)]
struct IndexDocumentResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    result: String,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    items: Vec<BulkItem>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    create: BulkCreateResult,
}

#[derive(Debug, Deserialize)]
struct BulkCreateResult {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct MgetResponse {
    docs: Vec<MgetDoc>,
}

#[derive(Debug, Deserialize)]
struct MgetDoc {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Document,
}

#[derive(Debug, Deserialize)]
struct GetDocumentResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Document,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    #[serde(default)]
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

impl SearchClient {
    pub fn new(config: &Config) -> Result<Self> {
        let noauth = config.search.client_mode == "noauth";
        let mut builder = reqwest::Client::builder();
        if noauth {
            // Local development clusters run with self-signed certificates.
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            http,
            base_url: config.search.endpoint.trim_end_matches('/').to_string(),
            index: config.search.index.clone(),
            username: config.search.username.clone(),
            password: config.search.password.clone(),
            use_basic_auth: !noauth,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if self.use_basic_auth {
            builder = builder.basic_auth(&self.username, Some(&self.password));
        }
        builder
    }

    /// Fails with the raw backend body on any non-success status.
    pub(crate) async fn check(
        response: reqwest::Response,
        action: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("error {}: backend returned {}: {}", action, status, body);
        }
        Ok(response)
    }

    // ============ Documents ============

    /// Indexes a new document and returns it with its store-assigned id.
    /// Not for updating existing documents.
    pub async fn create_document(&self, document: &Document) -> Result<Document> {
        if !document.id.is_empty() {
            bail!("ID should not be provided for new documents");
        }
        let response = self
            .request(reqwest::Method::POST, &format!("{}/_doc", self.index))
            .json(document)
            .send()
            .await
            .context("error indexing document")?;
        let response = Self::check(response, "indexing document").await?;
        let created: IndexDocumentResponse = response
            .json()
            .await
            .context("error decoding index response")?;
        tracing::debug!(id = %created.id, result = %created.result, "indexed document");

        let mut document = document.clone();
        document.id = created.id;
        Ok(document)
    }

    /// Bulk-indexes documents and returns them with ids populated, in input
    /// order.
    ///
    /// The bulk API does not return document bodies, so a second `_mget`
    /// round trip recovers the stored documents by the ids the bulk call
    /// assigned. If that second call fails after a successful bulk create,
    /// the documents exist in the store but are not returned; the error is
    /// surfaced to the caller.
    pub async fn bulk_create(&self, documents: &[Document]) -> Result<Vec<Document>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        for document in documents {
            if !document.id.is_empty() {
                bail!("ID should not be provided for new documents");
            }
        }

        let create_line = format!(r#"{{"create":{{"_index":"{}"}}}}"#, self.index);
        let mut body = String::new();
        for document in documents {
            body.push_str(&create_line);
            body.push('\n');
            body.push_str(&serde_json::to_string(document).context("error encoding document")?);
            body.push('\n');
        }

        let response = self
            .request(reqwest::Method::POST, "_bulk")
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .context("error bulk indexing documents")?;
        let response = Self::check(response, "bulk indexing documents").await?;
        let bulk: BulkResponse = response
            .json()
            .await
            .context("error decoding bulk response")?;
        if bulk.errors {
            bail!("bulk indexing reported per-item errors");
        }

        // _mget returns docs in request order, and the bulk response items
        // are in input order, so correlating by position preserves the
        // caller's ordering.
        let docs: Vec<serde_json::Value> = bulk
            .items
            .iter()
            .map(|item| serde_json::json!({ "_id": item.create.id }))
            .collect();
        let response = self
            .request(reqwest::Method::POST, &format!("{}/_mget", self.index))
            .json(&serde_json::json!({ "docs": docs }))
            .send()
            .await
            .context("error getting indexed documents")?;
        let response = Self::check(response, "getting indexed documents").await?;
        let mget: MgetResponse = response
            .json()
            .await
            .context("error decoding mget response")?;

        let indexed = mget
            .docs
            .into_iter()
            .map(|doc| {
                let mut document = doc.source;
                document.id = doc.id;
                document
            })
            .collect();
        Ok(indexed)
    }

    pub async fn get_document(&self, id: &str) -> Result<Document> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("{}/_doc/{}", self.index, id),
            )
            .send()
            .await
            .context("error getting document")?;
        let response = Self::check(response, "getting document").await?;
        let fetched: GetDocumentResponse = response
            .json()
            .await
            .context("error decoding get response")?;
        let mut document = fetched.source;
        document.id = fetched.id;
        Ok(document)
    }

    /// Partial-overwrite merge of the given fields onto the stored document.
    /// The id addresses the document and is never serialized into the body.
    pub async fn update_document(&self, document: &Document) -> Result<()> {
        if document.id.is_empty() {
            bail!("ID is required to update a document");
        }
        let id = document.id.clone();
        let mut body = document.clone();
        body.id = String::new();

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("{}/_update/{}", self.index, id),
            )
            .json(&serde_json::json!({ "doc": body }))
            .send()
            .await
            .context("error updating document")?;
        Self::check(response, "updating document").await?;
        Ok(())
    }

    pub async fn delete_document(&self, id: &str) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("{}/_doc/{}", self.index, id),
            )
            .send()
            .await
            .context("error deleting document")?;
        Self::check(response, "deleting document").await?;
        Ok(())
    }

    /// Deletes every document whose `network_node` equals the given value.
    /// Returns the number of deleted documents.
    pub async fn delete_by_node(&self, network_node: &str) -> Result<u64> {
        let query = serde_json::json!({
            "query": { "term": { "network_node": network_node } }
        });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("{}/_delete_by_query", self.index),
            )
            .json(&query)
            .send()
            .await
            .context("error deleting documents")?;
        let response = Self::check(response, "deleting documents").await?;
        let result: DeleteByQueryResponse = response
            .json()
            .await
            .context("error decoding delete-by-query response")?;
        Ok(result.deleted)
    }

    // ============ Search ============

    /// Submits a built query. The single choke point every search variant
    /// goes through.
    pub async fn raw_search(&self, request: &SearchRequest) -> Result<RawSearchResult> {
        let response = self
            .request(reqwest::Method::POST, &format!("{}/_search", self.index))
            .json(request)
            .send()
            .await
            .context("error searching")?;
        let response = Self::check(response, "searching").await?;
        let result: RawSearchResult = response
            .json()
            .await
            .context("error decoding search result")?;
        Ok(result)
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        let request = build_query(params);
        let raw = self.raw_search(&request).await?;
        Ok(to_response(&raw, params))
    }

    pub async fn typeahead(&self, q: &str) -> Result<Vec<Document>> {
        let request = build_typeahead_query(q);
        let raw = self.raw_search(&request).await?;
        Ok(to_document_list(&raw))
    }

    pub async fn count(&self) -> Result<u64> {
        let response = self
            .request(reqwest::Method::GET, &format!("{}/_count", self.index))
            .send()
            .await
            .context("error counting documents")?;
        let response = Self::check(response, "counting documents").await?;
        let result: CountResponse = response
            .json()
            .await
            .context("error decoding count response")?;
        Ok(result.count)
    }
}
