//! CLI command runners for the `ccs` binary.
//!
//! Each runner builds a [`SearchClient`] from the loaded config, performs one
//! operation, and prints a human-readable result. Destructive commands
//! (`delete`, `delete-node`, `reset`) prompt for confirmation first.

use anyhow::{Context, Result};
use std::io::Write;

use crate::auth::generate_token;
use crate::config::Config;
use crate::models::{SearchParams, User};
use crate::store::SearchClient;

/// Prints index and connection status: endpoint, credential presence,
/// document count, shard/replica counts, creation time.
pub async fn run_status(config: &Config) -> Result<()> {
    let client = SearchClient::new(config)?;
    let info = client.index_info().await?;
    let count = client.count().await?;

    let index_settings = info
        .get(&config.search.index)
        .and_then(|v| v.get("settings"))
        .and_then(|v| v.get("index"))
        .context("Unexpected index settings structure")?;

    // Numeric index settings come back as strings.
    let str_setting = |key: &str| -> String {
        index_settings
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("?")
            .to_string()
    };
    let creation = index_settings
        .get("creation_date")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|ms| chrono::DateTime::from_timestamp(ms / 1000, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "?".to_string());

    println!("Index Status:");
    println!("  Index Name: {}", config.search.index);
    println!("  Search Endpoint: {}", config.search.endpoint);
    println!("  Search Username: {}", config.search.username);
    println!(
        "  Search Password is set: {}",
        !config.search.password.is_empty()
    );
    println!("  API Key is set: {}", !config.api.key.is_empty());
    println!("  Number of Documents: {}", count);
    println!("  Creation Time: {}", creation);
    println!("  Number of Replicas: {}", str_setting("number_of_replicas"));
    println!("  Number of Shards: {}", str_setting("number_of_shards"));
    Ok(())
}

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let client = SearchClient::new(config)?;
    let document = client.get_document(id).await?;

    println!("Internal ID: {}", document.internal_id);
    println!("Search ID: {}", document.id);
    println!("Title: {}", document.title);
    println!("Description: {}", document.description);
    println!(
        "Owner: {}",
        document.owner.as_ref().map(|o| o.username.as_str()).unwrap_or("")
    );
    println!("Contributors:");
    print_users(&document.contributors);
    println!("Primary URL: {}", document.primary_url);
    println!("Other URLs: {}", document.other_urls.join(", "));
    println!("Thumbnail URL: {}", document.thumbnail_url);
    let mut content = document.content.clone();
    if content.len() > 1000 {
        content.truncate(1000);
        content.push_str("...");
    }
    println!("Content: {}", content);
    println!("Publication Date: {}", document.publication_date);
    println!("Modified Date: {}", document.modified_date);
    println!("Language: {}", document.language);
    println!("Content Type: {}", document.content_type);
    println!("Network Node: {}", document.network_node);
    Ok(())
}

fn print_users(users: &[User]) {
    for user in users {
        println!("  {} ({})", user.name, user.username);
    }
}

pub async fn run_delete(config: &Config, id: &str) -> Result<()> {
    let client = SearchClient::new(config)?;
    let document = client.get_document(id).await?;

    println!("Deleting document: {}", document.id);
    println!("Internal ID: {}", document.internal_id);
    println!("Title: {}", document.title);
    println!(
        "Owner: {}",
        document.owner.as_ref().map(|o| o.username.as_str()).unwrap_or("")
    );
    println!("Publication Date: {}", document.publication_date);
    println!("Network Node: {}", document.network_node);

    if !confirm("Are you sure you want to delete this document? (y/N): ")? {
        println!("Document deletion aborted.");
        return Ok(());
    }

    client.delete_document(id).await?;
    println!("Document deleted");
    Ok(())
}

pub async fn run_delete_node(config: &Config, network_node: &str) -> Result<()> {
    let client = SearchClient::new(config)?;

    println!("Deleting documents from network node: {}", network_node);
    if !confirm(
        "Are you sure you want to delete all documents from this network node? (y/N): ",
    )? {
        println!("Document deletion aborted.");
        return Ok(());
    }

    let deleted = client.delete_by_node(network_node).await?;
    println!("Documents deleted: {}", deleted);
    Ok(())
}

pub async fn run_reset(config: &Config) -> Result<()> {
    let client = SearchClient::new(config)?;

    println!("Resetting index");
    if !confirm(
        "Are you sure you want to reset the index? This will delete all documents and reset the index. (y/N): ",
    )? {
        println!("Index reset aborted.");
        return Ok(());
    }

    client.reset_index().await?;
    println!("Index reset");
    Ok(())
}

/// Flags accepted by `ccs search`.
#[derive(Debug, Default)]
pub struct SearchFlags {
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub username: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub network: Option<String>,
}

impl SearchFlags {
    /// Maps CLI flags onto [`SearchParams`]. Filter flags become exact-match
    /// constraints on their field paths.
    pub fn into_params(self) -> SearchParams {
        let mut params = SearchParams::default();
        if let Some(query) = self.query {
            params.query = query;
        }
        if let Some(limit) = self.limit {
            params.per_page = limit;
        }
        if let Some(username) = self.username {
            params
                .exact_match
                .insert("contributors.username".to_string(), username);
        }
        if let Some(title) = self.title {
            params.exact_match.insert("title".to_string(), title);
        }
        if let Some(content_type) = self.content_type {
            params
                .exact_match
                .insert("content_type".to_string(), content_type);
        }
        if let Some(network) = self.network {
            params.exact_match.insert("network_node".to_string(), network);
        }
        if let Some(start_date) = self.start_date {
            params.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            params.end_date = end_date;
        }
        params
    }
}

pub async fn run_search(config: &Config, flags: SearchFlags) -> Result<()> {
    let client = SearchClient::new(config)?;
    let params = flags.into_params();
    let response = client.search(&params).await?;

    println!("Found {} documents", response.total);
    println!();
    println!(
        "{:<22} {:<12} {:<40} {:<16} {:<12} {:<12} {:<12}",
        "ID", "INTERNAL ID", "TITLE", "FIRST AUTHOR", "PUBLISHED", "UPDATED", "NODE"
    );
    for hit in &response.hits {
        let first_author = hit
            .contributors
            .first()
            .map(|u| u.username.as_str())
            .unwrap_or("");
        println!(
            "{:<22.22} {:<12.12} {:<40.40} {:<16.16} {:<12.12} {:<12.12} {:<12.12}",
            hit.id,
            hit.internal_id,
            hit.title,
            first_author,
            hit.publication_date,
            hit.modified_date,
            hit.network_node
        );
    }
    Ok(())
}

/// Prints a fresh API token. Copy it into the config file or `CCS_API_KEY`
/// to activate it.
pub fn run_token(length: usize) {
    println!("{}", generate_token(length));
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut response = String::new();
    std::io::stdin().read_line(&mut response)?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}
