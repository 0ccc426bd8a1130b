//! # Commons Search
//!
//! A thin HTTP/CLI front end for an OpenSearch-backed document index.
//!
//! The service translates structured search requests (free text, exact-match
//! filters, date ranges, sort, pagination, field selection) into backend
//! query documents, and shapes raw backend results back into API responses,
//! projecting field subsets when asked to.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────────┐   ┌────────────┐
//! │ HTTP/CLI │──▶│ SearchParams │──▶│ QueryBuilder│──▶│ OpenSearch │
//! └──────────┘   └──────────────┘   └─────────────┘   └─────┬──────┘
//!                                                          │
//!                ┌───────────────┐   ┌──────────────┐      │
//!                │ SearchResponse│◀──│ ResultMapper │◀─────┘
//!                └───────────────┘   │ + projection │
//!                                    └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with env overrides |
//! | [`models`] | Documents, users, search params and responses |
//! | [`fields`] | Field projection over documents |
//! | [`query`] | Query AST and builder |
//! | [`results`] | Raw-result-to-response mapping |
//! | [`store`] | OpenSearch client (documents + search) |
//! | [`index`] | Index lifecycle and settings |
//! | [`auth`] | Bearer-token checks |
//! | [`server`] | Axum HTTP API |
//! | [`commands`] | CLI command runners |

pub mod auth;
pub mod commands;
pub mod config;
pub mod fields;
pub mod index;
pub mod models;
pub mod query;
pub mod results;
pub mod server;
pub mod store;
