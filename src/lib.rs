// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # XTDB Client SDK
//!
//! A typed, asynchronous Rust client for the XTDB HTTP query/transaction
//! API. Each method maps one-to-one to a REST endpoint on the node: status,
//! entity lookup, bitemporal history, Datalog queries, transaction
//! submission, the transaction log, and query diagnostics. The client holds
//! nothing but connection configuration — all persistent state lives on the
//! node.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xtdb_client::client::XtdbClient;
//! use xtdb_client::tx::TxOp;
//!
//! #[tokio::main]
//! async fn main() -> xtdb_client::error::Result<()> {
//!     let client = XtdbClient::new("localhost", 3000)?;
//!
//!     let receipt = client
//!         .submit_tx(&[TxOp::put(serde_json::json!({
//!             "xt/id": "ivan",
//!             "name": "Ivan",
//!         }))])
//!         .await?;
//!     client.await_tx(receipt.tx_id, None).await?;
//!
//!     let ivan = client.pull("ivan", "[*]").await?;
//!     println!("{ivan:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] — Connection configuration, request construction, response
//!   classification.
//! - [`types`] — Entity identifiers, snapshot specifiers, option structs,
//!   and response shapes.
//! - [`entity`] — Entity document, history, and write-metadata reads.
//! - [`tx`] — Transaction submission, the transaction log, and
//!   transaction-progress queries.
//! - [`query`] — Datalog query execution and the pull convenience layer.
//! - [`diagnostics`] — Active / recent / slowest query introspection.
//! - [`edn`] — The small EDN value model used to build queries.
//! - [`error`] — Error types and the crate-level `Result` alias.

pub mod client;
pub mod diagnostics;
pub mod edn;
pub mod entity;
pub mod error;
pub mod query;
pub mod tx;
pub mod types;
