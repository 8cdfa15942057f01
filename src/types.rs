// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Shared parameter and response types for the XTDB client SDK.
//!
//! Parameter types know how to write themselves into the outgoing query
//! string (`apply` methods); response types mirror the camelCase JSON shapes
//! the XTDB HTTP API returns. Every option struct carries an `extra` list of
//! passthrough pairs that is forwarded verbatim, so server parameters this
//! SDK does not model are never silently dropped.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Params;
use crate::error::Result;

/// Render a timestamp the way the XTDB HTTP API expects it in parameters.
pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Eid
// ---------------------------------------------------------------------------

/// An entity identifier: an opaque string or an arbitrary structured value.
///
/// The variant is chosen at the call boundary and decides the wire framing:
/// `Str` travels as the `eid` query parameter, `Structured` as `eid-json`
/// carrying the value's JSON text. Exactly one of the two parameters is ever
/// present.
#[derive(Debug, Clone, PartialEq)]
pub enum Eid {
    /// A plain string identifier.
    Str(String),
    /// A structured identifier (map, keyword-as-JSON, number, ...).
    Structured(serde_json::Value),
}

impl Eid {
    /// Write the identifier into `params` under `eid` or `eid-json`.
    pub(crate) fn apply(&self, params: &mut Params) -> Result<()> {
        match self {
            Eid::Str(s) => params.push("eid", s.clone()),
            Eid::Structured(value) => params.push("eid-json", serde_json::to_string(value)?),
        }
        Ok(())
    }

    /// The identifier as a JSON value, for positional query arguments.
    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Eid::Str(s) => serde_json::Value::String(s.clone()),
            Eid::Structured(value) => value.clone(),
        }
    }
}

impl From<&str> for Eid {
    fn from(s: &str) -> Self {
        Eid::Str(s.to_owned())
    }
}

impl From<String> for Eid {
    fn from(s: String) -> Self {
        Eid::Str(s)
    }
}

impl From<serde_json::Value> for Eid {
    /// JSON strings become [`Eid::Str`]; everything else is structured.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Eid::Str(s),
            other => Eid::Structured(other),
        }
    }
}

impl Serialize for Eid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Eid::Str(s) => serializer.serialize_str(s),
            Eid::Structured(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Eid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Eid::from(serde_json::Value::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// AsOf
// ---------------------------------------------------------------------------

/// Pins a read to a database snapshot: valid time, transaction time, or a
/// specific transaction id. Exactly one dimension per specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum AsOf {
    /// Snapshot as of this valid time.
    ValidTime(DateTime<Utc>),
    /// Snapshot as of this transaction time.
    TxTime(DateTime<Utc>),
    /// Snapshot as of this transaction id.
    TxId(u64),
}

impl AsOf {
    pub(crate) fn apply(&self, params: &mut Params) {
        match self {
            AsOf::ValidTime(t) => params.push("validTime", format_time(t)),
            AsOf::TxTime(t) => params.push("txTime", format_time(t)),
            AsOf::TxId(id) => params.push("txId", id.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

/// History sort order over valid time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

// ---------------------------------------------------------------------------
// Option structs
// ---------------------------------------------------------------------------

/// Options shared by `sync`, `await_tx`, and `await_tx_time`.
#[derive(Debug, Clone, Default)]
pub struct TimeoutOptions {
    /// Server-side wait budget in milliseconds. Forwarded as a hint; this is
    /// not a client-side cancellation mechanism.
    pub timeout: Option<u64>,
    /// Additional `(name, value)` query parameters, forwarded verbatim.
    pub extra: Vec<(String, String)>,
}

impl TimeoutOptions {
    pub(crate) fn apply(&self, params: &mut Params) {
        if let Some(ms) = self.timeout {
            params.push("timeout", ms.to_string());
        }
        params.extend_verbatim(&self.extra);
    }
}

/// Options for [`crate::client::XtdbClient::entity_history`].
#[derive(Debug, Clone, Default)]
pub struct EntityHistoryOptions {
    /// Include corrections (documents superseded within the same valid time).
    pub with_corrections: Option<bool>,
    /// Include the full document alongside each history entry.
    pub with_docs: Option<bool>,
    /// Start of the valid-time range.
    pub start_valid_time: Option<DateTime<Utc>>,
    /// Start of the transaction-time range.
    pub start_tx_time: Option<DateTime<Utc>>,
    /// Start of the transaction-id range.
    pub start_tx_id: Option<u64>,
    /// End of the valid-time range.
    pub end_valid_time: Option<DateTime<Utc>>,
    /// End of the transaction-time range.
    pub end_tx_time: Option<DateTime<Utc>>,
    /// End of the transaction-id range.
    pub end_tx_id: Option<u64>,
    /// Additional `(name, value)` query parameters, forwarded verbatim.
    pub extra: Vec<(String, String)>,
}

impl EntityHistoryOptions {
    pub(crate) fn apply(&self, params: &mut Params) {
        if let Some(b) = self.with_corrections {
            params.push("withCorrections", b.to_string());
        }
        if let Some(b) = self.with_docs {
            params.push("withDocs", b.to_string());
        }
        if let Some(t) = &self.start_valid_time {
            params.push("startValidTime", format_time(t));
        }
        if let Some(t) = &self.start_tx_time {
            params.push("startTxTime", format_time(t));
        }
        if let Some(id) = self.start_tx_id {
            params.push("startTxId", id.to_string());
        }
        if let Some(t) = &self.end_valid_time {
            params.push("endValidTime", format_time(t));
        }
        if let Some(t) = &self.end_tx_time {
            params.push("endTxTime", format_time(t));
        }
        if let Some(id) = self.end_tx_id {
            params.push("endTxId", id.to_string());
        }
        params.extend_verbatim(&self.extra);
    }
}

/// Options for [`crate::client::XtdbClient::query`].
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Pin the query to a database snapshot.
    pub as_of: Option<AsOf>,
    /// Positional `:in` arguments, sent JSON-encoded under `inArgsJson`.
    pub in_args: Option<Vec<serde_json::Value>>,
    /// Additional `(name, value)` query parameters, forwarded verbatim.
    pub extra: Vec<(String, String)>,
}

impl QueryOptions {
    pub(crate) fn apply(&self, params: &mut Params) -> Result<()> {
        if let Some(as_of) = &self.as_of {
            as_of.apply(params);
        }
        if let Some(args) = &self.in_args {
            params.push("inArgsJson", serde_json::to_string(args)?);
        }
        params.extend_verbatim(&self.extra);
        Ok(())
    }
}

/// Options for [`crate::client::XtdbClient::tx_log`].
#[derive(Debug, Clone, Default)]
pub struct TxLogOptions {
    /// Only return entries after this transaction id.
    pub after_tx_id: Option<u64>,
    /// Include the decoded operations (`txEvents`) in each entry.
    pub with_ops: Option<bool>,
    /// Additional `(name, value)` query parameters, forwarded verbatim.
    pub extra: Vec<(String, String)>,
}

impl TxLogOptions {
    pub(crate) fn apply(&self, params: &mut Params) {
        if let Some(id) = self.after_tx_id {
            params.push("afterTxId", id.to_string());
        }
        if let Some(b) = self.with_ops {
            params.push("withOps", b.to_string());
        }
        params.extend_verbatim(&self.extra);
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Node status, returned by the `status` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// XTDB version string.
    pub version: String,
    /// Build revision, if the node reports one.
    #[serde(default)]
    pub revision: Option<serde_json::Value>,
    /// Index schema version.
    pub index_version: u64,
    /// Transaction/document consumer lag details, if reported.
    #[serde(default)]
    pub consumer_state: Option<serde_json::Value>,
    /// The KV store backing the node's index.
    pub kv_store: String,
    /// Estimated number of keys in the KV store.
    pub estimate_num_keys: u64,
    /// Index size on disk, in bytes.
    pub size: u64,
}

/// Transaction metadata for one entity version, from the `entity-tx` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTx {
    /// Content-addressed id of the entity.
    pub id: String,
    /// Hash of the document content at this version.
    pub content_hash: String,
    /// Valid time of this version.
    pub valid_time: DateTime<Utc>,
    /// Transaction time of the transaction that wrote it.
    pub tx_time: DateTime<Utc>,
    /// Id of the transaction that wrote it.
    pub tx_id: u64,
}

/// One entry of an entity's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Transaction time of the write.
    pub tx_time: DateTime<Utc>,
    /// Id of the writing transaction.
    pub tx_id: u64,
    /// Valid time of the version.
    pub valid_time: DateTime<Utc>,
    /// Hash of the document content.
    pub content_hash: String,
    /// The full document, present when `with_docs` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<serde_json::Value>,
}

/// A transaction receipt: id plus transaction time.
///
/// Returned by `submit_tx`, `await_tx`, and `latest_completed_tx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfo {
    /// Monotonically increasing transaction id assigned by the node.
    pub tx_id: u64,
    /// Transaction time assigned by the node.
    pub tx_time: DateTime<Utc>,
}
