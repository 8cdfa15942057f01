// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Transaction submission, log retrieval, and transaction-progress queries.
//!
//! A transaction is an ordered batch of [`TxOp`]s submitted atomically; the
//! node assigns the batch a monotonically increasing id and a transaction
//! time. The client never reorders or retries operations within a batch —
//! ordering and commit outcome are the node's alone.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::client::{Body, Params, XtdbClient};
use crate::error::Result;
use crate::types::{format_time, Eid, TimeoutOptions, TxInfo, TxLogOptions};

// ---------------------------------------------------------------------------
// TxOp
// ---------------------------------------------------------------------------

/// One unit of change in a transaction batch.
///
/// On the wire each operation is a tagged array, matching the shapes the
/// node accepts and emits in its transaction log:
/// `["put", doc]`, `["put", doc, valid-time]`,
/// `["put", doc, valid-time, end-valid-time]`, `["delete", eid]`,
/// `["delete", eid, valid-time]`.
#[derive(Debug, Clone, PartialEq)]
pub enum TxOp {
    /// Put a document, optionally bounded in valid time. `end_valid_time`
    /// requires `valid_time` and is skipped on the wire without it.
    Put {
        /// The document, including its `xt/id`.
        doc: serde_json::Value,
        /// Valid-time start of the put.
        valid_time: Option<DateTime<Utc>>,
        /// Valid-time end of the put.
        end_valid_time: Option<DateTime<Utc>>,
    },
    /// Delete an entity, optionally at a specific valid time.
    Delete {
        /// The entity to delete.
        eid: Eid,
        /// Valid time of the deletion.
        valid_time: Option<DateTime<Utc>>,
    },
}

impl TxOp {
    /// Put `doc` at the transaction's valid time.
    pub fn put(doc: serde_json::Value) -> Self {
        TxOp::Put {
            doc,
            valid_time: None,
            end_valid_time: None,
        }
    }

    /// Put `doc` starting at `valid_time`.
    pub fn put_at(doc: serde_json::Value, valid_time: DateTime<Utc>) -> Self {
        TxOp::Put {
            doc,
            valid_time: Some(valid_time),
            end_valid_time: None,
        }
    }

    /// Put `doc` for the valid-time interval `[valid_time, end_valid_time)`.
    pub fn put_between(
        doc: serde_json::Value,
        valid_time: DateTime<Utc>,
        end_valid_time: DateTime<Utc>,
    ) -> Self {
        TxOp::Put {
            doc,
            valid_time: Some(valid_time),
            end_valid_time: Some(end_valid_time),
        }
    }

    /// Delete the entity at the transaction's valid time.
    pub fn delete(eid: impl Into<Eid>) -> Self {
        TxOp::Delete {
            eid: eid.into(),
            valid_time: None,
        }
    }

    /// Delete the entity at `valid_time`.
    pub fn delete_at(eid: impl Into<Eid>, valid_time: DateTime<Utc>) -> Self {
        TxOp::Delete {
            eid: eid.into(),
            valid_time: Some(valid_time),
        }
    }
}

impl Serialize for TxOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TxOp::Put {
                doc,
                valid_time,
                end_valid_time,
            } => {
                let end = valid_time.and(*end_valid_time);
                let len = 2 + valid_time.is_some() as usize + end.is_some() as usize;
                let mut seq = serializer.serialize_seq(Some(len))?;
                seq.serialize_element("put")?;
                seq.serialize_element(doc)?;
                if let Some(t) = valid_time {
                    seq.serialize_element(&format_time(t))?;
                }
                if let Some(t) = end {
                    seq.serialize_element(&format_time(&t))?;
                }
                seq.end()
            }
            TxOp::Delete { eid, valid_time } => {
                let len = 2 + valid_time.is_some() as usize;
                let mut seq = serializer.serialize_seq(Some(len))?;
                seq.serialize_element("delete")?;
                seq.serialize_element(eid)?;
                if let Some(t) = valid_time {
                    seq.serialize_element(&format_time(t))?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for TxOp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let parts = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let mut parts = parts.into_iter();
        let tag = parts
            .next()
            .ok_or_else(|| D::Error::custom("empty transaction operation"))?;
        match tag.as_str() {
            Some("put") => {
                let doc = parts
                    .next()
                    .ok_or_else(|| D::Error::custom("put operation without a document"))?;
                let valid_time = parts.next().map(parse_time::<D>).transpose()?;
                let end_valid_time = parts.next().map(parse_time::<D>).transpose()?;
                Ok(TxOp::Put {
                    doc,
                    valid_time,
                    end_valid_time,
                })
            }
            Some("delete") => {
                let eid = parts
                    .next()
                    .map(Eid::from)
                    .ok_or_else(|| D::Error::custom("delete operation without an entity id"))?;
                let valid_time = parts.next().map(parse_time::<D>).transpose()?;
                Ok(TxOp::Delete { eid, valid_time })
            }
            _ => Err(D::Error::custom(format!(
                "unknown transaction operation tag: {tag}"
            ))),
        }
    }
}

fn parse_time<'de, D: Deserializer<'de>>(
    value: serde_json::Value,
) -> std::result::Result<DateTime<Utc>, D::Error> {
    let text = value
        .as_str()
        .ok_or_else(|| D::Error::custom("expected a timestamp string"))?;
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(D::Error::custom)
}

// ---------------------------------------------------------------------------
// TxLogEntry
// ---------------------------------------------------------------------------

/// One committed transaction in the node's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxLogEntry {
    /// Transaction id.
    pub tx_id: u64,
    /// Transaction time.
    pub tx_time: DateTime<Utc>,
    /// The decoded operations, present when `with_ops` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_events: Option<Vec<TxOp>>,
}

// ---------------------------------------------------------------------------
// Module-local response wrappers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxTimeResponse {
    tx_time: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TxCommittedResponse {
    #[serde(rename = "txCommitted?")]
    tx_committed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxIdResponse {
    tx_id: u64,
}

// ---------------------------------------------------------------------------
// Endpoint methods
// ---------------------------------------------------------------------------

impl XtdbClient {
    /// Submit an ordered transaction batch.
    ///
    /// The operations travel under the `tx-ops` body key, JSON-encoded, in
    /// exactly the order given. Acceptance is asynchronous on the node side:
    /// the returned [`TxInfo`] is a receipt, not proof of indexing — pair
    /// with [`XtdbClient::await_tx`] to wait for it.
    pub async fn submit_tx(&self, ops: &[TxOp]) -> Result<TxInfo> {
        let mut map = serde_json::Map::new();
        map.insert("tx-ops".to_owned(), serde_json::to_value(ops)?);
        self.post("submit-tx", Params::new(), Body::Json(map)).await
    }

    /// Read the transaction log, oldest first.
    pub async fn tx_log(&self, options: Option<&TxLogOptions>) -> Result<Vec<TxLogEntry>> {
        let mut params = Params::new();
        if let Some(options) = options {
            options.apply(&mut params);
        }
        self.get("tx-log", params).await
    }

    /// Wait until the node has indexed all transactions submitted so far and
    /// return the transaction time it caught up to.
    pub async fn sync(&self, options: Option<&TimeoutOptions>) -> Result<DateTime<Utc>> {
        let mut params = Params::new();
        if let Some(options) = options {
            options.apply(&mut params);
        }
        let response: TxTimeResponse = self.get("sync", params).await?;
        Ok(response.tx_time)
    }

    /// Wait until the node has indexed the transaction with id `tx_id`.
    pub async fn await_tx(&self, tx_id: u64, options: Option<&TimeoutOptions>) -> Result<TxInfo> {
        let mut params = Params::new();
        params.push("txId", tx_id.to_string());
        if let Some(options) = options {
            options.apply(&mut params);
        }
        self.get("await-tx", params).await
    }

    /// Wait until the node has indexed past the given transaction time and
    /// return the transaction time it reached.
    pub async fn await_tx_time(
        &self,
        tx_time: DateTime<Utc>,
        options: Option<&TimeoutOptions>,
    ) -> Result<DateTime<Utc>> {
        let mut params = Params::new();
        params.push("txTime", format_time(&tx_time));
        if let Some(options) = options {
            options.apply(&mut params);
        }
        let response: TxTimeResponse = self.get("await-tx-time", params).await?;
        Ok(response.tx_time)
    }

    /// Whether the transaction with id `tx_id` committed (as opposed to
    /// being aborted, e.g. by a failed match operation).
    pub async fn tx_committed(&self, tx_id: u64) -> Result<bool> {
        let mut params = Params::new();
        params.push("txId", tx_id.to_string());
        let response: TxCommittedResponse = self.get("tx-committed", params).await?;
        Ok(response.tx_committed)
    }

    /// The most recent transaction the node has fully indexed, or `None` on
    /// an empty node.
    pub async fn latest_completed_tx(&self) -> Result<Option<TxInfo>> {
        self.get("latest-completed-tx", Params::new()).await
    }

    /// The id of the most recently submitted transaction.
    pub async fn latest_submitted_tx(&self) -> Result<u64> {
        let response: TxIdResponse = self.get("latest-submitted-tx", Params::new()).await?;
        Ok(response.tx_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn put_serializes_as_tagged_array() {
        let op = TxOp::put(json!({"xt/id": "ivan", "name": "Ivan"}));
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!(["put", {"xt/id": "ivan", "name": "Ivan"}])
        );
    }

    #[test]
    fn put_with_valid_time_appends_timestamps() {
        let start: DateTime<Utc> = "2020-01-01T00:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2021-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(
            serde_json::to_value(TxOp::put_at(json!({"xt/id": "x"}), start)).unwrap(),
            json!(["put", {"xt/id": "x"}, "2020-01-01T00:00:00.000Z"])
        );
        assert_eq!(
            serde_json::to_value(TxOp::put_between(json!({"xt/id": "x"}), start, end)).unwrap(),
            json!([
                "put",
                {"xt/id": "x"},
                "2020-01-01T00:00:00.000Z",
                "2021-01-01T00:00:00.000Z"
            ])
        );
    }

    #[test]
    fn end_valid_time_without_start_is_not_sent() {
        let op = TxOp::Put {
            doc: json!({"xt/id": "x"}),
            valid_time: None,
            end_valid_time: Some("2021-01-01T00:00:00Z".parse().unwrap()),
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!(["put", {"xt/id": "x"}])
        );
    }

    #[test]
    fn delete_serializes_string_and_structured_ids() {
        assert_eq!(
            serde_json::to_value(TxOp::delete("ivan")).unwrap(),
            json!(["delete", "ivan"])
        );
        assert_eq!(
            serde_json::to_value(TxOp::delete(json!({"composite": 1}))).unwrap(),
            json!(["delete", {"composite": 1}])
        );
    }

    #[test]
    fn tx_ops_round_trip_through_the_wire_encoding() {
        let ops = vec![
            TxOp::put(json!({"xt/id": "ivan", "name": "Ivan"})),
            TxOp::put_at(
                json!({"xt/id": "vadim"}),
                "2020-06-01T12:00:00Z".parse().unwrap(),
            ),
            TxOp::delete("boris"),
            TxOp::delete_at(json!(7), "2020-06-01T12:00:00Z".parse().unwrap()),
        ];
        let text = serde_json::to_string(&ops).unwrap();
        let decoded: Vec<TxOp> = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, ops);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = serde_json::from_value::<TxOp>(json!(["merge", {}])).unwrap_err();
        assert!(err.to_string().contains("merge"));
    }

    #[test]
    fn tx_log_entry_events_are_optional() {
        let bare: TxLogEntry = serde_json::from_value(json!({
            "txId": 2,
            "txTime": "2024-10-16T14:29:35Z"
        }))
        .unwrap();
        assert!(bare.tx_events.is_none());

        let with_ops: TxLogEntry = serde_json::from_value(json!({
            "txId": 2,
            "txTime": "2024-10-16T14:29:35Z",
            "txEvents": [["put", {"xt/id": "ivan"}]]
        }))
        .unwrap();
        assert_eq!(
            with_ops.tx_events.unwrap(),
            vec![TxOp::put(json!({"xt/id": "ivan"}))]
        );
    }

    #[test]
    fn tx_committed_response_unwraps_the_awkward_key() {
        let response: TxCommittedResponse =
            serde_json::from_value(json!({"txCommitted?": true})).unwrap();
        assert!(response.tx_committed);
    }
}
