// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Query diagnostics: the node's in-flight, recent, and slowest queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Params, XtdbClient};
use crate::error::Result;

/// Read-only snapshot of one in-flight or completed query on the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDiagnostic {
    /// Query state, e.g. `in-progress`, `completed`, `failed`.
    pub status: String,
    /// Node-assigned query id.
    pub query_id: String,
    /// The query text.
    pub query: String,
    /// When the node started executing it.
    pub started_at: DateTime<Utc>,
    /// When it finished; absent while in flight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Error text, for failed queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl XtdbClient {
    /// Queries currently executing on the node.
    pub async fn active_queries(&self) -> Result<Vec<QueryDiagnostic>> {
        self.get("active-queries", Params::new()).await
    }

    /// Recently completed (or failed) queries, newest first.
    pub async fn recent_queries(&self) -> Result<Vec<QueryDiagnostic>> {
        self.get("recent-queries", Params::new()).await
    }

    /// The slowest queries the node has retained.
    pub async fn slowest_queries(&self) -> Result<Vec<QueryDiagnostic>> {
        self.get("slowest-queries", Params::new()).await
    }
}
