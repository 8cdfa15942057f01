// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Entity reads: current document, bitemporal history, and write metadata.

use crate::client::{Params, XtdbClient};
use crate::error::Result;
use crate::types::{AsOf, Eid, EntityHistoryOptions, EntityTx, HistoryEntry, SortOrder};

impl XtdbClient {
    /// Fetch the current document for an entity, optionally pinned to a
    /// snapshot.
    ///
    /// The document shape is entirely user-defined, so it is returned as raw
    /// JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::XtdbError::Api`] with the node's error payload
    /// if the entity does not exist.
    pub async fn entity(
        &self,
        eid: impl Into<Eid>,
        as_of: Option<AsOf>,
    ) -> Result<serde_json::Value> {
        let mut params = Params::new();
        eid.into().apply(&mut params)?;
        if let Some(as_of) = as_of {
            as_of.apply(&mut params);
        }
        self.get("entity", params).await
    }

    /// Fetch an entity's full bitemporal history.
    ///
    /// Reuses the `entity` endpoint with `history=true`. `sort_order` is over
    /// valid time; range, correction, and document options live in
    /// [`EntityHistoryOptions`].
    pub async fn entity_history(
        &self,
        eid: impl Into<Eid>,
        sort_order: SortOrder,
        options: Option<&EntityHistoryOptions>,
    ) -> Result<Vec<HistoryEntry>> {
        let mut params = Params::new();
        params.push("history", "true");
        eid.into().apply(&mut params)?;
        params.push("sortOrder", sort_order.as_str());
        if let Some(options) = options {
            options.apply(&mut params);
        }
        self.get("entity", params).await
    }

    /// Fetch the transaction metadata for the entity version visible at the
    /// given snapshot (content hash, valid time, writing transaction).
    pub async fn entity_tx(
        &self,
        eid: impl Into<Eid>,
        as_of: Option<AsOf>,
    ) -> Result<EntityTx> {
        let mut params = Params::new();
        eid.into().apply(&mut params)?;
        if let Some(as_of) = as_of {
            as_of.apply(&mut params);
        }
        self.get("entity-tx", params).await
    }
}
