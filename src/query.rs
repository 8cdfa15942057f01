// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Datalog query execution and the pull convenience layer.
//!
//! Queries are EDN text in XTDB's native syntax, sent via the `query`
//! endpoint with positional arguments JSON-encoded alongside. The pull
//! helpers assemble a minimal find/in query around a caller-supplied pull
//! expression as an EDN tree — never by string splicing — so an ill-formed
//! expression fails client-side instead of producing a malformed query.

use std::collections::HashMap;

use tracing::debug;

use crate::client::{Body, Params, XtdbClient};
use crate::edn;
use crate::error::Result;
use crate::types::{Eid, QueryOptions};

/// Whether a pull query binds one entity id or a collection of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PullBinding {
    One,
    Many,
}

/// Assemble `{:find [(pull ?e <expr>)] :in [?e]}` (or the `[[?e ...]]`
/// collection binding) around a parsed pull expression.
fn pull_query(pull_expression: &str, binding: PullBinding) -> Result<String> {
    let projection = edn::parse(pull_expression)?;
    let entity_var = edn::Value::symbol("?e");
    let find = edn::Value::Vector(vec![edn::Value::List(vec![
        edn::Value::symbol("pull"),
        entity_var.clone(),
        projection,
    ])]);
    let in_clause = match binding {
        PullBinding::One => edn::Value::Vector(vec![entity_var]),
        PullBinding::Many => edn::Value::Vector(vec![edn::Value::Vector(vec![
            entity_var,
            edn::Value::symbol("..."),
        ])]),
    };
    let query = edn::Value::Map(vec![
        (edn::Value::keyword("find"), find),
        (edn::Value::keyword("in"), in_clause),
    ]);
    Ok(query.to_string())
}

impl XtdbClient {
    /// Execute a query in XTDB's native EDN syntax.
    ///
    /// Returns the raw result rows; each row is one tuple of the `:find`
    /// clause. Positional `:in` arguments and an as-of snapshot go in
    /// [`QueryOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::XtdbError::Api`] with the node's own payload
    /// if the query is malformed or rejected.
    pub async fn query(
        &self,
        query_edn: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<Vec<serde_json::Value>>> {
        let mut params = Params::new();
        params.push("queryEdn", query_edn);
        if let Some(options) = options {
            options.apply(&mut params)?;
        }
        self.get("query", params).await
    }

    /// Execute a query by POSTing it as an `application/edn` body.
    ///
    /// Semantically identical to [`XtdbClient::query`], but the query and its
    /// positional arguments travel in the request body (`{:query ... :in-args
    /// [...]}`) rather than the query string, which sidesteps URL length
    /// limits on large queries or argument lists. Any as-of snapshot and
    /// verbatim extras from [`QueryOptions`] still go as query parameters.
    pub async fn query_post(
        &self,
        query_edn: &str,
        options: Option<&QueryOptions>,
    ) -> Result<Vec<Vec<serde_json::Value>>> {
        let mut pairs = vec![(edn::Value::keyword("query"), edn::parse(query_edn)?)];
        let mut params = Params::new();
        if let Some(options) = options {
            if let Some(as_of) = &options.as_of {
                as_of.apply(&mut params);
            }
            if let Some(args) = &options.in_args {
                pairs.push((
                    edn::Value::keyword("in-args"),
                    edn::Value::Vector(args.iter().map(edn::Value::from_json).collect()),
                ));
            }
            params.extend_verbatim(&options.extra);
        }
        self.post("query", params, Body::Edn(edn::Value::Map(pairs)))
            .await
    }

    /// Per-attribute document counts across the whole node.
    pub async fn attribute_stats(&self) -> Result<HashMap<String, u64>> {
        self.get("attribute-stats", Params::new()).await
    }

    /// Pull one entity's projection by id.
    ///
    /// `pull_expression` is EDN projection syntax (e.g. `[*]` or
    /// `[:name {:friend [*]}]`). The assembled query binds the id as the
    /// single positional argument and the result is the first column of the
    /// only row, or `None` when the entity matched nothing.
    pub async fn pull(
        &self,
        eid: impl Into<Eid>,
        pull_expression: &str,
    ) -> Result<Option<serde_json::Value>> {
        let query = pull_query(pull_expression, PullBinding::One)?;
        debug!(query = %query, "assembled pull query");
        let options = QueryOptions {
            in_args: Some(vec![eid.into().to_json()]),
            ..Default::default()
        };
        let rows = self.query(&query, Some(&options)).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next()))
    }

    /// Pull a projection for many entities in one round trip.
    ///
    /// Binds the ids as a collection (`:in [[?e ...]]`) and returns the first
    /// column of every row, in the order the node returned them.
    pub async fn pull_many(
        &self,
        eids: &[Eid],
        pull_expression: &str,
    ) -> Result<Vec<serde_json::Value>> {
        let query = pull_query(pull_expression, PullBinding::Many)?;
        debug!(query = %query, ids = eids.len(), "assembled pull-many query");
        let ids = serde_json::Value::Array(eids.iter().map(Eid::to_json).collect());
        let options = QueryOptions {
            in_args: Some(vec![ids]),
            ..Default::default()
        };
        let rows = self.query(&query, Some(&options)).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect())
    }
}
