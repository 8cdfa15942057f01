// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! XTDB client configuration, URL construction, and HTTP transport layer.
//!
//! [`XtdbClient`] is the primary entry point for all SDK operations. It owns
//! the base URL and the HTTP client; the only state shared between calls is
//! that immutable connection configuration. Domain-specific methods (entity
//! reads, transactions, queries, diagnostics) are defined as `impl XtdbClient`
//! blocks in their respective modules and all funnel through [`XtdbClient::request`].

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::edn;
use crate::error::{Result, XtdbError};
use crate::types::Status;

/// All endpoints live under this path on the XTDB node.
const PATH_PREFIX: &str = "/_xtdb/";

/// Top-level response keys in this namespace mark the payload as an error.
const ERROR_KEY_PREFIX: &str = "xtdb.error";

// ---------------------------------------------------------------------------
// Request parameters and bodies
// ---------------------------------------------------------------------------

/// Ordered query-string parameters for one request.
///
/// Values are already stringified by the time they land here; booleans and
/// numbers are rendered with their `Display` form, timestamps as RFC 3339.
#[derive(Debug, Clone, Default)]
pub(crate) struct Params(pub(crate) Vec<(String, String)>);

impl Params {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: &str, value: impl Into<String>) {
        self.0.push((name.to_owned(), value.into()));
    }

    /// Append caller-supplied pairs verbatim, with no renaming or filtering.
    pub(crate) fn extend_verbatim(&mut self, pairs: &[(String, String)]) {
        self.0.extend(pairs.iter().cloned());
    }
}

/// A POST body, tagged with its wire encoding.
///
/// Either way the body is a mapping, and its keys must be kebab-case; the
/// encoding decides the `Content-Type` header and the serialization.
#[derive(Debug, Clone)]
pub(crate) enum Body {
    /// `application/json`.
    Json(serde_json::Map<String, serde_json::Value>),
    /// `application/edn`; must render to a map with keyword keys.
    Edn(edn::Value),
}

// ---------------------------------------------------------------------------
// XtdbClient
// ---------------------------------------------------------------------------

/// Asynchronous client for a remote XTDB node's HTTP API.
///
/// Construction fixes the target host, port, and scheme for the lifetime of
/// the client; nothing else is persisted between calls, so a single client
/// can serve any number of concurrent requests.
///
/// # Examples
///
/// ```rust,no_run
/// use xtdb_client::client::XtdbClient;
///
/// # #[tokio::main]
/// # async fn main() -> xtdb_client::error::Result<()> {
/// let client = XtdbClient::new("localhost", 3000)?;
/// let status = client.status().await?;
/// println!("XTDB {} (index v{})", status.version, status.index_version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct XtdbClient {
    /// Parsed base URL of the XTDB node (e.g. `http://localhost:3000`).
    base_url: Url,
    /// Underlying `reqwest` HTTP client (connection-pooled, TLS-capable).
    http: reqwest::Client,
}

impl XtdbClient {
    // -- Constructors -------------------------------------------------------

    /// Create a client for a node reachable over plain HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`XtdbError::Validation`] if `host` and `port` do not form a
    /// parseable URL.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Self::build(host, port, false)
    }

    /// Create a client for a node reachable over HTTPS.
    pub fn with_https(host: &str, port: u16) -> Result<Self> {
        Self::build(host, port, true)
    }

    /// Internal builder shared by both constructors.
    fn build(host: &str, port: u16, https: bool) -> Result<Self> {
        let scheme = if https { "https" } else { "http" };
        let base_url = Url::parse(&format!("{scheme}://{host}:{port}"))
            .map_err(|e| XtdbError::Validation(format!("Invalid host '{host}': {e}")))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(XtdbError::Network)?;

        Ok(Self { base_url, http })
    }

    /// Return the node's base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // -- Status -------------------------------------------------------------

    /// Fetch node status: version, index version, KV store details.
    pub async fn status(&self) -> Result<Status> {
        self.get("status", Params::new()).await
    }

    // -- Internal HTTP helpers ----------------------------------------------

    /// Build a full URL for an endpoint under the `/_xtdb/` prefix.
    fn endpoint_url(&self, endpoint: &str) -> Url {
        // Unwrap is safe: endpoint names are fixed, well-formed path segments.
        self.base_url
            .join(&format!("{PATH_PREFIX}{endpoint}"))
            .expect("valid endpoint path join")
    }

    /// Issue one request and classify the JSON response.
    ///
    /// Performs exactly one round trip: no retries, no client-side timeout
    /// beyond the transport default. Body keys are validated before any I/O.
    /// The response body is parsed as JSON regardless of HTTP status; the
    /// `xtdb.error` key convention alone decides success or failure.
    pub(crate) async fn request(
        &self,
        endpoint: &str,
        method: Method,
        params: Params,
        body: Option<Body>,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint_url(endpoint);
        let mut builder = self
            .http
            .request(method, url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !params.0.is_empty() {
            builder = builder.query(&params.0);
        }

        if let Some(body) = body {
            builder = match body {
                Body::Json(map) => {
                    validate_json_body_keys(&map)?;
                    builder
                        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                        .body(serde_json::to_string(&map).map_err(XtdbError::Serialization)?)
                }
                Body::Edn(value) => {
                    validate_edn_body_keys(&value)?;
                    builder
                        .header(CONTENT_TYPE, HeaderValue::from_static("application/edn"))
                        .body(value.to_string())
                }
            };
        }

        debug!(endpoint, url = %url, "sending XTDB request");
        let response = builder.send().await.map_err(XtdbError::Network)?;
        let parsed: serde_json::Value = response.json().await.map_err(XtdbError::Network)?;
        classify(parsed)
    }

    /// Perform a GET request and deserialize the classified response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: Params) -> Result<T> {
        let value = self.request(endpoint, Method::GET, params, None).await?;
        serde_json::from_value(value).map_err(XtdbError::Serialization)
    }

    /// Perform a POST request with a body and deserialize the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Params,
        body: Body,
    ) -> Result<T> {
        let value = self.request(endpoint, Method::POST, params, Some(body)).await?;
        serde_json::from_value(value).map_err(XtdbError::Serialization)
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

/// Reject JSON POST bodies whose keys are not kebab-case.
///
/// The XTDB POST endpoints accept kebab-case parameter names only; sending
/// anything else fails server-side with an opaque error, so the check runs
/// here, before any I/O, and names every offending key.
fn validate_json_body_keys(body: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
    let offending: Vec<&str> = body
        .keys()
        .filter(|k| k.chars().any(|c| c.is_uppercase()))
        .map(String::as_str)
        .collect();
    reject_offending_keys(&offending)
}

/// The EDN counterpart of [`validate_json_body_keys`]: the body must be a
/// map, and its keyword keys must be kebab-case.
fn validate_edn_body_keys(body: &edn::Value) -> Result<()> {
    let edn::Value::Map(pairs) = body else {
        return Err(XtdbError::Validation(
            "EDN request bodies must be maps".to_owned(),
        ));
    };
    let offending: Vec<&str> = pairs
        .iter()
        .filter_map(|(k, _)| match k {
            edn::Value::Keyword(name) | edn::Value::Str(name) | edn::Value::Symbol(name) => {
                Some(name.as_str())
            }
            _ => None,
        })
        .filter(|name| name.chars().any(|c| c.is_uppercase()))
        .collect();
    reject_offending_keys(&offending)
}

fn reject_offending_keys(offending: &[&str]) -> Result<()> {
    if offending.is_empty() {
        Ok(())
    } else {
        Err(XtdbError::Validation(format!(
            "POST endpoints only accept kebab-case parameters, but received: {offending:?}"
        )))
    }
}

/// Route a parsed response to the success or failure path.
///
/// A response object carrying any top-level key in the `xtdb.error` namespace
/// is an application error, whatever the HTTP status was; everything else is
/// a success, again whatever the HTTP status was.
fn classify(value: serde_json::Value) -> Result<serde_json::Value> {
    let is_error = value
        .as_object()
        .is_some_and(|obj| obj.keys().any(|k| k.starts_with(ERROR_KEY_PREFIX)));
    if is_error {
        Err(XtdbError::Api(value))
    } else {
        Ok(value)
    }
}
