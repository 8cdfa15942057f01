// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Error types for the XTDB client SDK.
//!
//! All fallible operations in this crate return [`Result<T>`], an alias for
//! `std::result::Result<T, XtdbError>`. The three error families of the HTTP
//! contract stay distinct: pre-flight validation failures (no request sent),
//! transport failures (propagated from `reqwest` unchanged), and application
//! errors reported by the server in its response body.

use thiserror::Error;

use crate::edn;

/// Comprehensive error type for XTDB client operations.
#[derive(Error, Debug)]
pub enum XtdbError {
    /// Client-side validation failed before any request was sent, e.g. a POST
    /// body key that is not kebab-case, or an unparseable host name.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A pull expression or other caller-supplied EDN text failed to parse.
    /// Raised before any request is sent.
    #[error("EDN parse error: {0}")]
    Edn(#[from] edn::ParseError),

    /// An underlying HTTP / network transport error from `reqwest`, including
    /// response bodies that could not be decoded as JSON.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization of a typed value failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server reported an error payload: a JSON response object with a
    /// key in the `xtdb.error` namespace. The payload is carried verbatim so
    /// callers can inspect server-specific diagnostic fields. Selected purely
    /// by that key convention — the HTTP status code is never consulted.
    #[error("XTDB error response: {0}")]
    Api(serde_json::Value),
}

/// Crate-level result alias using [`XtdbError`].
pub type Result<T> = std::result::Result<T, XtdbError>;
