//! HTTP verb bundled with its query and body payloads.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ProjectionError;
use crate::http::Verb;
use crate::params::project;

/// Method descriptor: the verb plus whatever payload it carries.
///
/// `Get` never carries a body. Both variants may carry a query payload that is
/// projected to query-string items at assembly time.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpMethod<Q, B> {
    Get { query: Option<Q> },
    Post { query: Option<Q>, body: Option<B> },
}

impl<Q, B> Default for HttpMethod<Q, B> {
    fn default() -> Self {
        HttpMethod::Get { query: None }
    }
}

impl<Q, B> HttpMethod<Q, B> {
    /// `GET` without a query.
    pub fn get() -> Self {
        HttpMethod::Get { query: None }
    }

    /// `GET` with a query payload.
    pub fn get_with(query: Q) -> Self {
        HttpMethod::Get { query: Some(query) }
    }

    /// `POST` with a body and no query.
    pub fn post(body: B) -> Self {
        HttpMethod::Post {
            query: None,
            body: Some(body),
        }
    }

    pub fn verb(&self) -> Verb {
        match self {
            HttpMethod::Get { .. } => Verb::Get,
            HttpMethod::Post { .. } => Verb::Post,
        }
    }

    /// Wire name of the verb.
    pub fn name(&self) -> &'static str {
        self.verb().as_str()
    }

    pub fn query(&self) -> Option<&Q> {
        match self {
            HttpMethod::Get { query } | HttpMethod::Post { query, .. } => query.as_ref(),
        }
    }
}

impl<Q: Serialize, B> HttpMethod<Q, B> {
    /// Query payload projected to string pairs, `None` when there is no query.
    pub fn query_parameters(&self) -> Result<Option<BTreeMap<String, String>>, ProjectionError> {
        self.query().map(project).transpose()
    }
}

impl<Q, B: Serialize> HttpMethod<Q, B> {
    /// JSON-encoded body bytes.
    ///
    /// Returns `None` for `Get`, for a `Post` without a body, and when encoding
    /// fails. Encoding failures are reported to `diagnostics` and never raised.
    pub fn body(&self, diagnostics: &dyn DiagnosticSink) -> Option<Vec<u8>> {
        let body = match self {
            HttpMethod::Get { .. } => return None,
            HttpMethod::Post { body, .. } => body.as_ref()?,
        };
        match serde_json::to_vec(body) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                diagnostics.report(&Diagnostic::BodyEncodingFailed {
                    error: e.to_string(),
                });
                None
            }
        }
    }
}
