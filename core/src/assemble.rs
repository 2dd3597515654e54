//! Derivation of a `WireRequest` from a request descriptor.
//!
//! # Design
//! Assembly is a pure function of its inputs. Steps run in a fixed order and
//! later header sources overwrite earlier ones:
//!
//! 1. endpoint URL, with query items from the method's query payload appended
//! 2. verb from the method descriptor
//! 3. endpoint default headers
//! 4. `Content-Type`, when set
//! 5. headers projected from the additional-headers payload
//! 6. body bytes from the method descriptor
//! 7. timeout override
//!
//! A query payload that fails to project is an error for the caller. An
//! additional-headers payload that fails to project, or a body that fails to
//! encode, is reported to the `DiagnosticSink` and left out.

use serde::Serialize;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ProjectionError;
use crate::http::WireRequest;
use crate::params::project;
use crate::request::Request;

pub const CONTENT_TYPE: &str = "Content-Type";

/// Assemble the wire request described by `request`.
pub fn assemble<R, Q, B, H, D>(
    request: &Request<R, Q, B, H, D>,
    diagnostics: &dyn DiagnosticSink,
) -> Result<WireRequest, ProjectionError>
where
    Q: Serialize,
    B: Serialize,
    H: Serialize,
{
    let method = request.method();

    let mut url = request.endpoint().url().clone();
    if let Some(params) = method.query_parameters()? {
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &params {
                pairs.append_pair(name, value);
            }
        }
    }

    let mut wire = WireRequest::new(method.verb(), url);

    for (name, value) in request.endpoint().default_headers() {
        wire.set_header(name, value);
    }

    if let Some(content_type) = request.content_type() {
        wire.set_header(CONTENT_TYPE, content_type.as_str());
    }

    if let Some(headers) = request.additional_headers() {
        match project(headers) {
            Ok(extra) => {
                for (name, value) in &extra {
                    wire.set_header(name, value);
                }
            }
            Err(e) => diagnostics.report(&Diagnostic::HeaderProjectionFailed {
                error: e.to_string(),
            }),
        }
    }

    wire.body = method.body(diagnostics);
    wire.timeout = request.timeout();

    Ok(wire)
}
