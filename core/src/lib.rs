//! Declarative HTTP requests with typed responses.
//!
//! # Overview
//! A caller describes an endpoint, a method with its query/body payloads,
//! headers and the expected response type as plain data. The library
//! assembles a wire request from that description, executes it through a
//! `Transport` and decodes the body into the requested type.
//!
//! # Design
//! - Assembly (`assemble`) is pure and deterministic; the transport is the only
//!   place I/O happens, so requests can be inspected with `Client::build`.
//! - `Client` is stateless apart from its transport and diagnostic sink.
//! - `execute` is strict about decoding; `execute_optional` maps decode
//!   failures to `None` but still fails on transport errors and non-2xx.
//! - `ReqwestTransport` closes the connection when a request is cancelled;
//!   `UreqTransport` is blocking and only releases it at its timeout.
//! - Failures that are absorbed (body encoding, extra-header projection) are
//!   reported to an injectable `DiagnosticSink`, by default the `log` facade.
//!
//! ```ignore
//! use netstack_core::{Client, Endpoint, HttpMethod, NetworkResponse, NoBody, ReqwestTransport, Request};
//!
//! #[derive(serde::Deserialize)]
//! struct User { id: u64, name: String }
//! impl NetworkResponse for User {}
//!
//! #[derive(serde::Serialize)]
//! struct Page { page: u32 }
//!
//! let client = Client::new(ReqwestTransport::new());
//! let request: Request<Vec<User>, Page, NoBody> =
//!     Request::new(Endpoint::parse("https://api.example.com/users")?)
//!         .with_method(HttpMethod::get_with(Page { page: 2 }));
//! let users = client.execute(&request).await?;
//! ```

pub mod assemble;
pub mod client;
pub mod content_type;
pub mod diagnostics;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod method;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use assemble::assemble;
pub use client::{Client, PendingRequest};
pub use content_type::ContentType;
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, RecordingSink};
pub use endpoint::Endpoint;
pub use error::{DecodeError, ProjectionError, RequestError, TransportError};
pub use http::{Verb, WireRequest, WireResponse};
pub use method::HttpMethod;
pub use params::project;
pub use request::{NoBody, NoHeaders, NoQuery, Request};
pub use response::{Decoder, JsonDecoder, NetworkResponse, TextDecoder};
pub use transport::{ReqwestTransport, Transport, UreqTransport, DEFAULT_TIMEOUT};
