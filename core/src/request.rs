//! Declarative request descriptor.
//!
//! # Design
//! A `Request` names everything needed to issue one call: the endpoint, the
//! method descriptor, the content type, an optional timeout, an optional
//! additional-headers payload and the decoder for the response. The response
//! type `R` is carried only at the type level.
//!
//! Every optional field has its default filled in by `Request::new`; builder
//! methods replace them. Methods that change a payload or decoder type return a
//! `Request` with the new type parameter.

use std::marker::PhantomData;
use std::time::Duration;

use serde::Serialize;

use crate::content_type::ContentType;
use crate::endpoint::Endpoint;
use crate::method::HttpMethod;
use crate::response::JsonDecoder;

/// Empty query payload. Projects to no parameters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoQuery {}

/// Empty body payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoBody {}

/// Empty additional-headers payload. Projects to no headers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoHeaders {}

/// Request descriptor resolving to a value of type `R`.
///
/// | field                | default                         |
/// |----------------------|---------------------------------|
/// | `method`             | `GET` with no query             |
/// | `content_type`       | `Some(ContentType::Json)`       |
/// | `timeout`            | `None` (transport default)      |
/// | `additional_headers` | `None`                          |
/// | `decoder`            | `JsonDecoder`                   |
#[derive(Debug, Clone)]
pub struct Request<R, Q = NoQuery, B = NoBody, H = NoHeaders, D = JsonDecoder> {
    endpoint: Endpoint,
    method: HttpMethod<Q, B>,
    content_type: Option<ContentType>,
    timeout: Option<Duration>,
    additional_headers: Option<H>,
    decoder: D,
    response: PhantomData<fn() -> R>,
}

impl<R> Request<R> {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            method: HttpMethod::default(),
            content_type: Some(ContentType::Json),
            timeout: None,
            additional_headers: None,
            decoder: JsonDecoder,
            response: PhantomData,
        }
    }
}

impl<R, Q, B, H, D> Request<R, Q, B, H, D> {
    pub fn with_method<Q2, B2>(self, method: HttpMethod<Q2, B2>) -> Request<R, Q2, B2, H, D> {
        Request {
            endpoint: self.endpoint,
            method,
            content_type: self.content_type,
            timeout: self.timeout,
            additional_headers: self.additional_headers,
            decoder: self.decoder,
            response: PhantomData,
        }
    }

    /// Replace the content type; `None` sends no `Content-Type` header.
    pub fn with_content_type(mut self, content_type: Option<ContentType>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Extra headers, projected field by field at assembly time. They win
    /// over endpoint defaults and the content type.
    pub fn with_headers<H2: Serialize>(self, headers: H2) -> Request<R, Q, B, H2, D> {
        Request {
            endpoint: self.endpoint,
            method: self.method,
            content_type: self.content_type,
            timeout: self.timeout,
            additional_headers: Some(headers),
            decoder: self.decoder,
            response: PhantomData,
        }
    }

    pub fn with_decoder<D2>(self, decoder: D2) -> Request<R, Q, B, H, D2> {
        Request {
            endpoint: self.endpoint,
            method: self.method,
            content_type: self.content_type,
            timeout: self.timeout,
            additional_headers: self.additional_headers,
            decoder,
            response: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn method(&self) -> &HttpMethod<Q, B> {
        &self.method
    }

    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn additional_headers(&self) -> Option<&H> {
        self.additional_headers.as_ref()
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}
