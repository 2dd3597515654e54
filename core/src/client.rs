//! Request executor.
//!
//! # Design
//! `Client` holds a transport and a diagnostic sink and nothing else; no state
//! carries over between calls. Each call assembles a `WireRequest`, hands it
//! to the transport and feeds the response body through the request's decoder.
//!
//! Two failure policies are offered:
//! - `execute` is strict: transport, status and decode failures are all errors.
//! - `execute_optional` is tolerant of decode failures only. A body that does
//!   not decode resolves to `Ok(None)`; transport failures and non-2xx
//!   statuses are still errors. This is an explicit opt-in and swallows every
//!   decode failure, not just empty bodies.
//!
//! `start` and `start_optional` spawn the same work on the tokio runtime and
//! return a `PendingRequest` that can be cancelled.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::assemble::assemble;
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::error::RequestError;
use crate::http::{WireRequest, WireResponse};
use crate::request::Request;
use crate::response::{Decoder, NetworkResponse};
use crate::transport::Transport;

/// Stateless executor of declarative requests.
pub struct Client<T> {
    transport: Arc<T>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            diagnostics: Arc::clone(&self.diagnostics),
        }
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl<T: Transport + 'static> Client<T> {
    /// Client reporting diagnostics through the `log` facade.
    pub fn new(transport: T) -> Self {
        Self::with_diagnostics(transport, Arc::new(LogSink))
    }

    pub fn with_diagnostics(transport: T, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            transport: Arc::new(transport),
            diagnostics,
        }
    }

    /// Assemble the wire request without sending it.
    pub fn build<R, Q, B, H, D>(&self, request: &Request<R, Q, B, H, D>) -> Result<WireRequest, RequestError>
    where
        Q: Serialize,
        B: Serialize,
        H: Serialize,
    {
        Ok(assemble(request, self.diagnostics.as_ref())?)
    }

    /// Issue `request` and decode the body; any failure is an error.
    pub async fn execute<R, Q, B, H, D>(&self, request: &Request<R, Q, B, H, D>) -> Result<R, RequestError>
    where
        R: NetworkResponse,
        Q: Serialize,
        B: Serialize,
        H: Serialize,
        D: Decoder<R>,
    {
        let response = self.fetch(request).await?;
        Ok(request.decoder().decode(&response.body)?)
    }

    /// Issue `request`; a body that fails to decode yields `Ok(None)`.
    ///
    /// A 4xx/5xx response never becomes `None`: it is `RequestError::Status`.
    pub async fn execute_optional<R, Q, B, H, D>(
        &self,
        request: &Request<R, Q, B, H, D>,
    ) -> Result<Option<R>, RequestError>
    where
        R: NetworkResponse,
        Q: Serialize,
        B: Serialize,
        H: Serialize,
        D: Decoder<R>,
    {
        let response = self.fetch(request).await?;
        match request.decoder().decode(&response.body) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::debug!("tolerated decode failure: {e}");
                Ok(None)
            }
        }
    }

    /// Spawn a strict execution on the current tokio runtime.
    pub fn start<R, Q, B, H, D>(&self, request: Request<R, Q, B, H, D>) -> PendingRequest<R>
    where
        R: NetworkResponse,
        Q: Serialize + Send + Sync + 'static,
        B: Serialize + Send + Sync + 'static,
        H: Serialize + Send + Sync + 'static,
        D: Decoder<R> + 'static,
    {
        let client = self.clone();
        PendingRequest::spawn(async move { client.execute(&request).await })
    }

    /// Spawn a tolerant execution on the current tokio runtime.
    pub fn start_optional<R, Q, B, H, D>(&self, request: Request<R, Q, B, H, D>) -> PendingRequest<Option<R>>
    where
        R: NetworkResponse,
        Q: Serialize + Send + Sync + 'static,
        B: Serialize + Send + Sync + 'static,
        H: Serialize + Send + Sync + 'static,
        D: Decoder<R> + 'static,
    {
        let client = self.clone();
        PendingRequest::spawn(async move { client.execute_optional(&request).await })
    }

    async fn fetch<R, Q, B, H, D>(&self, request: &Request<R, Q, B, H, D>) -> Result<WireResponse, RequestError>
    where
        Q: Serialize,
        B: Serialize,
        H: Serialize,
    {
        let wire = self.build(request)?;
        log::debug!("{} {}", wire.method, wire.url);

        let response = self.transport.send(wire).await?;
        log::debug!("received HTTP {} ({} bytes)", response.status, response.body.len());

        check_status(response)
    }
}

/// Map non-success status codes to `RequestError::Status`.
fn check_status(response: WireResponse) -> Result<WireResponse, RequestError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(RequestError::Status {
        status: response.status,
        body: response.body_lossy(),
    })
}

/// A spawned request that resolves exactly once.
///
/// Awaiting yields the request's result. `cancel` aborts the underlying task,
/// and so does dropping the handle; after either, no result is delivered.
#[derive(Debug)]
pub struct PendingRequest<T> {
    handle: JoinHandle<Result<T, RequestError>>,
}

impl<T: Send + 'static> PendingRequest<T> {
    fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, RequestError>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }
}

impl<T> PendingRequest<T> {
    /// Abort the request. Other in-flight requests are unaffected.
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for PendingRequest<T> {
    type Output = Result<T, RequestError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RequestError::Cancelled)),
        }
    }
}

impl<T> Drop for PendingRequest<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde::Deserialize;

    use super::*;
    use crate::diagnostics::{Diagnostic, RecordingSink};
    use crate::endpoint::Endpoint;
    use crate::error::{DecodeError, TransportError};
    use crate::method::HttpMethod;
    use crate::request::{NoBody, NoQuery};
    use crate::response::TextDecoder;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u64,
        name: String,
    }

    impl NetworkResponse for User {}

    #[derive(Serialize)]
    struct NewUser {
        name: String,
    }

    /// Replies with a canned response and records what it was sent.
    struct StubTransport {
        reply: Result<WireResponse, TransportError>,
        delay: Option<Duration>,
        sent: Mutex<Vec<WireRequest>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(WireResponse {
                    status,
                    headers: Vec::new(),
                    body: body.as_bytes().to_vec(),
                }),
                delay: None,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: TransportError) -> Self {
            Self {
                reply: Err(error),
                delay: None,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone()
        }
    }

    fn users() -> Endpoint {
        Endpoint::parse("https://api.example.com/users/1").unwrap()
    }

    #[tokio::test]
    async fn execute_decodes_json_body() {
        let client = Client::new(StubTransport::replying(200, r#"{"id":1,"name":"Ann"}"#));
        let user: User = client.execute(&Request::new(users())).await.unwrap();
        assert_eq!(user.name, "Ann");
    }

    #[tokio::test]
    async fn execute_sends_assembled_request() {
        let transport = Arc::new(StubTransport::replying(201, r#"{"id":2,"name":"Bo"}"#));
        let client = Client::new(transport.clone());
        let req: Request<User, NoQuery, NewUser> = Request::new(users())
            .with_method(HttpMethod::post(NewUser { name: "Bo".to_string() }));
        client.execute(&req).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method.as_str(), "POST");
        assert_eq!(sent[0].body.as_deref(), Some(br#"{"name":"Bo"}"#.as_slice()));
    }

    #[tokio::test]
    async fn strict_execution_fails_on_bad_body() {
        let client = Client::new(StubTransport::replying(200, "not json"));
        let err = client.execute(&Request::<User>::new(users())).await.unwrap_err();
        assert!(matches!(err, RequestError::Decode(DecodeError::Json(_))));
    }

    #[tokio::test]
    async fn tolerant_execution_maps_bad_body_to_none() {
        let client = Client::new(StubTransport::replying(200, "not json"));
        let result = client.execute_optional(&Request::<User>::new(users())).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn tolerant_execution_keeps_good_body() {
        let client = Client::new(StubTransport::replying(200, r#"{"id":1,"name":"Ann"}"#));
        let result = client.execute_optional(&Request::<User>::new(users())).await.unwrap();
        assert_eq!(result.map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn transport_failure_propagates_in_both_variants() {
        let client = Client::new(StubTransport::failing(TransportError::Connect(
            "unreachable".to_string(),
        )));
        let req = Request::<User>::new(users());
        assert!(matches!(
            client.execute(&req).await,
            Err(RequestError::Transport(TransportError::Connect(_)))
        ));
        assert!(matches!(
            client.execute_optional(&req).await,
            Err(RequestError::Transport(TransportError::Connect(_)))
        ));
    }

    #[tokio::test]
    async fn error_status_is_a_hard_failure_in_both_variants() {
        let client = Client::new(StubTransport::replying(404, "missing"));
        let req = Request::<User>::new(users());
        assert!(matches!(
            client.execute(&req).await,
            Err(RequestError::Status { status: 404, ref body }) if body == "missing"
        ));
        assert!(matches!(
            client.execute_optional(&req).await,
            Err(RequestError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn unit_response_accepts_null_and_tolerates_empty_body() {
        let client = Client::new(StubTransport::replying(200, "null"));
        client.execute(&Request::<()>::new(users())).await.unwrap();

        let client = Client::new(StubTransport::replying(204, ""));
        let result = client.execute_optional(&Request::<()>::new(users())).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn text_decoder_accepts_non_json() {
        let client = Client::new(StubTransport::replying(200, "plain text"));
        let req = Request::<String>::new(users()).with_decoder(TextDecoder);
        assert_eq!(client.execute(&req).await.unwrap(), "plain text");
    }

    #[tokio::test]
    async fn query_projection_failure_surfaces_before_sending() {
        let transport = Arc::new(StubTransport::replying(200, "{}"));
        let client = Client::new(transport.clone());
        let req: Request<User, Vec<u8>, NoBody> =
            Request::new(users()).with_method(HttpMethod::get_with(vec![1]));
        assert!(matches!(
            client.execute(&req).await,
            Err(RequestError::Projection(_))
        ));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_sink_sees_header_degradation() {
        let sink = Arc::new(RecordingSink::new());
        let client = Client::with_diagnostics(
            StubTransport::replying(200, r#"{"id":1,"name":"Ann"}"#),
            sink.clone(),
        );
        let req = Request::<User>::new(users()).with_headers("not an object");
        client.execute(&req).await.unwrap();
        assert!(matches!(
            sink.events().as_slice(),
            [Diagnostic::HeaderProjectionFailed { .. }]
        ));
    }

    #[tokio::test]
    async fn started_request_resolves_once() {
        let client = Client::new(StubTransport::replying(200, r#"{"id":3,"name":"Cy"}"#));
        let pending = client.start(Request::<User>::new(users()));
        let user = pending.await.unwrap();
        assert_eq!(user.id, 3);
    }

    #[tokio::test]
    async fn started_optional_request_tolerates_bad_body() {
        let client = Client::new(StubTransport::replying(200, "[]"));
        let pending = client.start_optional(Request::<User>::new(users()));
        assert!(pending.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cancel_stops_a_slow_request_without_touching_others() {
        let slow = StubTransport {
            delay: Some(Duration::from_secs(30)),
            ..StubTransport::replying(200, r#"{"id":1,"name":"Ann"}"#)
        };
        let slow_client = Client::new(slow);
        let fast_client = Client::new(StubTransport::replying(200, r#"{"id":2,"name":"Bo"}"#));

        let cancelled = slow_client.start(Request::<User>::new(users()));
        let other = fast_client.start(Request::<User>::new(users()));
        cancelled.cancel();

        assert_eq!(other.await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn aborted_task_reports_cancelled() {
        let slow = StubTransport {
            delay: Some(Duration::from_secs(30)),
            ..StubTransport::replying(200, "{}")
        };
        let client = Client::new(slow);
        let mut pending = client.start(Request::<User>::new(users()));
        pending.handle.abort();
        assert!(matches!((&mut pending).await, Err(RequestError::Cancelled)));
    }
}
