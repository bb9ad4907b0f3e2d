use std::future::Future;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use spotcheck_protocol::{
    decode_reply, encode_request, AttemptRecord, CheckReply, CompleteReply, CoordinationRequest,
    Identity, ProbeReply, ProtocolError, ReserveReply,
};
use thiserror::Error;

/// Error conditions raised by the attempt transport.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid endpoint url: {0}")]
    Endpoint(String),
    #[error("transport failure: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("reading reply body failed: {0}")]
    Body(#[from] hyper::Error),
    #[error("collaborator answered with status {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Remote collaborator operations used by the login gate and the reporter.
///
/// One round trip per call; no retries are made here and none are expected
/// by callers. Fakes implement this in tests to script outcomes.
pub trait AttemptBackend {
    fn check(&self, identity: &Identity) -> impl Future<Output = Result<bool, RemoteError>> + Send;

    fn reserve(
        &self,
        identity: &Identity,
        meta: Value,
    ) -> impl Future<Output = Result<bool, RemoteError>> + Send;

    fn complete(
        &self,
        record: &AttemptRecord,
    ) -> impl Future<Output = Result<bool, RemoteError>> + Send;
}

/// HTTP client for the deployed coordination service.
///
/// Plain `http://` only; every operation is a single `POST` against the
/// configured endpoint, plus a `GET` for the liveness probe.
#[derive(Debug, Clone)]
pub struct RemoteService {
    endpoint: Uri,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl RemoteService {
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        let endpoint: Uri = endpoint
            .parse()
            .map_err(|err| RemoteError::Endpoint(format!("{endpoint}: {err}")))?;
        Ok(Self {
            endpoint,
            client: Client::builder(TokioExecutor::new()).build_http(),
        })
    }

    async fn post(&self, request: &CoordinationRequest) -> Result<Bytes, RemoteError> {
        let body = encode_request(request)?;
        let mut http_request = Request::new(Full::new(Bytes::from(body)));
        *http_request.method_mut() = Method::POST;
        *http_request.uri_mut() = self.endpoint.clone();
        http_request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self.client.request(http_request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        Ok(response.into_body().collect().await?.to_bytes())
    }

    /// Liveness probe; any success status with a parseable body counts.
    pub async fn probe(&self) -> Result<ProbeReply, RemoteError> {
        let mut http_request = Request::new(Full::new(Bytes::new()));
        *http_request.uri_mut() = self.endpoint.clone();

        let response = self.client.request(http_request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status));
        }
        let body = response.into_body().collect().await?.to_bytes();
        Ok(decode_reply::<ProbeReply>(&body)?)
    }
}

impl AttemptBackend for RemoteService {
    async fn check(&self, identity: &Identity) -> Result<bool, RemoteError> {
        let body = self
            .post(&CoordinationRequest::Check {
                name: identity.clone(),
            })
            .await?;
        let reply: CheckReply = decode_reply(&body)?;
        Ok(reply.played)
    }

    async fn reserve(&self, identity: &Identity, meta: Value) -> Result<bool, RemoteError> {
        let body = self
            .post(&CoordinationRequest::Reserve {
                name: identity.clone(),
                meta,
            })
            .await?;
        let reply: ReserveReply = decode_reply(&body)?;
        Ok(reply.reserved)
    }

    async fn complete(&self, record: &AttemptRecord) -> Result<bool, RemoteError> {
        let body = self
            .post(&CoordinationRequest::Complete(record.clone()))
            .await?;
        let reply: CompleteReply = decode_reply(&body)?;
        Ok(reply.ok)
    }
}
