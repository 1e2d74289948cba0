use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::ResolverTransport;
use crate::{wire, ExternalResolverError, ResolverRequest, ResolverResponse};

/// Message kind for requests sent to a documentation service.
pub const RESOLVE_REQUEST_MESSAGE_KIND: &str = "resolve-reference";
/// Message kind the service uses for its replies.
pub const RESOLVE_RESPONSE_MESSAGE_KIND: &str = "resolved-reference-response";

/// The envelope a documentation service exchanges with its clients.
///
/// `payload` carries one wire frame as JSON text; `identifier` correlates a
/// reply with its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMessage {
    pub kind: String,
    pub identifier: u64,
    pub payload: String,
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceClientError {
    pub message: String,
}

impl ServiceClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A connection to an already-running documentation service.
#[async_trait]
pub trait DocumentationServiceClient: Send {
    /// Delivers `message` and waits for the correlated reply.
    async fn send(&mut self, message: ServiceMessage) -> Result<ServiceMessage, ServiceClientError>;
}

/// A resolver peer reached through a documentation service client.
///
/// Unlike a child process there is no handshake; the primary bundle
/// identifier is supplied when the resolver is constructed.
pub struct ServiceTransport {
    client: Box<dyn DocumentationServiceClient>,
    next_identifier: AtomicU64,
}

impl ServiceTransport {
    pub fn new(client: Box<dyn DocumentationServiceClient>) -> Self {
        Self {
            client,
            next_identifier: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ResolverTransport for ServiceTransport {
    async fn send_and_wait(
        &mut self,
        request: Option<&ResolverRequest>,
    ) -> Result<ResolverResponse, ExternalResolverError> {
        let Some(request) = request else {
            return Err(ExternalResolverError::MissingRequestForService);
        };

        let payload = serde_json::to_string(request).map_err(|source| {
            ExternalResolverError::UnableToEncodeRequest {
                description: request.description(),
                source,
            }
        })?;
        let identifier = self.next_identifier.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .client
            .send(ServiceMessage {
                kind: RESOLVE_REQUEST_MESSAGE_KIND.to_string(),
                identifier,
                payload,
            })
            .await
            .map_err(|error| ExternalResolverError::ServiceClient(error.to_string()))?;

        if reply.kind != RESOLVE_RESPONSE_MESSAGE_KIND {
            return Err(ExternalResolverError::InvalidResponseKind { raw: reply.kind });
        }
        if reply.identifier != identifier {
            return Err(ExternalResolverError::ServiceClient(format!(
                "reply correlation {} does not match request {identifier}",
                reply.identifier
            )));
        }
        wire::decode_frame(reply.payload.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoingClient;

    #[async_trait]
    impl DocumentationServiceClient for EchoingClient {
        async fn send(
            &mut self,
            message: ServiceMessage,
        ) -> Result<ServiceMessage, ServiceClientError> {
            assert_eq!(message.kind, RESOLVE_REQUEST_MESSAGE_KIND);
            Ok(ServiceMessage {
                kind: RESOLVE_RESPONSE_MESSAGE_KIND.to_string(),
                identifier: message.identifier,
                payload: r#"{"errorMessage":"unknown topic"}"#.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn requests_travel_inside_the_service_envelope() {
        let mut transport = ServiceTransport::new(Box::new(EchoingClient));
        let request = ResolverRequest::Symbol("s:3Foo3BarC".to_string());
        let reply = transport
            .send_and_wait(Some(&request))
            .await
            .expect("reply");
        assert_eq!(
            reply,
            ResolverResponse::ErrorMessage("unknown topic".to_string())
        );
    }

    #[tokio::test]
    async fn the_service_transport_has_no_handshake() {
        let mut transport = ServiceTransport::new(Box::new(EchoingClient));
        assert!(matches!(
            transport.send_and_wait(None).await,
            Err(ExternalResolverError::MissingRequestForService)
        ));
    }

    struct WrongKindClient;

    #[async_trait]
    impl DocumentationServiceClient for WrongKindClient {
        async fn send(
            &mut self,
            message: ServiceMessage,
        ) -> Result<ServiceMessage, ServiceClientError> {
            Ok(ServiceMessage {
                kind: "telemetry".to_string(),
                identifier: message.identifier,
                payload: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn mismatched_reply_kinds_fail_the_call() {
        let mut transport = ServiceTransport::new(Box::new(WrongKindClient));
        let request = ResolverRequest::Symbol("s:x".to_string());
        assert!(matches!(
            transport.send_and_wait(Some(&request)).await,
            Err(ExternalResolverError::InvalidResponseKind { .. })
        ));
    }
}
