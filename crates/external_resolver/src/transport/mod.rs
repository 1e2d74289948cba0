//! Bidirectional channels to a resolver peer.
//!
//! A transport owes its caller exactly one reply per call and never
//! interleaves; `&mut self` on [`ResolverTransport::send_and_wait`] encodes
//! the single-in-flight contract in the type.

use async_trait::async_trait;

use crate::{ExternalResolverError, ResolverRequest, ResolverResponse};

mod child;
mod service;

pub use child::ChildProcessTransport;
pub use service::{
    DocumentationServiceClient, ServiceClientError, ServiceMessage, ServiceTransport,
    RESOLVE_REQUEST_MESSAGE_KIND, RESOLVE_RESPONSE_MESSAGE_KIND,
};

/// One request out, one reply back.
#[async_trait]
pub trait ResolverTransport: Send {
    /// Sends `request` and waits for the peer's reply.
    ///
    /// A `None` request is legal only as the very first call on a
    /// child-process transport, where it means "read the handshake".
    async fn send_and_wait(
        &mut self,
        request: Option<&ResolverRequest>,
    ) -> Result<ResolverResponse, ExternalResolverError>;
}
