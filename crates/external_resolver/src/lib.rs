#![forbid(unsafe_code)]
//! Out-of-process reference resolution bridge for documentation compilers.
//!
//! A compiler that encounters references into documentation it does not own
//! delegates them here. The bridge talks to a sibling resolver, either a
//! long-running child executable it spawns and owns or an already-running
//! documentation service reached through a request/response client, and hides
//! the transport, framing, handshake, caching, and lifecycle behind one
//! in-process interface.
//!
//! The peer speaks newline-delimited, single-key tagged JSON. A child process
//! announces its bundle identifier as its very first stdout line; after that
//! handshake every request is answered by exactly one reply, in order.

pub mod entity;
mod error;
mod resolver;
mod transport;
mod wire;

pub use error::ExternalResolverError;
pub use resolver::{OutOfProcessResolver, SYMBOL_BUNDLE_IDENTIFIER};
pub use transport::{
    ChildProcessTransport, DocumentationServiceClient, ResolverTransport, ServiceClientError,
    ServiceMessage, ServiceTransport, RESOLVE_REQUEST_MESSAGE_KIND, RESOLVE_RESPONSE_MESSAGE_KIND,
};
pub use wire::{
    AssetReference, DataAsset, PlatformAvailability, ResolvedEntityKind, ResolvedInformation,
    ResolverRequest, ResolverResponse,
};
