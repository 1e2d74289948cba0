#![forbid(unsafe_code)]
//! Host-facing documentation model shared between a documentation compiler and
//! its reference resolvers.
//!
//! This crate owns the shapes the compiler exchanges with a resolver: topic
//! references (unresolved and resolved), skeletal documentation nodes, sparse
//! symbol semantics with per-platform availability, source languages, and the
//! markup-parser seam. It performs no I/O.

mod availability;
mod language;
mod markup;
mod node;
mod reference;

pub use availability::{AvailabilityItem, PlatformVersion, MAC_CATALYST_DOMAIN};
pub use language::SourceLanguage;
pub use markup::{MarkupDocument, MarkupParser, PlainTextMarkupParser};
pub use node::{
    DeclarationFragment, DocumentationNode, DocumentationNodeKind, SymbolKind, SymbolSemantic,
};
pub use reference::{
    ResolvedTopicReference, TopicReference, TopicReferenceResolutionResult,
    UnresolvedTopicReference,
};
