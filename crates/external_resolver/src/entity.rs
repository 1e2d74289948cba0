//! Projection of resolver replies into host-facing entities.
//!
//! Everything here is pure: the projection depends only on the cached reply
//! and never touches the transport.

use doc_model::{
    AvailabilityItem, DocumentationNode, DocumentationNodeKind, MarkupParser, PlatformVersion,
    ResolvedTopicReference, SymbolKind, SymbolSemantic, MAC_CATALYST_DOMAIN,
};

use crate::wire::{PlatformAvailability, ResolvedInformation};

/// Builds the skeletal documentation node for a resolved topic or symbol.
pub fn documentation_node(
    reference: &ResolvedTopicReference,
    information: &ResolvedInformation,
    markup_parser: &dyn MarkupParser,
) -> DocumentationNode {
    let semantic = information
        .kind
        .is_symbol
        .then(|| symbol_semantic(information));
    let platforms = information.platforms.as_deref().unwrap_or_default();

    DocumentationNode {
        reference: reference.clone(),
        kind: DocumentationNodeKind {
            name: information.kind.name.clone(),
            id: information.kind.id.clone(),
            is_symbol: information.kind.is_symbol,
        },
        source_language: information.language.clone(),
        available_languages: information.available_languages.clone(),
        name: information.title.clone(),
        abstract_section: markup_parser.parse(&information.abstract_text),
        semantic,
        platform_names: platforms
            .iter()
            .map(|platform| platform.name.clone())
            .collect(),
    }
}

/// Builds the sparse symbol semantic for a reply whose kind is a symbol.
pub fn symbol_semantic(information: &ResolvedInformation) -> SymbolSemantic {
    SymbolSemantic {
        kind: SymbolKind {
            name: information.kind.name.clone(),
            id: information.kind.id.clone(),
        },
        title: information.title.clone(),
        declaration_fragments: information.declaration_fragments.clone(),
        availability: information
            .platforms
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(availability_item)
            .collect(),
    }
}

fn availability_item(platform: &PlatformAvailability) -> AvailabilityItem {
    AvailabilityItem {
        domain: canonical_domain(&platform.name),
        introduced: parse_version(platform.introduced.as_deref()),
        deprecated: parse_version(platform.deprecated.as_deref()),
        obsoleted: parse_version(platform.obsoleted.as_deref()),
        renamed: platform.renamed.clone(),
        is_unconditionally_deprecated: platform.unconditionally_deprecated.unwrap_or(false),
        is_unconditionally_unavailable: platform.unconditionally_unavailable.unwrap_or(false),
    }
}

/// Platforms announce Mac Catalyst under its display name; the availability
/// table wants the canonical domain identifier.
fn canonical_domain(name: &str) -> String {
    if name == "Mac Catalyst" {
        MAC_CATALYST_DOMAIN.to_string()
    } else {
        name.to_string()
    }
}

fn parse_version(raw: Option<&str>) -> Option<PlatformVersion> {
    raw.and_then(PlatformVersion::parse)
}
