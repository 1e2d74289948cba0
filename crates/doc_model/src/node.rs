use serde::{Deserialize, Serialize};

use crate::{AvailabilityItem, MarkupDocument, ResolvedTopicReference, SourceLanguage};

/// The kind of entity a documentation node describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationNodeKind {
    pub name: String,
    pub id: String,
    pub is_symbol: bool,
}

/// A skeletal documentation node, as produced for externally resolved content.
///
/// Externally resolved nodes carry just enough for rendering a link and a
/// curation row: no task groups, no discussion, no relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationNode {
    pub reference: ResolvedTopicReference,
    pub kind: DocumentationNodeKind,
    pub source_language: SourceLanguage,
    pub available_languages: Vec<SourceLanguage>,
    pub name: String,
    pub abstract_section: MarkupDocument,
    pub semantic: Option<SymbolSemantic>,
    pub platform_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolKind {
    pub name: String,
    pub id: String,
}

/// A sparse symbol semantic: kind, title, declaration, and availability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSemantic {
    pub kind: SymbolKind,
    pub title: String,
    pub declaration_fragments: Option<Vec<DeclarationFragment>>,
    pub availability: Vec<AvailabilityItem>,
}

/// One syntax-highlighted token of a symbol declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationFragment {
    pub kind: String,
    pub spelling: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precise_identifier: Option<String>,
}
