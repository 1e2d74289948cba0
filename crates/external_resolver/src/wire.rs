//! Wire types exchanged with a resolver peer.
//!
//! Every message is a single-key JSON object whose key names the variant,
//! emitted as one `\n`-terminated line. Embedded newlines only ever appear as
//! escape sequences inside string literals; a frame never spans lines.

use std::collections::BTreeMap;

use doc_model::{DeclarationFragment, SourceLanguage};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ExternalResolverError;

/// A request to the resolver peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolverRequest {
    /// Resolve a topic by its reference URL.
    Topic(Url),
    /// Resolve a symbol by its precise (USR) identifier.
    Symbol(String),
    /// Resolve a named asset within a bundle.
    Asset(AssetReference),
}

impl ResolverRequest {
    /// Human-readable request summary, used solely in error messages.
    pub fn description(&self) -> String {
        match self {
            Self::Topic(url) => format!("topic: '{url}'"),
            Self::Symbol(identifier) => format!("symbol: '{identifier}'"),
            Self::Asset(reference) => format!(
                "asset: '{}' in bundle '{}'",
                reference.asset_name, reference.bundle_identifier
            ),
        }
    }

    /// Decodes one request frame, for peers implemented against this crate.
    pub fn from_frame(line: &[u8]) -> Result<Self, ExternalResolverError> {
        let value = frame_value(line)?;
        if !matches!(single_key(&value), Some("topic" | "symbol" | "asset")) {
            return Err(ExternalResolverError::UnknownRequest { raw: lossy(line) });
        }
        serde_json::from_value(value).map_err(|source| decode_error(line, source))
    }
}

/// The name/bundle pair identifying an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReference {
    pub asset_name: String,
    pub bundle_identifier: String,
}

/// A reply from the resolver peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolverResponse {
    /// The one-time handshake announcement; illegal after the first reply.
    BundleIdentifier(String),
    /// The peer could not resolve the request.
    ErrorMessage(String),
    /// A successfully resolved topic or symbol.
    ResolvedInformation(Box<ResolvedInformation>),
    /// A successfully resolved asset.
    Asset(DataAsset),
}

impl ResolverResponse {
    pub fn kind_description(&self) -> &'static str {
        match self {
            Self::BundleIdentifier(_) => "bundleIdentifier",
            Self::ErrorMessage(_) => "errorMessage",
            Self::ResolvedInformation(_) => "resolvedInformation",
            Self::Asset(_) => "asset",
        }
    }
}

/// Everything the peer knows about a resolved topic or symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedInformation {
    pub kind: ResolvedEntityKind,
    /// The canonical external URL the host should link to.
    pub url: Url,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub language: SourceLanguage,
    pub available_languages: Vec<SourceLanguage>,
    #[serde(default)]
    pub platforms: Option<Vec<PlatformAvailability>>,
    #[serde(default)]
    pub declaration_fragments: Option<Vec<DeclarationFragment>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntityKind {
    pub name: String,
    pub id: String,
    pub is_symbol: bool,
}

/// Raw per-platform availability as announced by the peer.
///
/// Version fields stay strings on the wire; lenient parsing happens during
/// entity projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAvailability {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsoleted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unconditionally_deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unconditionally_unavailable: Option<bool>,
}

/// A resolved asset: its identity plus rendition URLs keyed by trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataAsset {
    pub name: String,
    pub bundle_identifier: String,
    #[serde(default)]
    pub variants: BTreeMap<String, Url>,
}

/// Encodes a request as one newline-terminated frame.
pub(crate) fn encode_frame(request: &ResolverRequest) -> Result<Vec<u8>, ExternalResolverError> {
    let mut frame = serde_json::to_vec(request).map_err(|source| {
        ExternalResolverError::UnableToEncodeRequest {
            description: request.description(),
            source,
        }
    })?;
    frame.push(b'\n');
    Ok(frame)
}

/// Decodes one response frame (without its newline terminator).
pub(crate) fn decode_frame(line: &[u8]) -> Result<ResolverResponse, ExternalResolverError> {
    let value = frame_value(line)?;
    if !matches!(
        single_key(&value),
        Some("bundleIdentifier" | "errorMessage" | "resolvedInformation" | "asset")
    ) {
        return Err(ExternalResolverError::InvalidResponseKind { raw: lossy(line) });
    }
    serde_json::from_value(value).map_err(|source| decode_error(line, source))
}

fn frame_value(line: &[u8]) -> Result<serde_json::Value, ExternalResolverError> {
    serde_json::from_slice(line).map_err(|source| decode_error(line, source))
}

/// The discriminating key, present only when the frame is a single-key object.
fn single_key(value: &serde_json::Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.keys().next().map(String::as_str)
}

fn decode_error(line: &[u8], source: serde_json::Error) -> ExternalResolverError {
    ExternalResolverError::UnableToDecodeResponse {
        raw: lossy(line),
        source,
    }
}

fn lossy(line: &[u8]) -> String {
    String::from_utf8_lossy(line).into_owned()
}
