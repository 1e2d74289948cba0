use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

use doc_model::{
    DocumentationNode, MarkupParser, PlainTextMarkupParser, ResolvedTopicReference,
    SourceLanguage, TopicReference, TopicReferenceResolutionResult,
};
use tracing::debug;
use url::Url;

use crate::transport::{
    ChildProcessTransport, DocumentationServiceClient, ResolverTransport, ServiceTransport,
};
use crate::wire::{AssetReference, DataAsset, ResolvedInformation};
use crate::{entity, ExternalResolverError, ResolverRequest, ResolverResponse};

/// Bundle identifier minted into references for externally resolved symbols,
/// so they can later be recognized as this resolver's.
pub const SYMBOL_BUNDLE_IDENTIFIER: &str = "com.externally.resolved.symbol";

/// A reference resolver that delegates to an out-of-process peer.
///
/// The peer is either a child executable this resolver spawns and owns, or an
/// already-running documentation service reached through a
/// [`DocumentationServiceClient`]. Every successful resolution is cached for
/// the resolver's lifetime: any reference this resolver returns can later be
/// served from its cache without further I/O.
///
/// Callers serialize access; the underlying transport keeps exactly one
/// request in flight.
pub struct OutOfProcessResolver {
    bundle_identifier: String,
    transport: Box<dyn ResolverTransport>,
    markup_parser: Box<dyn MarkupParser + Send>,
    topic_cache: HashMap<String, ResolvedInformation>,
    symbol_cache: HashMap<String, ResolvedInformation>,
    asset_cache: HashMap<AssetReference, DataAsset>,
}

impl std::fmt::Debug for OutOfProcessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutOfProcessResolver")
            .field("bundle_identifier", &self.bundle_identifier)
            .field("topic_cache_len", &self.topic_cache.len())
            .field("symbol_cache_len", &self.symbol_cache.len())
            .field("asset_cache_len", &self.asset_cache.len())
            .finish()
    }
}

impl OutOfProcessResolver {
    /// Spawns the resolver executable at `path` and performs the handshake.
    ///
    /// The child's first line on stdout must announce its bundle identifier;
    /// that identifier becomes this resolver's primary bundle and is immutable
    /// afterwards. Chunks the child writes to stderr are handed to
    /// `stderr_handler`.
    pub async fn from_executable(
        path: impl Into<PathBuf>,
        stderr_handler: impl FnMut(Vec<u8>) + Send + 'static,
    ) -> Result<Self, ExternalResolverError> {
        let mut transport = ChildProcessTransport::spawn(path, stderr_handler).await?;
        let reply = transport.send_and_wait(None).await?;
        let bundle_identifier = match reply {
            ResolverResponse::BundleIdentifier(identifier) => identifier,
            other => {
                return Err(ExternalResolverError::InvalidBundleIdentifierHandshake {
                    reply: other.kind_description().to_string(),
                })
            }
        };
        debug!(bundle = %bundle_identifier, "external resolver announced its bundle");
        Ok(Self::with_transport(bundle_identifier, Box::new(transport)))
    }

    /// Connects to an already-running documentation service.
    ///
    /// Service transports perform no handshake; the primary bundle identifier
    /// is supplied by the caller.
    pub fn from_service(
        bundle_identifier: impl Into<String>,
        client: Box<dyn DocumentationServiceClient>,
    ) -> Self {
        Self::with_transport(
            bundle_identifier.into(),
            Box::new(ServiceTransport::new(client)),
        )
    }

    fn with_transport(bundle_identifier: String, transport: Box<dyn ResolverTransport>) -> Self {
        Self {
            bundle_identifier,
            transport,
            markup_parser: Box::new(PlainTextMarkupParser),
            topic_cache: HashMap::new(),
            symbol_cache: HashMap::new(),
            asset_cache: HashMap::new(),
        }
    }

    /// Replaces the markup parser used when projecting abstracts.
    pub fn with_markup_parser(mut self, markup_parser: Box<dyn MarkupParser + Send>) -> Self {
        self.markup_parser = markup_parser;
        self
    }

    /// The primary bundle identifier this resolver answers for.
    pub fn bundle_identifier(&self) -> &str {
        &self.bundle_identifier
    }

    /// Resolves an external topic reference.
    ///
    /// Already-resolved input is returned unchanged. Unresolved input must
    /// carry a bundle identifier in its URL; a local reference reaching this
    /// resolver is a pipeline wiring error and panics.
    pub async fn resolve(
        &mut self,
        reference: TopicReference,
        _source_language: SourceLanguage,
    ) -> TopicReferenceResolutionResult {
        let unresolved = match reference {
            TopicReference::Resolved(result) => return result,
            TopicReference::Unresolved(unresolved) => unresolved,
        };

        if unresolved.bundle_identifier().is_none() {
            panic!(
                "unexpectedly received a local reference ({unresolved}) in the external \
                 resolution path; local references must be resolved before reaching an \
                 external resolver"
            );
        }

        let topic_url = match unresolved.canonical_url() {
            Ok(url) => url,
            Err(error) => {
                return TopicReferenceResolutionResult::Failure {
                    message: format!(
                        "invalid external reference URL '{}': {error}",
                        unresolved.topic_url
                    ),
                    reference: unresolved,
                }
            }
        };

        match self
            .resolve_information_for_topic(&topic_url)
            .await
            .map(|information| information.language.clone())
        {
            Ok(language) => TopicReferenceResolutionResult::Success(ResolvedTopicReference::new(
                self.bundle_identifier.clone(),
                topic_url.path(),
                topic_url.fragment().map(str::to_string),
                language,
            )),
            Err(error) => TopicReferenceResolutionResult::Failure {
                reference: unresolved,
                message: error.to_string(),
            },
        }
    }

    /// Returns the documentation node for a reference this resolver resolved.
    ///
    /// # Panics
    ///
    /// Panics when the reference was never resolved here; the resolver
    /// guarantees it can explain anything it minted, so a miss means the host
    /// wired the pipeline incorrectly.
    pub fn entity(&self, reference: &ResolvedTopicReference) -> DocumentationNode {
        let information = self.cached_topic_information(reference);
        entity::documentation_node(reference, information, self.markup_parser.as_ref())
    }

    /// Returns the canonical external URL for a reference this resolver
    /// resolved.
    ///
    /// # Panics
    ///
    /// Panics when the reference was never resolved here.
    pub fn url_for_resolved_reference(&self, reference: &ResolvedTopicReference) -> &Url {
        &self.cached_topic_information(reference).url
    }

    /// Cache-only variant of [`Self::entity`]; never issues a request.
    pub fn entity_if_previously_resolved(
        &self,
        reference: &ResolvedTopicReference,
    ) -> Option<DocumentationNode> {
        self.topic_cache
            .get(&reference.url_string())
            .map(|information| {
                entity::documentation_node(reference, information, self.markup_parser.as_ref())
            })
    }

    /// Cache-only variant of [`Self::url_for_resolved_reference`].
    pub fn url_for_resolved_reference_if_previously_resolved(
        &self,
        reference: &ResolvedTopicReference,
    ) -> Option<&Url> {
        self.topic_cache
            .get(&reference.url_string())
            .map(|information| &information.url)
    }

    /// Resolves a symbol by its precise (USR) identifier and returns its
    /// documentation node.
    ///
    /// The minted reference lives in the synthetic symbol bundle with the
    /// identifier as its only path component. The cache is keyed by the
    /// precise identifier alone; a USR is unique across source languages.
    pub async fn symbol_entity(
        &mut self,
        precise_identifier: &str,
    ) -> Result<DocumentationNode, ExternalResolverError> {
        let information = self
            .resolve_information_for_symbol(precise_identifier)
            .await?
            .clone();
        let reference = ResolvedTopicReference::new(
            SYMBOL_BUNDLE_IDENTIFIER,
            format!("/{precise_identifier}"),
            None,
            information.language.clone(),
        );
        Ok(entity::documentation_node(
            &reference,
            &information,
            self.markup_parser.as_ref(),
        ))
    }

    /// Returns the canonical external URL for a symbol reference this
    /// resolver minted, or `None` when the reference belongs to another
    /// resolver.
    ///
    /// # Panics
    ///
    /// Panics when the reference carries the synthetic symbol bundle but its
    /// identifier was never resolved here.
    pub fn url_for_resolved_symbol(&self, reference: &ResolvedTopicReference) -> Option<&Url> {
        if reference.bundle_identifier != SYMBOL_BUNDLE_IDENTIFIER {
            return None;
        }
        let precise_identifier = reference.last_path_component();
        match self.symbol_cache.get(precise_identifier) {
            Some(information) => Some(&information.url),
            None => panic!(
                "a symbol reference previously resolved by this resolver \
                 ({precise_identifier}) was not in its cache"
            ),
        }
    }

    /// Extracts the precise identifier from a reference to an externally
    /// resolved symbol; `None` for references in any other bundle.
    pub fn precise_identifier(&self, reference: &TopicReference) -> Option<String> {
        let (bundle_identifier, path) = match reference {
            TopicReference::Unresolved(unresolved) => (
                unresolved.bundle_identifier()?.to_string(),
                unresolved.path().to_string(),
            ),
            TopicReference::Resolved(TopicReferenceResolutionResult::Success(resolved)) => {
                (resolved.bundle_identifier.clone(), resolved.path.clone())
            }
            TopicReference::Resolved(TopicReferenceResolutionResult::Failure {
                reference, ..
            }) => (
                reference.bundle_identifier()?.to_string(),
                reference.path().to_string(),
            ),
        };
        (bundle_identifier == SYMBOL_BUNDLE_IDENTIFIER)
            .then(|| last_path_component(&path).to_string())
    }

    /// Resolves a named asset within a bundle.
    ///
    /// Assets are best-effort artifacts: every failure, including errors the
    /// peer reports, is swallowed and surfaces as `None`.
    pub async fn resolve_asset(
        &mut self,
        asset_name: &str,
        bundle_identifier: &str,
    ) -> Option<DataAsset> {
        let reference = AssetReference {
            asset_name: asset_name.to_string(),
            bundle_identifier: bundle_identifier.to_string(),
        };
        match self.resolve_information_for_asset(reference).await {
            Ok(asset) => Some(asset.clone()),
            Err(error) => {
                debug!(%error, "external asset resolution failed; treating the asset as absent");
                None
            }
        }
    }

    fn cached_topic_information(&self, reference: &ResolvedTopicReference) -> &ResolvedInformation {
        let key = reference.url_string();
        match self.topic_cache.get(&key) {
            Some(information) => information,
            None => panic!(
                "a reference previously resolved by this resolver ({key}) was not in its cache"
            ),
        }
    }

    async fn resolve_information_for_topic(
        &mut self,
        topic_url: &Url,
    ) -> Result<&ResolvedInformation, ExternalResolverError> {
        let Self {
            topic_cache,
            transport,
            ..
        } = self;
        match topic_cache.entry(topic_url.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let request = ResolverRequest::Topic(topic_url.clone());
                let response = transport.send_and_wait(Some(&request)).await?;
                let information = information_from_response(response, &request)?;
                Ok(entry.insert(information))
            }
        }
    }

    async fn resolve_information_for_symbol(
        &mut self,
        precise_identifier: &str,
    ) -> Result<&ResolvedInformation, ExternalResolverError> {
        let Self {
            symbol_cache,
            transport,
            ..
        } = self;
        match symbol_cache.entry(precise_identifier.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let request = ResolverRequest::Symbol(precise_identifier.to_string());
                let response = transport.send_and_wait(Some(&request)).await?;
                let information = information_from_response(response, &request)?;
                Ok(entry.insert(information))
            }
        }
    }

    async fn resolve_information_for_asset(
        &mut self,
        reference: AssetReference,
    ) -> Result<&DataAsset, ExternalResolverError> {
        let Self {
            asset_cache,
            transport,
            ..
        } = self;
        match asset_cache.entry(reference) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let request = ResolverRequest::Asset(entry.key().clone());
                let response = transport.send_and_wait(Some(&request)).await?;
                match response {
                    ResolverResponse::Asset(asset) => Ok(entry.insert(asset)),
                    ResolverResponse::BundleIdentifier(_) => {
                        Err(ExternalResolverError::SentBundleIdentifierAgain)
                    }
                    ResolverResponse::ErrorMessage(message) => {
                        Err(ExternalResolverError::ForwardedErrorMessage(message))
                    }
                    other => Err(ExternalResolverError::UnexpectedResponse {
                        response: other.kind_description(),
                        request: request.description(),
                    }),
                }
            }
        }
    }
}

fn information_from_response(
    response: ResolverResponse,
    request: &ResolverRequest,
) -> Result<ResolvedInformation, ExternalResolverError> {
    match response {
        ResolverResponse::ResolvedInformation(information) => Ok(*information),
        ResolverResponse::BundleIdentifier(_) => {
            Err(ExternalResolverError::SentBundleIdentifierAgain)
        }
        ResolverResponse::ErrorMessage(message) => {
            Err(ExternalResolverError::ForwardedErrorMessage(message))
        }
        other => Err(ExternalResolverError::UnexpectedResponse {
            response: other.kind_description(),
            request: request.description(),
        }),
    }
}

fn last_path_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
