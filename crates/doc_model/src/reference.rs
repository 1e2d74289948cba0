use std::fmt;

use url::Url;

use crate::SourceLanguage;

/// The scheme used by in-documentation topic references.
pub const TOPIC_URL_SCHEME: &str = "doc";

/// Renders `doc://<bundle><path>[#fragment]`, normalized through a URL parse
/// so both sides of a resolution agree on one canonical spelling.
fn render_reference_url(bundle_identifier: &str, path: &str, fragment: Option<&str>) -> String {
    let mut raw = format!("{TOPIC_URL_SCHEME}://{bundle_identifier}{path}");
    if let Some(fragment) = fragment {
        raw.push('#');
        raw.push_str(fragment);
    }
    match Url::parse(&raw) {
        Ok(url) => url.to_string(),
        Err(_) => raw,
    }
}

/// A topic reference as written in markup, before any resolution.
///
/// The URL's host names the bundle the topic belongs to; a reference without a
/// host is local to the bundle being compiled and never reaches an external
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTopicReference {
    pub topic_url: Url,
}

impl UnresolvedTopicReference {
    pub fn new(topic_url: Url) -> Self {
        Self { topic_url }
    }

    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::new)
    }

    /// The bundle identifier carried in the URL's host, if any.
    pub fn bundle_identifier(&self) -> Option<&str> {
        self.topic_url.host_str()
    }

    pub fn path(&self) -> &str {
        self.topic_url.path()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.topic_url.fragment()
    }

    /// Reassembles the reference into its canonical request URL, dropping any
    /// component (query, credentials) that plays no part in resolution.
    pub fn canonical_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&render_reference_url(
            self.topic_url.host_str().unwrap_or_default(),
            self.topic_url.path(),
            self.topic_url.fragment(),
        ))
    }
}

impl fmt::Display for UnresolvedTopicReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.topic_url)
    }
}

/// A canonical, post-resolution topic reference.
///
/// Equality is over all four fields: bundle, path, fragment, and language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedTopicReference {
    pub bundle_identifier: String,
    pub path: String,
    pub fragment: Option<String>,
    pub source_language: SourceLanguage,
}

impl ResolvedTopicReference {
    pub fn new(
        bundle_identifier: impl Into<String>,
        path: impl Into<String>,
        fragment: Option<String>,
        source_language: SourceLanguage,
    ) -> Self {
        Self {
            bundle_identifier: bundle_identifier.into(),
            path: path.into(),
            fragment,
            source_language,
        }
    }

    /// The canonical `doc://` spelling of this reference.
    pub fn url_string(&self) -> String {
        render_reference_url(&self.bundle_identifier, &self.path, self.fragment.as_deref())
    }

    pub fn last_path_component(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for ResolvedTopicReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url_string())
    }
}

/// The outcome of resolving a topic reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicReferenceResolutionResult {
    Success(ResolvedTopicReference),
    Failure {
        reference: UnresolvedTopicReference,
        message: String,
    },
}

/// A topic reference in either pre- or post-resolution form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicReference {
    Unresolved(UnresolvedTopicReference),
    Resolved(TopicReferenceResolutionResult),
}
