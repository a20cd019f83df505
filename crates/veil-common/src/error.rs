//! Error types for embed resolution and loading

use miette::Diagnostic;
use smol_str::SmolStr;

use crate::provider::ProviderTag;

/// Errors raised while resolving or loading a consent-gated embed.
///
/// `UnknownProviderType` and `MissingSource` are construction-time errors and
/// abort widget creation. The remaining kinds are produced while loading
/// content after consent was given; callers are expected to degrade rather
/// than propagate them.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum EmbedError {
    /// The explicit `type` attribute named an unsupported provider
    #[error("unknown provider type: {0:?}")]
    #[diagnostic(
        code(veil::unknown_provider_type),
        help("supported types: twitter, youtube, vimeo, mastodon")
    )]
    UnknownProviderType(SmolStr),

    /// No reference URL was declared
    #[error("missing src attribute")]
    #[diagnostic(
        code(veil::missing_source),
        help("set `src` to the URL of the content to embed")
    )]
    MissingSource,

    /// No content ID could be extracted for a provider that needs one
    #[error("no {provider} content id in {url}")]
    #[diagnostic(
        code(veil::invalid_reference),
        help("use a canonical post or video URL for this provider")
    )]
    InvalidReference {
        /// Provider the reference was resolved to
        provider: ProviderTag,
        /// Offending reference URL
        url: String,
    },

    /// Aspect-ratio metadata could not be retrieved
    #[error("metadata fetch failed: {0}")]
    #[diagnostic(code(veil::metadata_fetch_failed))]
    MetadataFetchFailed(String),

    /// The provider script never finished loading
    #[error("provider script {0:?} did not load")]
    #[diagnostic(
        code(veil::script_load_incomplete),
        help("the embed stays visible as static markup")
    )]
    ScriptLoadIncomplete(SmolStr),
}

impl EmbedError {
    /// Build an `InvalidReference` error
    pub fn invalid_reference(provider: ProviderTag, url: impl Into<String>) -> Self {
        Self::InvalidReference {
            provider,
            url: url.into(),
        }
    }

    /// Whether the error should abort widget construction
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownProviderType(_) | Self::MissingSource)
    }
}

/// Result alias for embed operations
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    #[diagnostic(code(veil::transport::connect))]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    #[diagnostic(code(veil::transport::timeout))]
    Timeout,

    /// Request construction failed (malformed URI, headers, etc.)
    #[error("Invalid request: {0}")]
    #[diagnostic(code(veil::transport::invalid_request))]
    InvalidRequest(String),

    /// Other transport error
    #[error("Transport error: {0}")]
    #[diagnostic(code(veil::transport::other))]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_request() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}

impl From<http::Error> for TransportError {
    fn from(e: http::Error) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}
