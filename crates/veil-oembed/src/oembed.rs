//! oEmbed metadata lookup.
//!
//! A single unauthenticated GET per lookup, without retries. Any transport
//! error, non-success status, or undecodable body is an [`OEmbedError`].

use std::future::Future;
use std::sync::Arc;

use bon::Builder;
use http::StatusCode;
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use veil_common::error::{EmbedError, TransportError};
use veil_common::http_client::{self, HttpClient};

/// Errors that can occur while looking up oEmbed metadata.
#[derive(Debug, Error, Diagnostic)]
pub enum OEmbedError {
    /// Request could not be built or sent
    #[error("HTTP error: {0}")]
    #[diagnostic(
        code(veil_oembed::http),
        help("check network connectivity and TLS configuration")
    )]
    Transport(#[from] TransportError),
    /// The HTTP client reported an error
    #[error("HTTP client error: {0}")]
    #[diagnostic(code(veil_oembed::client))]
    Client(Box<dyn std::error::Error + Send + Sync>),
    /// Non-success status from the endpoint
    #[error("HTTP status {0}")]
    #[diagnostic(
        code(veil_oembed::http_status),
        help("the video may be private, removed, or not embeddable")
    )]
    HttpStatus(StatusCode),
    /// Endpoint URL could not be parsed
    #[error("URL parse error: {0}")]
    #[diagnostic(code(veil_oembed::url))]
    Url(#[from] url::ParseError),
    /// Body was not an oEmbed JSON document
    #[error("serialize/deserialize error: {0}")]
    #[diagnostic(code(veil_oembed::serde))]
    Serde(#[from] serde_json::Error),
    /// Width or height missing, zero, or not finite
    #[error("unusable dimensions {width:?} x {height:?}")]
    #[diagnostic(code(veil_oembed::invalid_dimensions))]
    InvalidDimensions {
        /// Reported width
        width: Option<f64>,
        /// Reported height
        height: Option<f64>,
    },
}

impl OEmbedError {
    fn client(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Client(Box::new(e))
    }
}

impl From<OEmbedError> for EmbedError {
    fn from(e: OEmbedError) -> Self {
        EmbedError::MetadataFetchFailed(e.to_string())
    }
}

/// The subset of an oEmbed response veil cares about
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OEmbedResponse {
    /// oEmbed resource type (`video`, `rich`, ...)
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Title of the resource
    #[serde(default)]
    pub title: Option<String>,
    /// Name of the provider
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Width of the embed in pixels
    #[serde(default)]
    pub width: Option<f64>,
    /// Height of the embed in pixels
    #[serde(default)]
    pub height: Option<f64>,
}

impl OEmbedResponse {
    /// `width / height`, if both are positive and finite
    pub fn aspect_ratio(&self) -> Result<f64, OEmbedError> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 && (w / h).is_finite() => Ok(w / h),
            (width, height) => Err(OEmbedError::InvalidDimensions { width, height }),
        }
    }
}

/// Where to look up video metadata.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(start_fn = new)]
pub struct OEmbedOptions {
    /// oEmbed endpoint
    #[builder(default = Url::parse("https://www.youtube.com/oembed").expect("valid url"))]
    pub endpoint: Url,
    /// Prefix the video id is appended to, forming the `url` query parameter
    #[builder(into, default = "http://www.youtube.com/watch?v=".to_string())]
    pub watch_prefix: String,
}

impl Default for OEmbedOptions {
    fn default() -> Self {
        Self::new().build()
    }
}

/// Anything that can report a video's aspect ratio.
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait AspectRatioSource {
    /// Aspect ratio (`width / height`) of the video with the given id
    fn aspect_ratio(&self, video_id: &str) -> impl Future<Output = Result<f64, OEmbedError>>;
}

/// oEmbed client over any [`HttpClient`].
#[derive(Debug, Clone)]
pub struct OEmbedClient<C> {
    http: C,
    opts: OEmbedOptions,
}

impl<C: HttpClient> OEmbedClient<C> {
    /// Client for the default (YouTube) endpoint
    pub fn new(http: C) -> Self {
        Self::with_options(http, OEmbedOptions::default())
    }

    /// Client with explicit options
    pub fn with_options(http: C, opts: OEmbedOptions) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %opts.endpoint, "oembed client created");
        Self { http, opts }
    }

    /// Options in use
    pub fn options(&self) -> &OEmbedOptions {
        &self.opts
    }

    /// Lookup URL for a video id
    pub fn request_url(&self, video_id: &str) -> Url {
        let mut url = self.opts.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("url", &format!("{}{}", self.opts.watch_prefix, video_id))
            .append_pair("format", "json");
        url
    }

    /// Fetch and decode the oEmbed document for a video id
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self)))]
    pub async fn fetch(&self, video_id: &str) -> Result<OEmbedResponse, OEmbedError> {
        let request = http_client::json_get(&self.request_url(video_id))?;
        let response = self
            .http
            .send_http(request)
            .await
            .map_err(OEmbedError::client)?;
        let status = response.status();
        if !status.is_success() {
            return Err(OEmbedError::HttpStatus(status));
        }
        Ok(serde_json::from_slice(response.body())?)
    }
}

impl<C: HttpClient + Sync> AspectRatioSource for OEmbedClient<C> {
    async fn aspect_ratio(&self, video_id: &str) -> Result<f64, OEmbedError> {
        self.fetch(video_id).await?.aspect_ratio()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl<T: AspectRatioSource + Sync + Send> AspectRatioSource for Arc<T> {
    fn aspect_ratio(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<f64, OEmbedError>> + Send {
        self.as_ref().aspect_ratio(video_id)
    }
}
