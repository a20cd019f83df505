//! Source references and provider classification.
//!
//! A reference URL is classified by host pattern in a fixed priority order:
//! Twitter, then YouTube, then Vimeo. Anything else, including strings that
//! are not URLs at all, is treated as a Mastodon post. That fallback is
//! permissive on purpose and does not validate the URL.

use std::sync::LazyLock;

use bon::Builder;
use regex::Regex;

use crate::error::{EmbedError, Result};
use crate::provider::ProviderTag;

// Optional `scheme://` or protocol-relative `//` before the authority.
static TWITTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:[a-z][a-z0-9+.-]*:)?//)?(?:www\.)?twitter\.com(?:[/:?#]|$)").unwrap()
});

static YOUTUBE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:[a-z][a-z0-9+.-]*:)?//)?(?:(?:www|m)\.)?(?:youtube(?:-nocookie)?\.com|youtube\.googleapis\.com|youtu\.be)(?:[/:?#]|$)",
    )
    .unwrap()
});

static VIMEO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:(?:[a-z][a-z0-9+.-]*:)?//)?[^/?#]*vimeo").unwrap());

/// Attribute carrying the reference URL
pub const ATTR_SRC: &str = "src";
/// Attribute carrying an explicit provider type
pub const ATTR_TYPE: &str = "type";
/// Attribute carrying the widget's maximum width
pub const ATTR_MAX_WIDTH: &str = "max-width";
/// Attribute overriding the YouTube frame width
pub const ATTR_YT_WIDTH: &str = "yt-width";
/// Attribute overriding the YouTube frame height
pub const ATTR_YT_HEIGHT: &str = "yt-height";

/// Classify a reference URL, honoring an explicit type when one is given.
///
/// Explicit types are matched case-insensitively and must name a supported
/// provider; unknown values are an error rather than a silent fallback.
pub fn resolve_source_type(url: &str, explicit_type: Option<&str>) -> Result<ProviderTag> {
    if let Some(explicit) = explicit_type {
        return explicit.parse();
    }
    let url = url.trim();
    let tag = if TWITTER_REGEX.is_match(url) {
        ProviderTag::Twitter
    } else if YOUTUBE_REGEX.is_match(url) {
        ProviderTag::YouTube
    } else if VIMEO_REGEX.is_match(url) {
        ProviderTag::Vimeo
    } else {
        ProviderTag::Mastodon
    };
    #[cfg(feature = "tracing")]
    tracing::trace!(url, provider = %tag, "classified reference");
    Ok(tag)
}

/// Last run of ASCII digits at the very end of `url`, if any.
pub fn trailing_numeric_id(url: &str) -> Option<&str> {
    let stem = url.trim_end_matches(|c: char| c.is_ascii_digit());
    let id = &url[stem.len()..];
    (!id.is_empty()).then_some(id)
}

/// Reference to a piece of external content, as declared on the widget.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(start_fn = new)]
pub struct SourceReference {
    /// URL of the content to embed, without surrounding whitespace
    #[builder(with = |url: impl Into<String>| url.into().trim().to_string())]
    pub url: String,
    /// Provider named explicitly by the author, unparsed
    #[builder(into)]
    pub explicit_type: Option<String>,
    /// Frame width override (YouTube only)
    #[builder(into)]
    pub width_override: Option<String>,
    /// Frame height override (YouTube only)
    #[builder(into)]
    pub height_override: Option<String>,
    /// CSS length capping the widget width
    #[builder(into)]
    pub max_width: Option<String>,
}

impl SourceReference {
    /// Build a reference from declared `(name, value)` attribute pairs.
    ///
    /// Names are matched case-insensitively and values are trimmed. Blank
    /// values count as absent, and a missing `src` is an error.
    pub fn from_attributes<'a, I>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut url = None;
        let mut explicit_type = None;
        let mut width_override = None;
        let mut height_override = None;
        let mut max_width = None;

        for (name, value) in attributes {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match name.to_ascii_lowercase().as_str() {
                ATTR_SRC => &mut url,
                ATTR_TYPE => &mut explicit_type,
                ATTR_YT_WIDTH => &mut width_override,
                ATTR_YT_HEIGHT => &mut height_override,
                ATTR_MAX_WIDTH => &mut max_width,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }

        Ok(Self {
            url: url.ok_or(EmbedError::MissingSource)?,
            explicit_type,
            width_override,
            height_override,
            max_width,
        })
    }

    /// Resolve the provider this reference points to
    pub fn provider(&self) -> Result<ProviderTag> {
        resolve_source_type(&self.url, self.explicit_type.as_deref())
    }
}
