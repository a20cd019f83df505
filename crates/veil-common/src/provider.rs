//! Supported third-party content providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EmbedError;

/// Kind of external content a reference points to.
///
/// Resolved once when a widget is created and fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    /// Social post, rendered by the provider's widget script
    Twitter,
    /// Fixed-size video frame with looked-up aspect ratio
    YouTube,
    /// Responsive 16:9 video frame
    Vimeo,
    /// Federated timeline post; the fallback for unrecognized URLs
    Mastodon,
}

impl ProviderTag {
    /// All providers, in URL classification priority order
    pub const ALL: [ProviderTag; 4] = [
        ProviderTag::Twitter,
        ProviderTag::YouTube,
        ProviderTag::Vimeo,
        ProviderTag::Mastodon,
    ];

    /// Lowercase identifier, as accepted by the `type` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTag::Twitter => "twitter",
            ProviderTag::YouTube => "youtube",
            ProviderTag::Vimeo => "vimeo",
            ProviderTag::Mastodon => "mastodon",
        }
    }

    /// Human-readable provider name shown in the notice
    pub fn label(&self) -> &'static str {
        match self {
            ProviderTag::Twitter => "Twitter",
            ProviderTag::YouTube => "YouTube",
            ProviderTag::Vimeo => "Vimeo",
            ProviderTag::Mastodon => "Mastodon",
        }
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderTag {
    type Err = EmbedError;

    /// Case-insensitive; anything unrecognized is rejected rather than
    /// falling back to a default provider.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EmbedError::UnknownProviderType(s.into()))
    }
}
