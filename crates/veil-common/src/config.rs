//! Resolved notice configuration.
//!
//! How these values are sourced (per-widget attributes, page-level meta
//! tags, a config file) is up to the embedding application. The widget only
//! ever sees the resolved result.

use bon::Builder;
use serde::{Deserialize, Deserializer, Serialize};

use crate::provider::ProviderTag;

/// Placeholder in [`ResolvedConfig::intro_template`] replaced by the provider label
pub const SOURCE_LABEL_TOKEN: &str = "{sourceTypeLabel}";

/// Default notice heading
pub const DEFAULT_HEADING: &str = "External Content";
/// Default intro paragraph
pub const DEFAULT_INTRO: &str = "Here you'll find additional content from {sourceTypeLabel} that complements the article. You can easily view it with a single click and then hide it again.";
/// Default toggle label prefix; the provider label is appended
pub const DEFAULT_LABEL: &str = "Show external content from ";
/// Default consent fine print
pub const DEFAULT_CONSENT: &str = "I agree to have external content displayed to me. This may result in personal data being shared with third-party platforms.";

/// Whether the notice heading carries a provider icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowMode {
    /// Prefix the heading with the provider's icon
    Icon,
    /// Plain heading
    #[default]
    None,
}

impl ShowMode {
    /// Parse a configured value; anything but `icon` means no icon.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("icon") => ShowMode::Icon,
            _ => ShowMode::None,
        }
    }
}

impl<'de> Deserialize<'de> for ShowMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(ShowMode::from_value(value.as_deref()))
    }
}

/// Texts and options for the consent notice, resolved before a widget is built.
///
/// Missing fields fall back to the stock English texts, so an empty JSON
/// object deserializes to [`ResolvedConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default, rename_all = "camelCase")]
#[builder(start_fn = new)]
pub struct ResolvedConfig {
    /// Icon display mode
    #[builder(default)]
    pub show: ShowMode,
    /// Link to the site's privacy policy, appended to the fine print
    #[serde(alias = "policy")]
    #[builder(into)]
    pub policy_url: Option<String>,
    /// Notice heading
    #[builder(into, default = DEFAULT_HEADING.to_string())]
    pub heading: String,
    /// Intro paragraph containing [`SOURCE_LABEL_TOKEN`]
    #[serde(alias = "intro")]
    #[builder(into, default = DEFAULT_INTRO.to_string())]
    pub intro_template: String,
    /// Toggle label prefix
    #[builder(into, default = DEFAULT_LABEL.to_string())]
    pub label: String,
    /// Consent fine print
    #[serde(alias = "consent")]
    #[builder(into, default = DEFAULT_CONSENT.to_string())]
    pub consent_text: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::new().build()
    }
}

impl ResolvedConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Intro paragraph with the provider label substituted
    pub fn intro_for(&self, provider: ProviderTag) -> String {
        self.intro_template
            .replacen(SOURCE_LABEL_TOKEN, provider.label(), 1)
    }

    /// Toggle label naming the provider
    pub fn toggle_label_for(&self, provider: ProviderTag) -> String {
        format!("{}{}", self.label, provider.label())
    }
}
