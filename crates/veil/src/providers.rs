//! Provider loaders.
//!
//! Each provider turns a [`SourceReference`] into the markup of its embed and
//! performs whatever side effects the embed needs. Loaders append to the
//! content slot only after their last suspension point, so a load that is
//! abandoned midway leaves the slot untouched.

pub mod mastodon;
pub mod twitter;
pub mod vimeo;
pub mod youtube;

use bon::Builder;
use smol_str::SmolStr;
use tokio::sync::watch;
use veil_common::dom::Element;
use veil_common::error::Result;
use veil_common::provider::ProviderTag;
use veil_common::source::SourceReference;
use veil_oembed::{AspectRatioSource, DimensionResolver, Dimensions};

use crate::page::{Page, ScriptStatus};

/// Endpoints and sizing used by the loaders.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(start_fn = new)]
pub struct ProviderOptions {
    /// Twitter widgets script
    #[builder(into, default = twitter::WIDGETS_SCRIPT_SRC.to_string())]
    pub twitter_script_src: String,
    /// Vimeo player API script
    #[builder(into, default = vimeo::PLAYER_SCRIPT_SRC.to_string())]
    pub vimeo_script_src: String,
    /// Mastodon embed helper script
    #[builder(into, default = mastodon::EMBED_SCRIPT_SRC.to_string())]
    pub mastodon_script_src: String,
    /// YouTube frame sizing
    #[builder(default)]
    pub dimensions: DimensionResolver,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self::new().build()
    }
}

/// Everything a loader may touch besides the content slot.
pub struct LoadContext<'a, R> {
    /// Page-global resources
    pub page: &'a Page,
    /// Aspect-ratio lookups
    pub metadata: &'a R,
    /// Endpoints and sizing
    pub options: &'a ProviderOptions,
}

/// A provider script render that waits for the script to load.
#[derive(Debug)]
pub struct PendingRender {
    /// Id of the page script
    pub script_id: SmolStr,
    /// Load status of that script
    pub ready: watch::Receiver<ScriptStatus>,
}

/// Side effects of one expanded period.
///
/// Dropping the session drops any pending provider render with it, so a
/// script that finishes loading after the widget collapsed has nothing left
/// to act on.
#[derive(Debug)]
pub struct EmbedSession {
    provider: ProviderTag,
    pub(crate) epoch: u64,
    content_id: Option<SmolStr>,
    dimensions: Option<Dimensions>,
    pub(crate) pending: Option<PendingRender>,
    rendered: bool,
}

impl EmbedSession {
    /// Empty session for `provider`
    pub fn new(provider: ProviderTag) -> Self {
        Self {
            provider,
            epoch: 0,
            content_id: None,
            dimensions: None,
            pending: None,
            rendered: false,
        }
    }

    /// Record the content id extracted from the reference
    pub fn with_content_id(mut self, id: Option<&str>) -> Self {
        self.content_id = id.map(SmolStr::from);
        self
    }

    /// Record the frame size
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Attach a render waiting on a page script
    pub fn with_pending(mut self, pending: PendingRender) -> Self {
        self.pending = Some(pending);
        self
    }

    /// Provider that produced this session
    pub fn provider(&self) -> ProviderTag {
        self.provider
    }

    /// Activation counter of the owning widget when this session started
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Content id, where the provider has one
    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    /// Frame size, for fixed-size frames
    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dimensions.as_ref()
    }

    /// Whether a provider script render is still outstanding
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a provider script has rendered the embed
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(crate) fn set_rendered(&mut self) {
        self.pending = None;
        self.rendered = true;
    }
}

/// Load the embed for `provider` into `slot`.
pub async fn load<R>(
    provider: ProviderTag,
    ctx: &LoadContext<'_, R>,
    slot: &mut Element,
    reference: &SourceReference,
) -> Result<EmbedSession>
where
    R: AspectRatioSource + Sync,
{
    match provider {
        ProviderTag::Twitter => Ok(twitter::load(ctx, slot, reference).await),
        ProviderTag::YouTube => youtube::load(ctx, slot, reference).await,
        ProviderTag::Vimeo => vimeo::load(ctx, slot, reference),
        ProviderTag::Mastodon => Ok(mastodon::load(ctx, slot, reference)),
    }
}

/// Re-run a ready provider script over the slot. Returns how many embeds it rendered.
pub fn render_ready(provider: ProviderTag, slot: &mut Element) -> usize {
    match provider {
        ProviderTag::Twitter => twitter::render_widgets(slot),
        ProviderTag::YouTube | ProviderTag::Vimeo | ProviderTag::Mastodon => 0,
    }
}
