//! The consent widget.
//!
//! A [`ConsentWidget`] starts [`ConsentState::Collapsed`], showing only the
//! privacy notice and the toggle. Turning the toggle on runs the provider
//! loader into the content slot; turning it off empties the slot and drops
//! the [`EmbedSession`], along with any provider render still waiting on a
//! page script.
//!
//! All transitions go through `&mut self`, so toggle events on one widget are
//! applied strictly one after another. A toggle future that is dropped
//! before its load finished leaves the widget collapsed.

use std::mem;
use std::sync::Arc;

use veil_common::config::{ResolvedConfig, ShowMode};
use veil_common::dom::Element;
use veil_common::error::{EmbedError, Result};
use veil_common::provider::ProviderTag;
use veil_common::source::SourceReference;
use veil_oembed::AspectRatioSource;

use crate::page::{Page, ScriptStatus};
use crate::providers::{self, EmbedSession, LoadContext, ProviderOptions};
use crate::styles::{
    CONTAINER_CLASS, FINEPRINT_CLASS, GlobalStyles, ROOT_TAG, SLIDER_CLASS, SLOT_CLASS,
    SWITCH_CLASS, SWITCH_CONTAINER_CLASS,
};

/// Toggle label while the embed is shown
pub const ACTIVE_LABEL: &str = "External content";
/// Widget width cap when the reference sets none
pub const DEFAULT_MAX_WIDTH: &str = "550px";

/// Whether the reader has opted in to the embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentState {
    /// Notice shown, nothing loaded
    #[default]
    Collapsed,
    /// Embed loaded into the content slot
    Expanded,
}

/// A consent-gated embed for one [`SourceReference`].
#[derive(Debug)]
pub struct ConsentWidget<R> {
    page: Arc<Page>,
    metadata: R,
    options: ProviderOptions,
    config: ResolvedConfig,
    reference: SourceReference,
    provider: ProviderTag,
    state: ConsentState,
    toggle_label: String,
    saved_label: Option<String>,
    heading: Element,
    intro: Element,
    fineprint: Element,
    slot: Element,
    session: Option<EmbedSession>,
    epoch: u64,
    last_error: Option<EmbedError>,
}

impl<R> ConsentWidget<R>
where
    R: AspectRatioSource + Sync,
{
    /// Build a collapsed widget, injecting the shared stylesheet into `page`
    /// if no widget did so yet.
    ///
    /// Fails if the provider cannot be resolved; nothing is fetched or
    /// inserted besides the stylesheet.
    pub async fn new(
        page: Arc<Page>,
        config: ResolvedConfig,
        reference: SourceReference,
        metadata: R,
    ) -> Result<Self> {
        let styles = page.clone();
        Self::with_styles(page, &styles, config, reference, metadata).await
    }

    /// Like [`ConsentWidget::new`], with an explicit stylesheet injector.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(url = %reference.url))
    )]
    pub async fn with_styles<S>(
        page: Arc<Page>,
        styles: &S,
        config: ResolvedConfig,
        reference: SourceReference,
        metadata: R,
    ) -> Result<Self>
    where
        S: GlobalStyles + Sync,
    {
        let provider = reference.provider()?;

        let mut heading = Element::new("h4").with_child(config.heading.as_str());
        if config.show == ShowMode::Icon {
            heading.prepend(
                Element::new("i")
                    .with_attr("class", format!("fab fa-{}", provider.as_str()))
                    .with_attr("style", "margin-right:10px"),
            );
        }
        let intro = Element::new("p").with_child(config.intro_for(provider));
        let mut fineprint = Element::new("p")
            .with_attr("class", FINEPRINT_CLASS)
            .with_child(config.consent_text.as_str());
        if let Some(policy) = &config.policy_url {
            fineprint.append(" To learn more, please refer to our ");
            fineprint.append(
                Element::new("a")
                    .with_attr("href", policy.as_str())
                    .with_child("privacy policy"),
            );
            fineprint.append(".");
        }
        let mut slot = Element::new("div").with_attr("class", SLOT_CLASS);
        slot.set_hidden(true);

        styles.inject_once(config.show).await;
        #[cfg(feature = "tracing")]
        tracing::debug!(%provider, "widget created");

        Ok(Self {
            page,
            metadata,
            options: ProviderOptions::default(),
            toggle_label: config.toggle_label_for(provider),
            config,
            reference,
            provider,
            state: ConsentState::Collapsed,
            saved_label: None,
            heading,
            intro,
            fineprint,
            slot,
            session: None,
            epoch: 0,
            last_error: None,
        })
    }

    /// Replace the loader endpoints and sizing
    pub fn with_options(mut self, options: ProviderOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply a toggle event. Setting the current state again does nothing.
    ///
    /// Load failures never escape: the widget stays collapsed and the error
    /// is kept in [`ConsentWidget::last_error`].
    pub async fn set_consent(&mut self, on: bool) -> ConsentState {
        match (self.state, on) {
            (ConsentState::Collapsed, true) => self.expand().await,
            (ConsentState::Expanded, false) => self.collapse(),
            _ => {}
        }
        self.state
    }

    /// Flip the toggle
    pub async fn toggle(&mut self) -> ConsentState {
        let on = self.state == ConsentState::Collapsed;
        self.set_consent(on).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(provider = %self.provider))
    )]
    async fn expand(&mut self) {
        self.slot.clear_children();
        let ctx = LoadContext {
            page: &self.page,
            metadata: &self.metadata,
            options: &self.options,
        };
        match providers::load(self.provider, &ctx, &mut self.slot, &self.reference).await {
            Ok(mut session) => {
                self.epoch += 1;
                session.epoch = self.epoch;
                self.session = Some(session);
                self.last_error = None;
                self.state = ConsentState::Expanded;
                self.set_notice_visible(false);
                let active = mem::replace(&mut self.toggle_label, ACTIVE_LABEL.to_string());
                self.saved_label = Some(active);
                self.apply_script_readiness();
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "embed load failed");
                self.slot.clear_children();
                self.last_error = Some(err);
            }
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(provider = %self.provider))
    )]
    fn collapse(&mut self) {
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let removed = self.slot.clear_children();
        self.session = None;
        self.state = ConsentState::Collapsed;
        self.set_notice_visible(true);
        if let Some(label) = self.saved_label.take() {
            self.toggle_label = label;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(removed, "embed discarded");
    }

    fn set_notice_visible(&mut self, visible: bool) {
        self.heading.set_hidden(!visible);
        self.intro.set_hidden(!visible);
        self.fineprint.set_hidden(!visible);
        self.slot.set_hidden(visible);
    }

    /// Act on the current status of the script the session waits on.
    ///
    /// A loaded script renders the slot; a failed one leaves it as is and
    /// records [`EmbedError::ScriptLoadIncomplete`]. Returns `None` when
    /// nothing is waiting.
    pub fn apply_script_readiness(&mut self) -> Option<ScriptStatus> {
        let session = self.session.as_ref()?;
        let status = *session.pending.as_ref()?.ready.borrow();
        let epoch = session.epoch;
        self.settle(epoch, status);
        Some(status)
    }

    /// Wait until the script the session depends on loads or fails, then
    /// apply it. Returns `None` when nothing is waiting.
    pub async fn wait_for_scripts(&mut self) -> Option<ScriptStatus> {
        let session = self.session.as_ref()?;
        let mut ready = session.pending.as_ref()?.ready.clone();
        let epoch = session.epoch;
        let status = match ready.wait_for(|s| *s != ScriptStatus::Pending).await {
            Ok(status) => *status,
            Err(_) => ScriptStatus::Failed,
        };
        self.settle(epoch, status);
        Some(status)
    }

    fn settle(&mut self, epoch: u64, status: ScriptStatus) {
        let Some(session) = self.session.as_mut().filter(|s| s.epoch == epoch) else {
            return;
        };
        match status {
            ScriptStatus::Pending => {}
            ScriptStatus::Loaded => {
                #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
                let rendered = providers::render_ready(session.provider(), &mut self.slot);
                session.set_rendered();
                #[cfg(feature = "tracing")]
                tracing::debug!(rendered, "provider script rendered embed");
            }
            ScriptStatus::Failed => {
                if let Some(pending) = session.pending.take() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(script = %pending.script_id, "provider script failed, embed stays static");
                    self.last_error = Some(EmbedError::ScriptLoadIncomplete(pending.script_id));
                }
            }
        }
    }
}

impl<R> ConsentWidget<R> {
    /// Provider resolved at construction
    pub fn provider(&self) -> ProviderTag {
        self.provider
    }

    /// Current consent state
    pub fn state(&self) -> ConsentState {
        self.state
    }

    /// Configuration the notice was built from
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// The embedded reference
    pub fn reference(&self) -> &SourceReference {
        &self.reference
    }

    /// Page this widget lives on
    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// Session of the current expanded period
    pub fn session(&self) -> Option<&EmbedSession> {
        self.session.as_ref()
    }

    /// Most recent load or script error, cleared by the next successful load
    pub fn last_error(&self) -> Option<&EmbedError> {
        self.last_error.as_ref()
    }

    /// Text next to the toggle
    pub fn toggle_label(&self) -> &str {
        &self.toggle_label
    }

    /// The content slot
    pub fn slot(&self) -> &Element {
        &self.slot
    }

    /// Whether the privacy notice is shown
    pub fn notice_visible(&self) -> bool {
        self.heading.is_displayed() && self.intro.is_displayed() && self.fineprint.is_displayed()
    }

    /// Whether the content slot is shown
    pub fn slot_visible(&self) -> bool {
        self.slot.is_displayed()
    }

    /// The whole widget as an element tree.
    pub fn render(&self) -> Element {
        let max_width = self
            .reference
            .max_width
            .as_deref()
            .unwrap_or(DEFAULT_MAX_WIDTH);

        let mut input = Element::new("input").with_attr("type", "checkbox");
        if self.state == ConsentState::Expanded {
            input.set_attr("checked", "");
        }
        let switch = Element::new("label")
            .with_attr("class", SWITCH_CLASS)
            .with_child(input)
            .with_child(Element::new("span").with_attr("class", format!("{SLIDER_CLASS} round")));
        let mut switch_row = Element::new("div")
            .with_attr("class", SWITCH_CONTAINER_CLASS)
            .with_attr("style", "align-items:center")
            .with_child(switch)
            .with_child(self.toggle_label.as_str());
        switch_row.set_display("flex");

        let container = Element::new("div")
            .with_attr("class", CONTAINER_CLASS)
            .with_child(self.heading.clone())
            .with_child(self.intro.clone())
            .with_child(switch_row)
            .with_child(self.fineprint.clone())
            .with_child(self.slot.clone());

        Element::new(ROOT_TAG)
            .with_attr("data-provider", self.provider.as_str())
            .with_attr("style", format!("max-width:{max_width}"))
            .with_child(container)
    }

    /// [`ConsentWidget::render`] serialized to HTML
    pub fn to_html(&self) -> String {
        self.render().to_html()
    }
}
