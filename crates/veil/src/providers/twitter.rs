//! Twitter posts.
//!
//! The post is embedded as a plain citation, which the provider's widgets
//! script upgrades once it has loaded. If the script never loads the
//! citation stays as is.

use veil_common::dom::Element;
use veil_common::provider::ProviderTag;
use veil_common::source::{SourceReference, trailing_numeric_id};

use super::{EmbedSession, LoadContext, PendingRender};
use crate::page::ScriptSpec;

/// Element id of the widgets script
pub const SCRIPT_ID: &str = "twitter-wjs";
/// Widgets script URL
pub const WIDGETS_SCRIPT_SRC: &str = "https://platform.twitter.com/widgets.js";
/// Class the widgets script looks for
pub const TWEET_CLASS: &str = "twitter-tweet";
/// Set on citations the widgets script has rendered
pub const RENDERED_ATTR: &str = "data-veil-rendered";

/// Citation markup for a post URL
pub fn citation(url: &str) -> Element {
    Element::new("blockquote")
        .with_attr("class", TWEET_CLASS)
        .with_child(Element::new("a").with_attr("href", url))
}

pub(crate) async fn load<R>(
    ctx: &LoadContext<'_, R>,
    slot: &mut Element,
    reference: &SourceReference,
) -> EmbedSession {
    let script = ScriptSpec {
        id: SCRIPT_ID.into(),
        src: ctx.options.twitter_script_src.clone(),
        is_async: true,
    };
    let handle = ctx.page.ensure_script(&script).await;
    #[cfg(feature = "tracing")]
    tracing::debug!(inserted = handle.inserted, "twitter widgets script ensured");

    slot.append(citation(&reference.url));
    EmbedSession::new(ProviderTag::Twitter)
        .with_content_id(trailing_numeric_id(&reference.url))
        .with_pending(PendingRender {
            script_id: script.id,
            ready: handle.ready,
        })
}

/// What the widgets script does when asked to load a container: render
/// every citation in it that was not rendered yet.
pub fn render_widgets(container: &mut Element) -> usize {
    container.for_each_mut(
        |el| el.has_class(TWEET_CLASS) && el.attr(RENDERED_ATTR).is_none(),
        &mut |el: &mut Element| el.set_attr(RENDERED_ATTR, "true"),
    )
}
