//! Mastodon posts, through the instance's own `/embed` page.

use veil_common::dom::Element;
use veil_common::provider::ProviderTag;
use veil_common::source::{SourceReference, trailing_numeric_id};

use super::{EmbedSession, LoadContext};

/// Embed helper script that resizes the frame
pub const EMBED_SCRIPT_SRC: &str = "https://fosstodon.org/embed.js";
/// Class the helper script looks for
pub const EMBED_CLASS: &str = "mastodon-embed";

/// Post URL without a single trailing slash
pub fn normalize(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Embed frame for a normalized post URL
pub fn frame(post_url: &str) -> Element {
    Element::new("iframe")
        .with_attr("src", format!("{post_url}/embed"))
        .with_attr("class", EMBED_CLASS)
        .with_attr("style", "max-width: 100%; border: 0")
        .with_attr("width", "550")
        .with_attr("allowfullscreen", "")
}

/// Never fails: any URL can be framed, and the post id is only recorded.
/// The helper script is appended on every load without deduplication.
pub(crate) fn load<R>(
    ctx: &LoadContext<'_, R>,
    slot: &mut Element,
    reference: &SourceReference,
) -> EmbedSession {
    let post_url = normalize(&reference.url);
    let post_id = trailing_numeric_id(post_url);
    #[cfg(feature = "tracing")]
    tracing::debug!(post_url, post_id, "framing mastodon post");

    slot.append(frame(post_url));
    slot.append(
        Element::new("script")
            .with_attr("src", ctx.options.mastodon_script_src.as_str())
            .with_attr("async", ""),
    );
    EmbedSession::new(ProviderTag::Mastodon).with_content_id(post_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_one_trailing_slash() {
        assert_eq!(normalize("https://example.social/@user/42/"), "https://example.social/@user/42");
        assert_eq!(normalize("https://example.social/@user/42"), "https://example.social/@user/42");
        assert_eq!(normalize("https://example.social/@user/42//"), "https://example.social/@user/42/");
    }

    #[test]
    fn frame_points_at_embed_page() {
        let el = frame(normalize("https://example.social/@user/42/"));
        assert_eq!(el.attr("src"), Some("https://example.social/@user/42/embed"));
        assert!(el.has_class(EMBED_CLASS));
        assert_eq!(el.attr("width"), Some("550"));
    }
}
