//! Vimeo videos, embedded as a responsive 16:9 frame.

use veil_common::dom::Element;
use veil_common::error::{EmbedError, Result};
use veil_common::provider::ProviderTag;
use veil_common::source::{SourceReference, trailing_numeric_id};

use super::{EmbedSession, LoadContext};

/// Player endpoint; the video id is appended
pub const PLAYER_BASE: &str = "https://player.vimeo.com/video/";
/// Player query parameters
pub const PLAYER_PARAMS: &str = "color=ff9933&portrait=0";
/// Player API script
pub const PLAYER_SCRIPT_SRC: &str = "https://player.vimeo.com/api/player.js";
/// Wrapper style keeping a 16:9 box at any width
pub const WRAPPER_STYLE: &str = "padding:56.25% 0 0 0;position:relative;";

/// Responsive player markup: wrapper, frame, and player script
pub fn player(video_id: &str, script_src: &str) -> Element {
    let frame = Element::new("iframe")
        .with_attr("src", format!("{PLAYER_BASE}{video_id}?{PLAYER_PARAMS}"))
        .with_attr("title", "Vimeo video player")
        .with_attr(
            "style",
            "position:absolute;top:0;left:0;width:100%;height:100%;border:0px",
        )
        .with_attr("allow", "autoplay; fullscreen; picture-in-picture")
        .with_attr("allowfullscreen", "");
    Element::new("div")
        .with_attr("style", WRAPPER_STYLE)
        .with_child(frame)
        .with_child(Element::new("script").with_attr("src", script_src))
}

/// Vimeo ids are numeric; a URL without a trailing number (showcases,
/// channels, trailing slash) has no id and is rejected.
pub(crate) fn load<R>(
    ctx: &LoadContext<'_, R>,
    slot: &mut Element,
    reference: &SourceReference,
) -> Result<EmbedSession> {
    let id = trailing_numeric_id(&reference.url)
        .ok_or_else(|| EmbedError::invalid_reference(ProviderTag::Vimeo, &reference.url))?;
    slot.append(player(id, &ctx.options.vimeo_script_src));
    Ok(EmbedSession::new(ProviderTag::Vimeo).with_content_id(Some(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_markup() {
        let el = player("76979871", PLAYER_SCRIPT_SRC);
        assert_eq!(el.attr("style"), Some(WRAPPER_STYLE));
        let frames = el.find_by_tag("iframe");
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].attr("src"),
            Some("https://player.vimeo.com/video/76979871?color=ff9933&portrait=0")
        );
        let scripts = el.find_by_tag("script");
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].attr("src"), Some(PLAYER_SCRIPT_SRC));
    }
}
