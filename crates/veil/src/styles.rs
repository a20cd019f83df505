//! Shared stylesheet and its one-time injection.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use veil_common::config::ShowMode;
use veil_common::dom::Element;

use crate::page::Page;

/// Custom element name of the widget root
pub const ROOT_TAG: &str = "veil-frame";
/// Class of the notice-plus-slot container
pub const CONTAINER_CLASS: &str = "veil-container";
/// Class of the toggle row
pub const SWITCH_CONTAINER_CLASS: &str = "veil-switch-container";
/// Class of the toggle `<label>`
pub const SWITCH_CLASS: &str = "veil-switch";
/// Class of the toggle knob
pub const SLIDER_CLASS: &str = "veil-slider";
/// Class of the consent fine print
pub const FINEPRINT_CLASS: &str = "veil-fineprint";
/// Class of the content slot
pub const SLOT_CLASS: &str = "veil-content";

const FONT_AWESOME_IMPORT: &str =
    "@import url('https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.1.0/css/all.min.css');";

const BASE_RULES: &str = "\
veil-frame { display: block; width: 100%; height: 100%; }
.veil-switch { position: relative; margin-right: 5px; display: inline-block; width: 40px; height: 24px; }
.veil-switch-container { margin-bottom: 10px; }
.veil-switch input { display: none; }
.veil-slider { position: absolute; cursor: pointer; inset: 0; background-color: #ccc; transition: .4s; border-radius: 34px; }
.veil-slider:before { position: absolute; content: \"\"; height: 18px; width: 18px; left: 3px; bottom: 3px; background-color: white; transition: .4s; border-radius: 50%; }
input:checked + .veil-slider { background-color: #2196F3; }
input:focus + .veil-slider { box-shadow: 0 0 1px #2196F3; }
input:checked + .veil-slider:before { transform: translateX(16px); }
";

/// Stylesheet text; icon mode pulls in the icon font.
pub fn stylesheet(show: ShowMode) -> String {
    match show {
        ShowMode::Icon => format!("{FONT_AWESOME_IMPORT}\n{BASE_RULES}"),
        ShowMode::None => BASE_RULES.to_string(),
    }
}

/// `<style>` element carrying [`stylesheet`]
pub fn stylesheet_element(show: ShowMode) -> Element {
    Element::new("style")
        .with_attr("data-veil", "")
        .with_child(stylesheet(show))
}

/// Capability to add the shared stylesheet to a page exactly once.
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait GlobalStyles {
    /// Inject the stylesheet unless already done. Returns whether this call injected it.
    fn inject_once(&self, show: ShowMode) -> impl Future<Output = bool>;
}

impl GlobalStyles for Page {
    async fn inject_once(&self, show: ShowMode) -> bool {
        if self
            .styles_injected
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.append_head(stylesheet_element(show)).await;
        #[cfg(feature = "tracing")]
        tracing::debug!(?show, "stylesheet injected");
        true
    }
}

impl<T: GlobalStyles + Sync + Send> GlobalStyles for Arc<T> {
    fn inject_once(&self, show: ShowMode) -> impl Future<Output = bool> + Send {
        self.as_ref().inject_once(show)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injects_exactly_once() {
        let page = Page::default();
        assert!(page.inject_once(ShowMode::None).await);
        assert!(!page.inject_once(ShowMode::Icon).await);
        let head = page.head().await;
        assert_eq!(head.len(), 1);
        assert_eq!(head[0].tag(), "style");
        assert!(!head[0].text_content().contains("font-awesome"));
    }

    #[tokio::test]
    async fn concurrent_injection_wins_once() {
        let page = Arc::new(Page::default());
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let page = page.clone();
            tasks.push(tokio::spawn(async move { page.inject_once(ShowMode::None).await }));
        }
        let mut injected = 0;
        for task in tasks {
            if task.await.unwrap() {
                injected += 1;
            }
        }
        assert_eq!(injected, 1);
        assert_eq!(page.head().await.len(), 1);
    }

    #[test]
    fn icon_mode_imports_font() {
        assert!(stylesheet(ShowMode::Icon).starts_with("@import"));
        assert!(!stylesheet(ShowMode::None).contains("@import"));
    }
}
