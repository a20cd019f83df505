use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tokio::sync::Mutex;
use veil::common::http_client::HttpClient;
use veil::common::{EmbedError, ProviderTag, ResolvedConfig, SourceReference};
use veil::oembed::{AspectRatioSource, OEmbedClient, OEmbedError};
use veil::providers::twitter;
use veil::{ConsentState, ConsentWidget, Page, ScriptStatus};

#[derive(Clone, Default)]
struct MockClient {
    queue: Arc<Mutex<VecDeque<http::Response<Vec<u8>>>>>,
    log: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
}

impl MockClient {
    async fn push(&self, resp: http::Response<Vec<u8>>) {
        self.queue.lock().await.push_back(resp);
    }

    async fn requests(&self) -> usize {
        self.log.lock().await.len()
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl core::future::Future<
        Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>,
    > + Send {
        let log = self.log.clone();
        let queue = self.queue.clone();
        async move {
            log.lock().await.push(request);
            Ok(queue.lock().await.pop_front().expect("no queued response"))
        }
    }
}

fn json_response(status: StatusCode, body: &str) -> http::Response<Vec<u8>> {
    http::Response::builder()
        .status(status)
        .body(body.as_bytes().to_vec())
        .unwrap()
}

type Widget = ConsentWidget<OEmbedClient<MockClient>>;

async fn widget_on(page: &Arc<Page>, http: &MockClient, reference: SourceReference) -> Widget {
    ConsentWidget::new(
        page.clone(),
        ResolvedConfig::default(),
        reference,
        OEmbedClient::new(http.clone()),
    )
    .await
    .unwrap()
}

async fn widget(http: &MockClient, url: &str) -> Widget {
    let page = Arc::new(Page::default());
    widget_on(&page, http, SourceReference::new().url(url).build()).await
}

fn assert_exclusive(w: &Widget) {
    assert_ne!(w.notice_visible(), w.slot_visible());
}

#[tokio::test]
async fn twitter_script_shared_and_rendered_on_load() {
    let page = Arc::new(Page::default());
    let http = MockClient::default();
    let reference = SourceReference::new()
        .url("https://twitter.com/user/status/123")
        .build();
    let mut a = widget_on(&page, &http, reference.clone()).await;
    let mut b = widget_on(&page, &http, reference.clone()).await;

    assert_eq!(a.provider(), ProviderTag::Twitter);
    assert!(a.toggle_label().ends_with("Twitter"));
    // Only the stylesheet before consent.
    assert_eq!(page.head().await.len(), 1);

    a.set_consent(true).await;
    b.set_consent(true).await;
    let head = page.head().await;
    let scripts: Vec<_> = head
        .iter()
        .filter(|el| el.attr("id") == Some(twitter::SCRIPT_ID))
        .collect();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].attr("src"), Some(twitter::WIDGETS_SCRIPT_SRC));
    assert_eq!(a.session().unwrap().content_id(), Some("123"));
    assert!(a.session().unwrap().is_pending());

    b.set_consent(false).await;
    assert!(page.mark_script_loaded(twitter::SCRIPT_ID).await);

    assert_eq!(a.apply_script_readiness(), Some(ScriptStatus::Loaded));
    let citation = a.slot().find_all(|el| el.has_class(twitter::TWEET_CLASS));
    assert_eq!(citation.len(), 1);
    assert_eq!(citation[0].attr(twitter::RENDERED_ATTR), Some("true"));
    assert!(a.session().unwrap().is_rendered());

    // The collapsed widget has nothing left to render into.
    assert_eq!(b.apply_script_readiness(), None);
    assert!(b.slot().children().is_empty());
    assert_eq!(b.state(), ConsentState::Collapsed);

    // A widget expanded after the script loaded renders right away.
    let mut c = widget_on(&page, &http, reference).await;
    c.set_consent(true).await;
    assert!(c.session().unwrap().is_rendered());
    assert_eq!(http.requests().await, 0);
}

#[tokio::test]
async fn twitter_script_failure_keeps_citation() {
    let http = MockClient::default();
    let mut w = widget(&http, "https://twitter.com/user/status/9").await;
    w.set_consent(true).await;

    let waited = tokio::time::timeout(Duration::from_millis(20), w.wait_for_scripts()).await;
    assert!(waited.is_err());

    let page = w.page().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        page.mark_script_failed(twitter::SCRIPT_ID).await;
    });
    assert_eq!(w.wait_for_scripts().await, Some(ScriptStatus::Failed));

    assert_eq!(w.state(), ConsentState::Expanded);
    assert!(matches!(w.last_error(), Some(EmbedError::ScriptLoadIncomplete(id)) if id == twitter::SCRIPT_ID));
    let citation = w.slot().find_all(|el| el.has_class(twitter::TWEET_CLASS));
    assert_eq!(citation.len(), 1);
    assert_eq!(citation[0].attr(twitter::RENDERED_ATTR), None);
    assert!(!w.session().unwrap().is_pending());
}

#[tokio::test]
async fn youtube_height_from_aspect_ratio() {
    let http = MockClient::default();
    http.push(json_response(
        StatusCode::OK,
        r#"{"type":"video","width":480,"height":270}"#,
    ))
    .await;
    let page = Arc::new(Page::default());
    let reference = SourceReference::from_attributes([
        ("src", "https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        ("yt-width", "520px"),
    ])
    .unwrap();
    let mut w = widget_on(&page, &http, reference).await;
    assert_eq!(http.requests().await, 0);

    w.set_consent(true).await;
    assert_eq!(http.requests().await, 1);
    let frames = w.slot().find_by_tag("iframe");
    let frame = frames[0];
    assert_eq!(frame.attr("width"), Some("520px"));
    assert_eq!(frame.attr("height"), Some("292.5px"));
    assert_eq!(frame.attr("src"), Some("https://www.youtube.com/embed/dQw4w9WgXcQ"));
    assert_eq!(w.session().unwrap().dimensions().unwrap().height, "292.5px");
}

#[tokio::test]
async fn youtube_defaults_without_overrides_skip_fetch() {
    let http = MockClient::default();
    let mut w = widget(&http, "https://youtu.be/abc123XYZ_-").await;
    w.set_consent(true).await;

    assert_eq!(http.requests().await, 0);
    let frames = w.slot().find_by_tag("iframe");
    let frame = frames[0];
    assert_eq!(frame.attr("width"), Some("640px"));
    assert_eq!(frame.attr("height"), Some("390px"));
    assert_eq!(w.session().unwrap().content_id(), Some("abc123XYZ_-"));
}

#[tokio::test]
async fn youtube_failed_fetch_keeps_override() {
    let http = MockClient::default();
    http.push(json_response(StatusCode::INTERNAL_SERVER_ERROR, "oops"))
        .await;
    let page = Arc::new(Page::default());
    let reference = SourceReference::new()
        .url("https://youtu.be/abc")
        .height_override("300px")
        .build();
    let mut w = widget_on(&page, &http, reference).await;
    assert_eq!(w.set_consent(true).await, ConsentState::Expanded);

    let frames = w.slot().find_by_tag("iframe");
    let frame = frames[0];
    assert_eq!(frame.attr("width"), Some("640px"));
    assert_eq!(frame.attr("height"), Some("300px"));
    assert!(w.last_error().is_none());
}

/// Metadata source whose lookups never complete.
struct Stalled;

impl AspectRatioSource for Stalled {
    async fn aspect_ratio(&self, _video_id: &str) -> Result<f64, OEmbedError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn abandoned_toggle_leaves_widget_collapsed() {
    let page = Arc::new(Page::default());
    let reference = SourceReference::new()
        .url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .width_override("520px")
        .build();
    let mut w = ConsentWidget::new(page, ResolvedConfig::default(), reference, Stalled)
        .await
        .unwrap();

    let toggled = tokio::time::timeout(Duration::from_millis(20), w.set_consent(true)).await;
    assert!(toggled.is_err());

    assert_eq!(w.state(), ConsentState::Collapsed);
    assert!(w.slot().children().is_empty());
    assert!(w.notice_visible());
    assert!(!w.slot_visible());
    assert!(w.session().is_none());
    assert!(w.last_error().is_none());
    assert_eq!(w.toggle_label(), "Show external content from YouTube");
}

#[tokio::test]
async fn invalid_reference_keeps_notice() {
    let http = MockClient::default();
    let mut w = widget(&http, "https://www.youtube.com/").await;

    assert_eq!(w.set_consent(true).await, ConsentState::Collapsed);
    assert!(matches!(
        w.last_error(),
        Some(EmbedError::InvalidReference { provider: ProviderTag::YouTube, .. })
    ));
    assert!(w.notice_visible());
    assert!(!w.slot_visible());
    assert!(w.slot().children().is_empty());
    assert!(w.session().is_none());
    assert!(!w.to_html().contains("checked"));
    assert_eq!(http.requests().await, 0);
}

#[tokio::test]
async fn vimeo_without_numeric_id_is_rejected() {
    let http = MockClient::default();
    let mut w = widget(&http, "https://vimeo.com/channels/staffpicks/").await;
    assert_eq!(w.set_consent(true).await, ConsentState::Collapsed);
    assert!(matches!(w.last_error(), Some(EmbedError::InvalidReference { .. })));
}

#[tokio::test]
async fn vimeo_wrapper_and_script() {
    let http = MockClient::default();
    let mut w = widget(&http, "https://vimeo.com/76979871").await;
    w.set_consent(true).await;

    let wrappers = w.slot().find_by_tag("div");
    assert_eq!(wrappers.len(), 1);
    assert_eq!(wrappers[0].attr("style"), Some("padding:56.25% 0 0 0;position:relative;"));
    assert_eq!(wrappers[0].find_by_tag("iframe").len(), 1);
    assert_eq!(wrappers[0].find_by_tag("script").len(), 1);
    assert_eq!(w.session().unwrap().content_id(), Some("76979871"));
}

#[tokio::test]
async fn mastodon_explicit_type() {
    let http = MockClient::default();
    let page = Arc::new(Page::default());
    let reference = SourceReference::new()
        .url("https://example.social/@user/42/")
        .explicit_type("Mastodon")
        .build();
    let mut w = widget_on(&page, &http, reference).await;
    w.set_consent(true).await;

    let frames = w.slot().find_by_tag("iframe");
    let frame = frames[0];
    assert_eq!(frame.attr("src"), Some("https://example.social/@user/42/embed"));
    assert_eq!(w.slot().find_by_tag("script")[0].attr("async"), Some(""));
    assert_eq!(w.session().unwrap().content_id(), Some("42"));
}

#[tokio::test]
async fn padded_src_frames_clean_url() {
    let http = MockClient::default();
    let page = Arc::new(Page::default());
    let reference =
        SourceReference::from_attributes([("src", "https://x.social/@a/1/ "), ("type", "mastodon")])
            .unwrap();
    let mut w = widget_on(&page, &http, reference).await;
    w.set_consent(true).await;

    let frames = w.slot().find_by_tag("iframe");
    assert_eq!(frames[0].attr("src"), Some("https://x.social/@a/1/embed"));
    assert_eq!(w.session().unwrap().content_id(), Some("1"));
}

#[tokio::test]
async fn on_off_on_yields_one_embed() {
    let http = MockClient::default();
    let page = Arc::new(Page::default());
    let reference = SourceReference::new()
        .url("https://youtu.be/abc")
        .width_override("320px")
        .height_override("180px")
        .build();
    let mut w = widget_on(&page, &http, reference).await;
    assert_exclusive(&w);

    for expected in [
        ConsentState::Expanded,
        ConsentState::Collapsed,
        ConsentState::Expanded,
    ] {
        assert_eq!(w.toggle().await, expected);
        assert_exclusive(&w);
        assert_eq!(w.session().is_some(), expected == ConsentState::Expanded);
    }

    assert_eq!(w.slot().children().len(), 1);
    assert_eq!(w.slot().find_by_tag("iframe").len(), 1);
    assert_eq!(w.session().unwrap().epoch(), 2);
    assert_eq!(http.requests().await, 0);
    assert!(w.to_html().contains("checked"));
}

#[tokio::test]
async fn unknown_type_fails_construction() {
    let page = Arc::new(Page::default());
    let reference = SourceReference::new()
        .url("https://example.com/post/1")
        .explicit_type("myspace")
        .build();
    let result = ConsentWidget::new(
        page.clone(),
        ResolvedConfig::default(),
        reference,
        OEmbedClient::new(MockClient::default()),
    )
    .await;
    assert!(matches!(result, Err(EmbedError::UnknownProviderType(t)) if t == "myspace"));
    assert!(page.head().await.is_empty());
}

#[tokio::test]
async fn stylesheet_injected_once_per_page() {
    let http = MockClient::default();
    let page = Arc::new(Page::default());
    for url in ["https://vimeo.com/1", "https://youtu.be/abc", "https://example.social/@a/2"] {
        widget_on(&page, &http, SourceReference::new().url(url).build()).await;
    }
    let head = page.head().await;
    assert_eq!(head.len(), 1);
    assert_eq!(head[0].tag(), "style");
}
