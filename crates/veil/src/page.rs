//! Page-global resources shared by every widget on a page.
//!
//! Two things live here rather than on a widget: the `<head>` nodes
//! (stylesheet, provider scripts) and the registry of provider scripts with
//! their load status. Scripts are keyed by element id and inserted at most
//! once per page.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

use smol_str::SmolStr;
use tokio::sync::{Mutex, watch};
use veil_common::dom::Element;

/// Load status of a page-level provider script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// Inserted, not yet loaded
    Pending,
    /// Loaded and ready to render
    Loaded,
    /// Failed to load; will not be retried
    Failed,
}

/// A page-level `<script>` to insert once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    /// Element id used for deduplication
    pub id: SmolStr,
    /// Script URL
    pub src: String,
    /// Whether to load asynchronously
    pub is_async: bool,
}

impl ScriptSpec {
    /// The `<script>` element for this spec
    pub fn element(&self) -> Element {
        let mut el = Element::new("script")
            .with_attr("id", self.id.as_str())
            .with_attr("src", self.src.as_str());
        if self.is_async {
            el.set_attr("async", "");
        }
        el
    }
}

/// Result of [`Page::ensure_script`]
#[derive(Debug)]
pub struct ScriptHandle {
    /// Whether this call inserted the script
    pub inserted: bool,
    /// Load status updates
    pub ready: watch::Receiver<ScriptStatus>,
}

/// Headless stand-in for the host document.
///
/// Share one `Page` (behind an `Arc`) between all widgets of a document.
#[derive(Debug, Default)]
pub struct Page {
    head: Mutex<Vec<Element>>,
    scripts: Mutex<HashMap<SmolStr, watch::Sender<ScriptStatus>>>,
    pub(crate) styles_injected: AtomicBool,
}

impl Page {
    /// Insert `spec` into the head unless a script with the same id exists.
    ///
    /// Either way the returned handle observes that script's load status.
    pub async fn ensure_script(&self, spec: &ScriptSpec) -> ScriptHandle {
        let mut scripts = self.scripts.lock().await;
        if let Some(tx) = scripts.get(&spec.id) {
            return ScriptHandle {
                inserted: false,
                ready: tx.subscribe(),
            };
        }
        let (tx, rx) = watch::channel(ScriptStatus::Pending);
        scripts.insert(spec.id.clone(), tx);
        self.head.lock().await.push(spec.element());
        #[cfg(feature = "tracing")]
        tracing::debug!(id = %spec.id, src = %spec.src, "provider script inserted");
        ScriptHandle {
            inserted: true,
            ready: rx,
        }
    }

    /// Report a script load outcome. Returns false for unknown ids.
    pub async fn set_script_status(&self, id: &str, status: ScriptStatus) -> bool {
        let scripts = self.scripts.lock().await;
        match scripts.get(id) {
            Some(tx) => {
                tx.send_replace(status);
                true
            }
            None => false,
        }
    }

    /// Report that a script finished loading
    pub async fn mark_script_loaded(&self, id: &str) -> bool {
        self.set_script_status(id, ScriptStatus::Loaded).await
    }

    /// Report that a script failed to load
    pub async fn mark_script_failed(&self, id: &str) -> bool {
        self.set_script_status(id, ScriptStatus::Failed).await
    }

    /// Current status of a script, if it was ever inserted
    pub async fn script_status(&self, id: &str) -> Option<ScriptStatus> {
        self.scripts.lock().await.get(id).map(|tx| *tx.borrow())
    }

    /// Append a node to the head
    pub async fn append_head(&self, element: Element) {
        self.head.lock().await.push(element);
    }

    /// Snapshot of the head nodes
    pub async fn head(&self) -> Vec<Element> {
        self.head.lock().await.clone()
    }

    /// Head nodes serialized to HTML, one per line
    pub async fn head_html(&self) -> String {
        self.head
            .lock()
            .await
            .iter()
            .map(Element::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
