use anyhow::Result;
use async_trait::async_trait;
use lookout_config::SuppressionSettings;
use lookout_dom::{Document, snapshot::PageSnapshot};
use lookout_drivers::PageSession;
use lookout_perception::AnnoyanceSuppressor;
use lookout_runtime::{SuppressionLoop, WatchStats};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct PageState {
    probe: bool,
    epoch: u64,
    overlays: Vec<(u32, Value)>,
    removed: Vec<u32>,
    snapshots: usize,
    probe_installs: usize,
}

/// A scripted page: a body holding one article plus whatever overlays the
/// test injects. Removals bump the epoch like the in-page observer does.
#[derive(Default)]
struct FakePage {
    state: Mutex<PageState>,
}

impl FakePage {
    fn with_overlay(handle: u32, attrs: Value) -> Self {
        let page = Self::default();
        page.state.lock().unwrap().overlays.push((handle, attrs));
        page
    }

    fn inject(&self, handle: u32, attrs: Value) {
        let mut state = self.state.lock().unwrap();
        state.overlays.push((handle, attrs));
        if state.probe {
            state.epoch += 1;
        }
    }

    fn navigate(&self) {
        let mut state = self.state.lock().unwrap();
        state.probe = false;
        state.epoch = 0;
    }

    fn removed(&self) -> Vec<u32> {
        self.state.lock().unwrap().removed.clone()
    }

    fn snapshots(&self) -> usize {
        self.state.lock().unwrap().snapshots
    }

    fn probe_installs(&self) -> usize {
        self.state.lock().unwrap().probe_installs
    }
}

fn block_style() -> Value {
    json!({ "display": "block", "overflow": "auto" })
}

fn overlay_element(handle: u32, attrs: &Value) -> Value {
    json!({
        "kind": "element",
        "handle": handle,
        "tag": "div",
        "attrs": attrs,
        "rect": { "x": 0.0, "y": 600.0, "width": 1280.0, "height": 120.0 },
        "style": { "display": "block", "position": "fixed", "zIndex": 1000 },
        "children": [{ "kind": "text", "text": "We value your privacy" }]
    })
}

#[async_trait]
impl PageSession for FakePage {
    async fn snapshot(&self) -> Result<Document> {
        let mut state = self.state.lock().unwrap();
        state.snapshots += 1;

        let mut body_children = vec![json!({
            "kind": "element",
            "handle": 3,
            "tag": "article",
            "rect": { "x": 0.0, "y": 0.0, "width": 800.0, "height": 400.0 },
            "style": { "display": "block" },
            "children": [{ "kind": "text", "text": "Story" }]
        })];
        body_children.extend(state.overlays.iter().map(|(h, a)| overlay_element(*h, a)));

        let raw = json!({
            "url": "https://news.example/",
            "title": "News",
            "viewport": { "width": 1280.0, "height": 720.0 },
            "children": [{
                "kind": "element",
                "handle": 1,
                "tag": "html",
                "rect": { "x": 0.0, "y": 0.0, "width": 1280.0, "height": 720.0 },
                "style": block_style(),
                "children": [{
                    "kind": "element",
                    "handle": 2,
                    "tag": "body",
                    "rect": { "x": 0.0, "y": 0.0, "width": 1280.0, "height": 720.0 },
                    "style": block_style(),
                    "children": body_children
                }]
            }]
        });
        let snapshot = PageSnapshot::from_json(&raw.to_string())?;
        Ok(Document::from_snapshot(&snapshot))
    }

    async fn install_mutation_probe(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.probe = true;
        state.probe_installs += 1;
        Ok(())
    }

    async fn mutation_epoch(&self) -> Result<Option<u64>> {
        let state = self.state.lock().unwrap();
        Ok(state.probe.then_some(state.epoch))
    }

    async fn remove_nodes(&self, handles: &[u32]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.overlays.len();
        state.overlays.retain(|(h, _)| !handles.contains(h));
        let removed = before - state.overlays.len();
        state.removed.extend_from_slice(handles);
        if removed > 0 && state.probe {
            state.epoch += 1;
        }
        Ok(removed)
    }

    async fn enable_scroll(&self) -> Result<()> {
        Ok(())
    }
}

fn settings() -> SuppressionSettings {
    SuppressionSettings {
        poll_interval_ms: 100,
        debounce_ms: 50,
        ..SuppressionSettings::default()
    }
}

fn start(page: &Arc<FakePage>) -> (CancellationToken, tokio::task::JoinHandle<Result<WatchStats>>) {
    let settings = settings();
    let cancel = CancellationToken::new();
    let handle = SuppressionLoop::spawn(
        page.clone(),
        AnnoyanceSuppressor::new(&settings),
        &settings,
        cancel.clone(),
    );
    (cancel, handle)
}

#[tokio::test(start_paused = true)]
async fn initial_pass_removes_banner() {
    let page = Arc::new(FakePage::with_overlay(10, json!([["id", "cookie-banner"]])));
    let (cancel, handle) = start(&page);

    tokio::time::sleep(Duration::from_secs(2)).await;
    cancel.cancel();
    let stats = handle.await.unwrap().unwrap();

    assert_eq!(page.removed(), vec![10]);
    assert_eq!(stats.removed, 1);
    // the removal lands before the epoch baseline is read
    assert_eq!(stats.passes, 1);
    assert_eq!(page.snapshots(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_injected_modal_is_removed() {
    let page = Arc::new(FakePage::default());
    let (cancel, handle) = start(&page);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(page.removed().is_empty());
    page.inject(20, json!([["class", "newsletter-modal"]]));

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    let stats = handle.await.unwrap().unwrap();

    assert_eq!(page.removed(), vec![20]);
    assert_eq!(stats.removed, 1);
}

#[tokio::test(start_paused = true)]
async fn quiet_page_is_not_resnapshotted() {
    let page = Arc::new(FakePage::default());
    let (cancel, handle) = start(&page);

    tokio::time::sleep(Duration::from_secs(3)).await;
    cancel.cancel();
    let stats = handle.await.unwrap().unwrap();

    assert_eq!(page.snapshots(), 1);
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.removed, 0);
}

#[tokio::test(start_paused = true)]
async fn lost_probe_is_reinstalled_and_page_rescanned() {
    let page = Arc::new(FakePage::default());
    let (cancel, handle) = start(&page);

    tokio::time::sleep(Duration::from_millis(500)).await;
    page.navigate();
    page.inject(30, json!([["role", "dialog"], ["id", "promo"]]));

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    let stats = handle.await.unwrap().unwrap();

    assert_eq!(page.probe_installs(), 2);
    assert_eq!(stats.probe_reinstalls, 1);
    assert_eq!(page.removed(), vec![30]);
}

#[tokio::test(start_paused = true)]
async fn cancellation_ends_the_loop() {
    let page = Arc::new(FakePage::default());
    let (cancel, handle) = start(&page);
    cancel.cancel();

    let stats = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("loop stops")
        .unwrap()
        .unwrap();
    assert!(stats.passes <= 1);
}
