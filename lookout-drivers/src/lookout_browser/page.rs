use crate::lookout_browser::scripts;
use anyhow::{anyhow, Context, Result};
use fantoccini::Client;
use lookout_config::BrowserSettings;
use lookout_dom::{snapshot::PageSnapshot, Document};
use lookout_perception::Marker;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

const READY_POLL: Duration = Duration::from_millis(100);

/// A browser tab as seen by the perception engines: snapshots go out,
/// markers and removals come back in.
#[derive(Clone)]
pub struct LivePage {
    pub(crate) client: Client,
    page_load_timeout: Duration,
}

impl LivePage {
    pub fn new(client: Client, settings: &BrowserSettings) -> Self {
        Self {
            client,
            page_load_timeout: Duration::from_secs(settings.page_load_timeout_secs),
        }
    }

    /// Navigate to `url` and wait until `document.readyState` is `complete`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigating to {url}"))?;

        tokio::time::timeout(self.page_load_timeout, self.wait_until_complete())
            .await
            .map_err(|_| anyhow!("page {url} did not finish loading within {:?}", self.page_load_timeout))??;

        info!(target: "lookout.driver", %url, "driver.page.loaded");
        Ok(())
    }

    async fn wait_until_complete(&self) -> Result<()> {
        loop {
            let state = self.client.execute(scripts::READY_STATE, vec![]).await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            tokio::time::sleep(READY_POLL).await;
        }
    }

    pub async fn title(&self) -> Result<String> {
        self.client.title().await.map_err(anyhow::Error::msg)
    }

    pub async fn url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::msg)
    }

    /// Capture the page's render tree as raw JSON.
    pub async fn snapshot_json(&self) -> Result<String> {
        let value = self.client.execute(scripts::SNAPSHOT, vec![]).await?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("snapshot script returned {value}"))
    }

    /// Capture the page and build a [`Document`] from it. Handles in the
    /// document refer back to live elements until the next snapshot.
    pub async fn snapshot(&self) -> Result<Document> {
        let raw = self.snapshot_json().await?;
        let snapshot = PageSnapshot::from_json(&raw).context("decoding page snapshot")?;
        let doc = Document::from_snapshot(&snapshot);
        debug!(
            target: "lookout.driver",
            url = %snapshot.url,
            elements = snapshot.element_count(),
            bytes = raw.len(),
            "driver.snapshot"
        );
        Ok(doc)
    }

    /// Draw numbered overlays, replacing any previous set.
    pub async fn draw_markers(&self, markers: &[Marker]) -> Result<()> {
        let arg = serde_json::to_value(markers)?;
        self.client.execute(scripts::DRAW_MARKERS, vec![arg]).await?;
        debug!(target: "lookout.driver", count = markers.len(), "driver.markers.drawn");
        Ok(())
    }

    /// Remove the overlay container. Returns whether one was present.
    pub async fn clear_markers(&self) -> Result<bool> {
        let value = self.client.execute(scripts::CLEAR_MARKERS, vec![]).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Detach the elements behind the given snapshot handles.
    pub async fn remove_nodes(&self, handles: &[u32]) -> Result<usize> {
        if handles.is_empty() {
            return Ok(0);
        }
        let value = self
            .client
            .execute(scripts::REMOVE_NODES, vec![json!(handles)])
            .await?;
        Ok(as_count(&value))
    }

    pub async fn enable_scroll(&self) -> Result<()> {
        self.client.execute(scripts::ENABLE_SCROLL, vec![]).await?;
        Ok(())
    }

    pub async fn install_mutation_probe(&self) -> Result<()> {
        self.client
            .execute(scripts::INSTALL_MUTATION_PROBE, vec![])
            .await?;
        Ok(())
    }

    /// Current mutation counter, `None` if the probe is gone.
    pub async fn mutation_epoch(&self) -> Result<Option<u64>> {
        let value = self.client.execute(scripts::MUTATION_EPOCH, vec![]).await?;
        Ok(value.as_i64().and_then(|n| u64::try_from(n).ok()))
    }

    /// PNG screenshot of the viewport.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.client.screenshot().await.map_err(anyhow::Error::msg)
    }
}

fn as_count(value: &Value) -> usize {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}
