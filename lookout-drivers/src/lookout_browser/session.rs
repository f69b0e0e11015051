use crate::lookout_browser::page::LivePage;
use anyhow::Result;
use async_trait::async_trait;
use lookout_dom::Document;
use lookout_perception::SuppressionReport;

/// Page operations the background suppression loop depends on.
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn snapshot(&self) -> Result<Document>;
    async fn install_mutation_probe(&self) -> Result<()>;
    async fn mutation_epoch(&self) -> Result<Option<u64>>;
    async fn remove_nodes(&self, handles: &[u32]) -> Result<usize>;
    async fn enable_scroll(&self) -> Result<()>;
}

#[async_trait]
impl PageSession for LivePage {
    async fn snapshot(&self) -> Result<Document> {
        LivePage::snapshot(self).await
    }

    async fn install_mutation_probe(&self) -> Result<()> {
        LivePage::install_mutation_probe(self).await
    }

    async fn mutation_epoch(&self) -> Result<Option<u64>> {
        LivePage::mutation_epoch(self).await
    }

    async fn remove_nodes(&self, handles: &[u32]) -> Result<usize> {
        LivePage::remove_nodes(self, handles).await
    }

    async fn enable_scroll(&self) -> Result<()> {
        LivePage::enable_scroll(self).await
    }
}

/// Apply a suppression pass computed on a snapshot back to the live page.
/// Returns the number of elements actually removed.
pub async fn replay_suppression<S>(session: &S, report: &SuppressionReport) -> Result<usize>
where
    S: PageSession + ?Sized,
{
    let removed = session.remove_nodes(&report.handles()).await?;
    if report.scroll_changed {
        session.enable_scroll().await?;
    }
    if removed < report.removed.len() {
        tracing::debug!(
            target: "lookout.driver",
            planned = report.removed.len(),
            removed,
            "driver.replay.partial"
        );
    }
    Ok(removed)
}
