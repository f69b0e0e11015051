//! Continuous annoyance suppression against a live page.
//!
//! The page reports child-list mutations through an in-page counter (the
//! mutation epoch). The loop polls it; when it moves, the loop waits for
//! the counter to stay still for the debounce period, takes a fresh
//! snapshot and runs one full pass. Passes that find nothing never write to
//! the page, so the notifications our own removals cause die out after one
//! extra pass.

use anyhow::{Context, Result};
use lookout_config::SuppressionSettings;
use lookout_drivers::{replay_suppression, PageSession};
use lookout_perception::AnnoyanceSuppressor;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    pub passes: u64,
    pub removed: usize,
    pub probe_reinstalls: u64,
}

pub struct SuppressionLoop<S: ?Sized> {
    session: Arc<S>,
    suppressor: AnnoyanceSuppressor,
    poll_interval: Duration,
    debounce: Duration,
    max_debounce_rounds: usize,
    cancel: CancellationToken,
    stats: WatchStats,
}

impl<S> SuppressionLoop<S>
where
    S: PageSession + ?Sized + 'static,
{
    pub fn new(
        session: Arc<S>,
        suppressor: AnnoyanceSuppressor,
        settings: &SuppressionSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            suppressor,
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            debounce: Duration::from_millis(settings.debounce_ms),
            max_debounce_rounds: settings.max_passes.max(1),
            cancel,
            stats: WatchStats::default(),
        }
    }

    /// Run the loop on the current Tokio runtime until `cancel` fires.
    pub fn spawn(
        session: Arc<S>,
        suppressor: AnnoyanceSuppressor,
        settings: &SuppressionSettings,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<WatchStats>> {
        let this = Self::new(session, suppressor, settings, cancel);
        tokio::spawn(this.run())
    }

    pub async fn run(mut self) -> Result<WatchStats> {
        self.session
            .install_mutation_probe()
            .await
            .context("installing mutation probe")?;

        let mut doc = self.session.snapshot().await.context("initial snapshot")?;
        let report = self.suppressor.attach(&mut doc);
        self.stats.passes += 1;
        self.stats.removed += replay_suppression(self.session.as_ref(), &report).await?;
        tracing::info!(
            target: "lookout.watch",
            removed = self.stats.removed,
            rules = self.suppressor.rule_count(),
            "watch.started"
        );

        let mut seen = self.session.mutation_epoch().await?;
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let epoch = match self.session.mutation_epoch().await {
                Ok(epoch) => epoch,
                Err(err) => {
                    tracing::warn!(target: "lookout.watch", error = %err, "watch.poll.failed");
                    continue;
                }
            };

            match epoch {
                Some(_) if epoch == seen => continue,
                Some(_) => {}
                None => {
                    // A navigation replaced the window and took the probe with it.
                    self.stats.probe_reinstalls += 1;
                    tracing::info!(target: "lookout.watch", "watch.probe.reinstall");
                    if let Err(err) = self.session.install_mutation_probe().await {
                        tracing::warn!(target: "lookout.watch", error = %err, "watch.probe.failed");
                        continue;
                    }
                }
            }

            match self.debounce(epoch).await {
                Some(settled) => seen = settled,
                None => break,
            }

            if let Err(err) = self.pass().await {
                tracing::warn!(target: "lookout.watch", error = %err, "watch.pass.failed");
            }
        }

        tracing::info!(
            target: "lookout.watch",
            passes = self.stats.passes,
            removed = self.stats.removed,
            "watch.stopped"
        );
        Ok(self.stats)
    }

    /// Wait until the epoch holds still for one debounce period. Returns the
    /// settled epoch, or `None` when cancelled.
    async fn debounce(&self, mut current: Option<u64>) -> Option<Option<u64>> {
        for _ in 0..self.max_debounce_rounds {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.debounce) => {}
            }
            let next = self.session.mutation_epoch().await.ok().flatten();
            if next == current {
                return Some(current);
            }
            current = next;
        }
        tracing::debug!(target: "lookout.watch", "watch.debounce.cap");
        Some(current)
    }

    async fn pass(&mut self) -> Result<()> {
        let mut doc = self.session.snapshot().await?;
        let report = self.suppressor.run_pass(&mut doc);
        self.stats.passes += 1;
        if report.is_empty() {
            tracing::debug!(target: "lookout.watch", "watch.pass.clean");
            return Ok(());
        }
        let removed = replay_suppression(self.session.as_ref(), &report).await?;
        self.stats.removed += removed;
        tracing::info!(
            target: "lookout.watch",
            removed,
            planned = report.removed.len(),
            scroll_changed = report.scroll_changed,
            "watch.pass"
        );
        Ok(())
    }
}
