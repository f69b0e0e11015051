use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lookout_common::{LookoutError, OutputFormat};
use lookout_config::LookoutConfig;
use lookout_dom::{Document, snapshot::PageSnapshot};
use lookout_drivers::{LivePage, LookoutDriver, replay_suppression};
use lookout_perception::{AnnoyanceSuppressor, ContentExtractor, ScanResult, SomBuilder};
use lookout_runtime::{LookoutHandle, SuppressionLoop, WatchStats};
use serde_json::json;
use tracing::{info, warn};

use crate::cli::{Cli, Commands, OfflineAction};
use crate::output;

pub(crate) async fn run(cli: Cli, cfg: LookoutConfig, handle: LookoutHandle) -> Result<()> {
    let format = cli.format;
    match cli.command {
        Commands::Offline { action } => offline(action, &cfg, format),
        Commands::Scan {
            url,
            screenshot,
            no_suppress,
        } => {
            let (driver, page) = open(&cfg, &url).await?;
            let result = scan(&cfg, &page, screenshot.as_deref(), !no_suppress).await;
            close(driver).await;
            output::print(&result?, format)
        }
        Commands::Content { url } => {
            let (driver, page) = open(&cfg, &url).await?;
            let record = match page.snapshot().await {
                Ok(doc) => Ok(ContentExtractor::new(&cfg.content).extract(&doc)),
                Err(err) => Err(err),
            };
            close(driver).await;
            output::print(&record?, format)
        }
        Commands::Watch { url, seconds } => {
            let (driver, page) = open(&cfg, &url).await?;
            let stats = watch(&cfg, page, seconds, &handle).await;
            close(driver).await;
            let stats = stats?;
            output::print(
                &json!({
                    "url": url,
                    "passes": stats.passes,
                    "removed": stats.removed,
                    "probeReinstalls": stats.probe_reinstalls,
                }),
                format,
            )
        }
        Commands::Snapshot { url, out } => {
            let (driver, page) = open(&cfg, &url).await?;
            let raw = page.snapshot_json().await;
            close(driver).await;
            let raw = raw?;
            let snapshot = PageSnapshot::from_json(&raw).map_err(LookoutError::from)?;
            tokio::fs::write(&out, &raw)
                .await
                .with_context(|| format!("writing snapshot to {}", out.display()))?;
            output::print(
                &json!({
                    "url": snapshot.url,
                    "out": out.display().to_string(),
                    "elements": snapshot.element_count(),
                }),
                format,
            )
        }
    }
}

async fn open(cfg: &LookoutConfig, url: &str) -> Result<(LookoutDriver, LivePage)> {
    let driver = LookoutDriver::connect(&cfg.browser).await?;
    match driver.goto(url).await {
        Ok(page) => Ok((driver, page)),
        Err(err) => {
            close(driver).await;
            Err(err)
        }
    }
}

async fn close(driver: LookoutDriver) {
    if let Err(err) = driver.close().await {
        warn!(target: "lookout.app", error = %err, "app.driver.close_failed");
    }
}

async fn scan(
    cfg: &LookoutConfig,
    page: &LivePage,
    screenshot: Option<&Path>,
    suppress: bool,
) -> Result<ScanResult> {
    if suppress && cfg.suppression.enabled {
        let mut doc = page.snapshot().await?;
        let report = AnnoyanceSuppressor::new(&cfg.suppression).attach(&mut doc);
        let removed = replay_suppression(page, &report).await?;
        info!(target: "lookout.app", removed, "app.scan.suppressed");
    }

    let mut doc = page.snapshot().await?;
    let result = SomBuilder::new(&cfg.scan).scan(&mut doc);

    if cfg.scan.draw_markers {
        page.draw_markers(&result.markers).await?;
    }
    if let Some(path) = screenshot {
        let path = screenshot_path(path);
        let png = page.screenshot().await?;
        tokio::fs::write(&path, png)
            .await
            .with_context(|| format!("writing screenshot to {}", path.display()))?;
        info!(target: "lookout.app", path = %path.display(), "app.scan.screenshot");
    }
    if cfg.scan.draw_markers {
        page.clear_markers().await?;
    }
    Ok(result)
}

/// A directory gets a timestamped file name inside it.
fn screenshot_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        path.join(format!("lookout-{stamp}.png"))
    } else {
        path.to_path_buf()
    }
}

async fn watch(
    cfg: &LookoutConfig,
    page: LivePage,
    seconds: Option<u64>,
    handle: &LookoutHandle,
) -> Result<WatchStats> {
    let cancel = handle.cancellation().child_token();
    let watcher = SuppressionLoop::new(
        Arc::new(page),
        AnnoyanceSuppressor::new(&cfg.suppression),
        &cfg.suppression,
        cancel.clone(),
    );
    let mut task = handle.spawn(watcher.run());

    let deadline = async {
        match seconds {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        joined = &mut task => return joined?,
        _ = tokio::signal::ctrl_c() => info!(target: "lookout.app", "app.watch.interrupted"),
        _ = deadline => info!(target: "lookout.app", "app.watch.deadline"),
    }
    cancel.cancel();
    task.await?
}

fn offline(action: OfflineAction, cfg: &LookoutConfig, format: OutputFormat) -> Result<()> {
    match action {
        OfflineAction::Scan { file } => {
            let mut doc = load_snapshot(&file)?;
            let result = SomBuilder::new(&cfg.scan).scan(&mut doc);
            output::print(&result, format)
        }
        OfflineAction::Content { file } => {
            let doc = load_snapshot(&file)?;
            output::print(&ContentExtractor::new(&cfg.content).extract(&doc), format)
        }
        OfflineAction::Suppress { file } => {
            let mut doc = load_snapshot(&file)?;
            let report = AnnoyanceSuppressor::new(&cfg.suppression).attach(&mut doc);
            output::print(&report, format)
        }
    }
}

pub(crate) fn load_snapshot(path: &Path) -> Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot = PageSnapshot::from_json(&raw).map_err(LookoutError::from)?;
    Ok(Document::from_snapshot(&snapshot))
}
