use anyhow::Result;
use clap::Parser;
use lookout_common::observability::{LogConfig, init_logging};
use lookout_config::{LookoutConfig, LookoutConfigLoader};
use lookout_runtime::LookoutRuntime;
use std::time::Duration;

mod cli;
mod commands;
mod output;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // env wins over the file
    let cfg: LookoutConfig = LookoutConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    let log_path = init_logging(LogConfig {
        app_name: "lookout",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::debug!(target: "lookout.app", log = %log_path.display(), "app.start");

    let runtime = LookoutRuntime::build("lookout-worker", None)?;
    let handle = runtime.handle();
    let result = runtime.block_on(commands::run(cli, cfg, handle));
    runtime.shutdown(Duration::from_secs(2));
    result
}
