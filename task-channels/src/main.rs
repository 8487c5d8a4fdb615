// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use anyhow::{Context, Result};
use clap::Parser;
use map_reduce_core::log_sink::{LogSink, Logger};
use map_reduce_task_channels::cli::Args;
use map_reduce_task_channels::run_word_count;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let logger = Logger::with_log_file(&args.log_file)
        .with_context(|| format!("failed to open log file {}", args.log_file.display()))?;
    let log: Arc<dyn LogSink> = Arc::new(logger);
    log.info("Starting MapReduce program");

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            log.error(&format!("Invalid configuration: {}", e));
            return Err(e).context("invalid configuration");
        }
    };
    config.print_summary(log.as_ref());

    let start_time = Instant::now();
    let report = run_word_count(config, Arc::clone(&log))
        .await
        .context("MapReduce run failed")?;

    log.info(&format!(
        "MapReduce process completed in {:.6} seconds ({} distinct words)",
        start_time.elapsed().as_secs_f64(),
        report.output.len()
    ));

    Ok(())
}
