// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::channel_phase_gate::ChannelPhaseGate;
use crate::tokio_runtime::TokioRuntime;
use map_reduce_core::config::Config;
use map_reduce_core::executor::{Executor, RunReport};
use map_reduce_core::log_sink::LogSink;
use map_reduce_core::Result;
use map_reduce_word_count::merger::GlobalResult;
use map_reduce_word_count::WordCountJob;
use std::sync::Arc;

/// Word count driven by tokio tasks synchronized through channel gates
pub type WordCountExecutor = Executor<WordCountJob, ChannelPhaseGate, TokioRuntime>;

/// Run a full word count: distribute, map, reduce, merge.
/// The configuration is validated before any file is touched.
pub async fn run_word_count(
    config: Config,
    log: Arc<dyn LogSink>,
) -> Result<RunReport<GlobalResult>> {
    config.validate()?;

    let job = Arc::new(WordCountJob::new(config));
    let executor = WordCountExecutor::new(job, Arc::clone(&log));
    let report = executor.run().await?;

    for summary in [&report.map, &report.reduce] {
        if !summary.all_completed() {
            log.warning(&format!(
                "{} phase finished with failed workers: {:?}",
                summary.phase, summary.failed
            ));
        }
    }
    Ok(report)
}
