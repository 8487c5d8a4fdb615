// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
pub mod chunker;
pub mod layout;
pub mod mapper;
pub mod merger;
pub mod record;
pub mod reducer;
pub mod text;

use crate::chunker::{distribute_work, read_file_metadata, ChunkAssignment};
use crate::layout::is_intermediate_file;
use crate::merger::{merge_partitions, GlobalResult};
use map_reduce_core::config::Config;
use map_reduce_core::log_sink::LogSink;
use map_reduce_core::map_reduce_job::MapReduceJob;
use map_reduce_core::{MapReduceError, Result};
use std::fs;

/// Word count over every regular file of an input directory
pub struct WordCountJob {
    config: Config,
}

impl WordCountJob {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn remove_stale_intermediates(&self, log: &dyn LogSink) -> Result<()> {
        let output_dir = &self.config.output_dir;
        let entries = fs::read_dir(output_dir).map_err(|e| MapReduceError::io(output_dir, e))?;

        for entry in entries.flatten() {
            let name = entry.file_name();
            if !is_intermediate_file(&name.to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            fs::remove_file(&path).map_err(|e| MapReduceError::io(&path, e))?;
            log.debug(&format!("Removed stale intermediate file {}", path.display()));
        }
        Ok(())
    }
}

impl MapReduceJob for WordCountJob {
    type MapAssignment = Vec<ChunkAssignment>;
    type ReduceAssignment = Vec<usize>;
    type Output = GlobalResult;

    fn prepare(&self, log: &dyn LogSink) -> Result<()> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| MapReduceError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;
        self.remove_stale_intermediates(log)
    }

    fn create_map_assignments(&self, log: &dyn LogSink) -> Result<Vec<Vec<ChunkAssignment>>> {
        let files = read_file_metadata(&self.config.input_dir, log)?;
        log.info(&format!(
            "Read file metadata for input directory: {} ({} files)",
            self.config.input_dir.display(),
            files.len()
        ));

        let distribution = distribute_work(
            &files,
            self.config.num_workers,
            self.config.chunk_size,
            log,
        );
        distribution.log_workload(log);
        Ok(distribution.assignments)
    }

    fn create_reduce_assignments(&self) -> Vec<Vec<usize>> {
        (0..self.config.num_workers)
            .map(|worker_id| self.config.reduce_tasks_for(worker_id).to_vec())
            .collect()
    }

    fn map_work(&self, worker_id: usize, chunks: &Vec<ChunkAssignment>, log: &dyn LogSink) {
        mapper::map_chunks(
            worker_id,
            chunks,
            &self.config.output_dir,
            self.config.num_partitions,
            log,
        );
    }

    fn reduce_work(&self, worker_id: usize, partitions: &Vec<usize>, log: &dyn LogSink) {
        reducer::reduce_partitions(
            worker_id,
            partitions,
            self.config.num_workers,
            &self.config.output_dir,
            log,
        );
    }

    fn finish(&self, log: &dyn LogSink) -> Result<GlobalResult> {
        merge_partitions(&self.config.output_dir, self.config.num_partitions, log)
    }
}
