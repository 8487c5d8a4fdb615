// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::error::{MapReduceError, Result};
use crate::log_sink::LogSink;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// Nominal size in bytes of one map chunk before word-boundary alignment
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub num_workers: usize,
    pub num_partitions: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Reduce partitions owned by each worker, indexed by worker id.
    /// Derived round-robin when omitted from a config file.
    #[serde(default)]
    pub reduce_tasks: Vec<Vec<usize>>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Config {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        num_workers: usize,
        num_partitions: usize,
    ) -> Result<Self> {
        let config = Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            num_workers,
            num_partitions,
            chunk_size: DEFAULT_CHUNK_SIZE,
            reduce_tasks: assign_reduce_tasks(num_workers, num_partitions),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        self.chunk_size = chunk_size;
        self.validate()?;
        Ok(self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| MapReduceError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_json::from_str(&contents).map_err(|source| MapReduceError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.reduce_tasks.is_empty() {
            config.reduce_tasks = assign_reduce_tasks(config.num_workers, config.num_partitions);
        }
        config.validate()?;
        Ok(config)
    }

    /// Rejects anything that would break distribution or partitioning.
    /// Must pass before any work is distributed.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(invalid("number of workers must be greater than 0"));
        }
        if self.num_partitions == 0 {
            return Err(invalid("number of reduce partitions must be greater than 0"));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk size must be greater than 0"));
        }
        if self.input_dir.as_os_str().is_empty() {
            return Err(invalid("input directory is empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(invalid("output directory is empty"));
        }
        if self.reduce_tasks.len() != self.num_workers {
            return Err(invalid(&format!(
                "reduce task list has {} entries for {} workers",
                self.reduce_tasks.len(),
                self.num_workers
            )));
        }

        let mut owners = vec![0usize; self.num_partitions];
        for partition in self.reduce_tasks.iter().flatten() {
            match owners.get_mut(*partition) {
                Some(count) => *count += 1,
                None => {
                    return Err(invalid(&format!(
                        "reduce partition {} is out of range (0..{})",
                        partition, self.num_partitions
                    )))
                }
            }
        }
        if let Some(partition) = owners.iter().position(|count| *count != 1) {
            return Err(invalid(&format!(
                "reduce partition {} must be owned by exactly one worker",
                partition
            )));
        }

        Ok(())
    }

    /// Partitions the given worker reduces, in order
    pub fn reduce_tasks_for(&self, worker_id: usize) -> &[usize] {
        self.reduce_tasks
            .get(worker_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn print_summary(&self, log: &dyn LogSink) {
        let mut summary = String::from("Configuration:\n");
        let _ = writeln!(summary, "Input Directory: {}", self.input_dir.display());
        let _ = writeln!(summary, "Output Directory: {}", self.output_dir.display());
        let _ = writeln!(summary, "Number of Workers: {}", self.num_workers);
        let _ = writeln!(summary, "Number of Reduce Tasks: {}", self.num_partitions);
        let _ = writeln!(summary, "Chunk Size: {} bytes", self.chunk_size);
        summary.push_str("Reduce Tasks List per Worker:\n");
        for (worker_id, partitions) in self.reduce_tasks.iter().enumerate() {
            let _ = write!(summary, "  Worker {}:", worker_id);
            for partition in partitions {
                let _ = write!(summary, " {}", partition);
            }
            summary.push('\n');
        }
        log.info(&summary);
    }
}

/// Static round-robin map: partition `i` goes to worker `i % num_workers`
pub fn assign_reduce_tasks(num_workers: usize, num_partitions: usize) -> Vec<Vec<usize>> {
    let mut tasks = vec![Vec::new(); num_workers];
    if num_workers == 0 {
        return tasks;
    }
    for partition in 0..num_partitions {
        tasks[partition % num_workers].push(partition);
    }
    tasks
}

fn invalid(reason: &str) -> MapReduceError {
    MapReduceError::InvalidConfig(reason.to_string())
}
