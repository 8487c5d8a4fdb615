// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use clap::Parser;
use map_reduce_core::config::Config;
use map_reduce_core::{MapReduceError, Result};
use std::path::PathBuf;

/// Count the words of every file in a directory with a single-process MapReduce
#[derive(Parser, Debug)]
#[command(name = "map-reduce", version)]
pub struct Args {
    /// Input directory containing text files
    #[arg(long, required_unless_present = "config")]
    pub input: Option<PathBuf>,

    /// Output directory for intermediate, partition and final files
    #[arg(long, required_unless_present = "config")]
    pub output: Option<PathBuf>,

    /// Number of worker tasks
    #[arg(long, required_unless_present = "config")]
    pub nworkers: Option<usize>,

    /// Number of reduce partitions
    #[arg(long, required_unless_present = "config")]
    pub nreduce: Option<usize>,

    /// Nominal chunk size in bytes
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// File receiving a copy of every log line
    #[arg(long, default_value = "mapreduce.log")]
    pub log_file: PathBuf,

    /// JSON configuration file, replaces the individual flags
    #[arg(long, conflicts_with_all = ["input", "output", "nworkers", "nreduce"])]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Build a validated configuration from either the JSON file or the flags
    pub fn into_config(self) -> Result<Config> {
        let config = match self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(
                required(self.input, "--input")?,
                required(self.output, "--output")?,
                required(self.nworkers, "--nworkers")?,
                required(self.nreduce, "--nreduce")?,
            )?,
        };

        match self.chunk_size {
            Some(chunk_size) => config.with_chunk_size(chunk_size),
            None => Ok(config),
        }
    }
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.ok_or_else(|| MapReduceError::InvalidConfig(format!("{} is required", flag)))
}
