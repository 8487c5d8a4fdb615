// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::phase_gate::{GateState, Phase};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for map-reduce operations
pub type Result<T> = std::result::Result<T, MapReduceError>;

/// Errors that abort a run. Per-chunk and per-line failures never surface here,
/// they are logged and skipped where they happen.
#[derive(Error, Debug)]
pub enum MapReduceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot enumerate input directory {}: {source}", .path.display())]
    InputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{phase} gate cannot move from {from} to {to}")]
    GateTransition {
        phase: Phase,
        from: GateState,
        to: GateState,
    },

    #[error("{phase} phase cannot start while the previous gate is {previous}")]
    PhaseOrder { phase: Phase, previous: GateState },
}

impl MapReduceError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MapReduceError::Io {
            path: path.into(),
            source,
        }
    }
}
