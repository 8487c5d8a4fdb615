// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod config;
pub mod error;
pub mod executor;
pub mod log_sink;
pub mod map_reduce_job;
pub mod phase_gate;
pub mod phase_task;
pub mod status_sender;
pub mod worker_runtime;

pub use error::{MapReduceError, Result};
