// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
pub mod channel_phase_gate;
pub mod channel_status_sender;
pub mod cli;
pub mod pipeline;
pub mod tokio_runtime;

pub use pipeline::{run_word_count, WordCountExecutor};
