// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use async_trait::async_trait;

/// Completion message: Ok(worker_id) on success, Err(worker_id) on failure
pub type CompletionMessage = Result<usize, usize>;

/// Trait for sending a worker's completion signal to the coordinator
#[async_trait]
pub trait StatusSender: Send + Sync + Clone + 'static {
    /// Report the outcome of the worker's whole assignment:
    /// Ok(worker_id) on success, Err(worker_id) on failure.
    /// Returns true if the signal was delivered.
    async fn send(&self, result: CompletionMessage) -> bool;
}
