// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::error::Result;
use crate::log_sink::LogSink;

/// Trait that defines a specific MapReduce job.
/// Abstracts the job domain from the execution model: the executor only
/// knows that there is one map and one reduce assignment per worker.
pub trait MapReduceJob: Send + Sync + 'static {
    /// Everything one worker maps during the Map phase
    type MapAssignment: Send + 'static;

    /// Everything one worker reduces during the Reduce phase
    type ReduceAssignment: Send + 'static;

    /// Final artifact produced after both phases
    type Output: Send;

    /// Prepare the output location before any worker starts
    fn prepare(&self, _log: &dyn LogSink) -> Result<()> {
        Ok(())
    }

    /// Create exactly one map assignment per worker, indexed by worker id
    fn create_map_assignments(&self, log: &dyn LogSink) -> Result<Vec<Self::MapAssignment>>;

    /// Create exactly one reduce assignment per worker, indexed by worker id
    fn create_reduce_assignments(&self) -> Vec<Self::ReduceAssignment>;

    /// Execute map work for one worker. Failures are logged, never returned.
    fn map_work(&self, worker_id: usize, assignment: &Self::MapAssignment, log: &dyn LogSink);

    /// Execute reduce work for one worker. Failures are logged, never returned.
    fn reduce_work(&self, worker_id: usize, assignment: &Self::ReduceAssignment, log: &dyn LogSink);

    /// Combine the reduce outputs once every worker has drained
    fn finish(&self, log: &dyn LogSink) -> Result<Self::Output>;
}
