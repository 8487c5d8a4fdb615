// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::error::Result;
use crate::log_sink::LogSink;
use crate::map_reduce_job::MapReduceJob;
use crate::phase_gate::{GateTracker, Phase, PhaseGate};
use crate::phase_task::{PhaseTask, WorkFn};
use crate::worker_runtime::WorkerRuntime;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of one phase once its gate has drained
#[derive(Debug, Clone)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub workers: usize,
    pub completed: usize,
    pub failed: Vec<usize>,
    pub elapsed: Duration,
}

impl PhaseSummary {
    pub fn all_completed(&self) -> bool {
        self.failed.is_empty() && self.completed == self.workers
    }
}

/// Everything a full run produced
#[derive(Debug)]
pub struct RunReport<O> {
    pub map: PhaseSummary,
    pub reduce: PhaseSummary,
    pub output: O,
}

type TaskFor<J, A, G> = PhaseTask<J, A, <G as PhaseGate>::Waiter, <G as PhaseGate>::StatusSender>;

/// Two-phase executor: drives every worker through Map, waits for the Map gate
/// to drain, then drives every worker through Reduce.
/// Generic over the job, the gate implementation and the worker runtime.
pub struct Executor<J, G, R>
where
    J: MapReduceJob,
    G: PhaseGate,
{
    job: Arc<J>,
    log: Arc<dyn LogSink>,
    _phantom: PhantomData<(G, R)>,
}

impl<J, G, R> Executor<J, G, R>
where
    J: MapReduceJob,
    G: PhaseGate,
    R: WorkerRuntime<TaskFor<J, J::MapAssignment, G>>
        + WorkerRuntime<TaskFor<J, J::ReduceAssignment, G>>,
{
    pub fn new(job: Arc<J>, log: Arc<dyn LogSink>) -> Self {
        Self {
            job,
            log,
            _phantom: PhantomData,
        }
    }

    pub async fn run(&self) -> Result<RunReport<J::Output>> {
        self.job.prepare(self.log.as_ref())?;
        let map_assignments = self.job.create_map_assignments(self.log.as_ref())?;
        let reduce_assignments = self.job.create_reduce_assignments();

        self.log.info("Workers are being started");

        let mut map_gate = GateTracker::new(Phase::Map);
        let map = self
            .run_phase(&mut map_gate, map_assignments, J::map_work)
            .await?;

        map_gate.ensure_drained_before(Phase::Reduce)?;

        let mut reduce_gate = GateTracker::new(Phase::Reduce);
        let reduce = self
            .run_phase(&mut reduce_gate, reduce_assignments, J::reduce_work)
            .await?;

        self.log.info("All Map Tasks and Reduce Tasks have finished");
        self.log.info("======== Start Merging ===========");
        let output = self.job.finish(self.log.as_ref())?;
        self.log.info("======== Merging Complete ===========");

        Ok(RunReport {
            map,
            reduce,
            output,
        })
    }

    async fn run_phase<A>(
        &self,
        tracker: &mut GateTracker,
        assignments: Vec<A>,
        work: WorkFn<J, A>,
    ) -> Result<PhaseSummary>
    where
        A: Send + 'static,
        R: WorkerRuntime<TaskFor<J, A, G>>,
    {
        let phase = tracker.phase();
        let num_workers = assignments.len();
        let mut gate = G::setup(num_workers);

        // Every task is spawned blocked on the gate before anyone is released
        let handles: Vec<_> = assignments
            .into_iter()
            .enumerate()
            .map(|(id, assignment)| {
                let task = PhaseTask {
                    id,
                    phase,
                    job: Arc::clone(&self.job),
                    assignment,
                    work,
                    waiter: gate.waiter(),
                    status: gate.get_status_sender(id),
                    log: Arc::clone(&self.log),
                };
                <R as WorkerRuntime<TaskFor<J, A, G>>>::spawn(task)
            })
            .collect();

        self.log.info(&format!(
            "====================== {} phase starting ====================",
            phase
        ));
        let start = Instant::now();
        tracker.mark_released()?;
        gate.release();

        let mut completed = 0;
        let mut failed = Vec::new();
        while completed + failed.len() < num_workers {
            match gate.wait_next().await {
                Some(Ok(_worker_id)) => completed += 1,
                Some(Err(worker_id)) => {
                    self.log.error(&format!(
                        "Worker {} failed during {} phase",
                        worker_id, phase
                    ));
                    failed.push(worker_id);
                }
                None => {
                    self.log.warning(&format!(
                        "{} phase lost contact with {} workers",
                        phase,
                        num_workers - completed - failed.len()
                    ));
                    break;
                }
            }
        }

        for (worker_id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = <R as WorkerRuntime<TaskFor<J, A, G>>>::join(handle).await {
                self.log.error(&format!(
                    "Worker {} {} task failed: {}",
                    worker_id, phase, e
                ));
            }
        }
        tracker.mark_drained()?;

        let summary = PhaseSummary {
            phase,
            workers: num_workers,
            completed,
            failed,
            elapsed: start.elapsed(),
        };
        self.log.info(&format!(
            "====================== {} phase complete ({}/{} workers, {:.6} seconds) ====================",
            phase,
            summary.completed,
            summary.workers,
            summary.elapsed.as_secs_f64()
        ));

        Ok(summary)
    }
}
