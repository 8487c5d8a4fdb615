// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::log_sink::LogSink;
use crate::map_reduce_job::MapReduceJob;
use crate::phase_gate::{GateWaiter, Phase};
use crate::status_sender::StatusSender;
use crate::worker_runtime::WorkerTask;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;

/// Job entry point run by a task once its gate opens
pub type WorkFn<J, A> = fn(&J, usize, &A, &dyn LogSink);

/// One worker's share of one phase.
/// Created blocked on the phase gate; runs its whole assignment once released
/// and reports a single completion.
pub struct PhaseTask<J, A, W, S> {
    pub id: usize,
    pub phase: Phase,
    pub job: Arc<J>,
    pub assignment: A,
    pub work: WorkFn<J, A>,
    pub waiter: W,
    pub status: S,
    pub log: Arc<dyn LogSink>,
}

#[async_trait]
impl<J, A, W, S> WorkerTask for PhaseTask<J, A, W, S>
where
    J: MapReduceJob,
    A: Send + 'static,
    W: GateWaiter,
    S: StatusSender,
{
    type Output = ();

    async fn run(mut self) -> Self::Output {
        if !self.waiter.wait_release().await {
            self.log.warning(&format!(
                "Worker {} {} gate closed before release",
                self.id, self.phase
            ));
            self.status.send(Err(self.id)).await;
            return;
        }

        let PhaseTask {
            id,
            phase,
            job,
            assignment,
            work,
            status,
            log,
            ..
        } = self;

        log.info(&format!("Worker {} starts {} tasks", id, phase));
        let start = Instant::now();

        // File work is blocking and never yields; keep it off the async workers
        let work_log = Arc::clone(&log);
        let outcome =
            task::spawn_blocking(move || work(&job, id, &assignment, work_log.as_ref())).await;

        match outcome {
            Ok(()) => {
                log.info(&format!(
                    "Worker {} completed {} tasks in {:.6} seconds",
                    id,
                    phase,
                    start.elapsed().as_secs_f64()
                ));
                if !status.send(Ok(id)).await {
                    log.warning(&format!(
                        "Worker {} could not report {} completion",
                        id, phase
                    ));
                }
            }
            Err(e) => {
                log.error(&format!("Worker {} panicked during {} tasks: {}", id, phase, e));
                status.send(Err(id)).await;
            }
        }
    }
}
