// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::error::{MapReduceError, Result};
use crate::status_sender::{CompletionMessage, StatusSender};
use std::fmt;
use std::future::Future;

/// One of the two global stages every worker passes through in lockstep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => f.write_str("Map"),
            Phase::Reduce => f.write_str("Reduce"),
        }
    }
}

/// Lifecycle of a phase gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Tasks exist and are blocked on the gate
    Idle,
    /// Every task has been let through at once
    Released,
    /// Every task has signaled completion and been joined
    Drained,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Idle => f.write_str("Idle"),
            GateState::Released => f.write_str("Released"),
            GateState::Drained => f.write_str("Drained"),
        }
    }
}

/// Worker-side half of a phase gate
pub trait GateWaiter: Send + 'static {
    /// Block until the gate is released.
    /// Returns false if the gate was dropped without being released.
    fn wait_release(&mut self) -> impl Future<Output = bool> + Send;
}

/// Trait for abstracting the per-phase rendezvous between the coordinator and workers.
/// A gate is set up for N workers, hands each worker a waiter and a status sender,
/// releases all waiters with a single call and then collects N completions.
pub trait PhaseGate: Send {
    type Waiter: GateWaiter;
    type StatusSender: StatusSender;

    /// Setup a gate for N workers
    fn setup(num_workers: usize) -> Self;

    /// Get a waiter that blocks until `release` is called
    fn waiter(&self) -> Self::Waiter;

    /// Get the completion sender for a specific worker
    fn get_status_sender(&self, worker_id: usize) -> Self::StatusSender;

    /// Unblock every waiter at once
    fn release(&mut self);

    /// Wait for the next worker to complete or fail.
    /// Returns Ok(worker_id) on success, Err(worker_id) on failure,
    /// None once no worker can report anymore.
    fn wait_next(&mut self) -> impl Future<Output = Option<CompletionMessage>> + Send;
}

/// Tracks the state of one gate and refuses out-of-order transitions
#[derive(Debug, Clone)]
pub struct GateTracker {
    phase: Phase,
    state: GateState,
}

impl GateTracker {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            state: GateState::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn mark_released(&mut self) -> Result<()> {
        self.transition(GateState::Idle, GateState::Released)
    }

    pub fn mark_drained(&mut self) -> Result<()> {
        self.transition(GateState::Released, GateState::Drained)
    }

    /// The next phase may only start once this gate is drained
    pub fn ensure_drained_before(&self, next: Phase) -> Result<()> {
        if self.state == GateState::Drained {
            Ok(())
        } else {
            Err(MapReduceError::PhaseOrder {
                phase: next,
                previous: self.state,
            })
        }
    }

    fn transition(&mut self, from: GateState, to: GateState) -> Result<()> {
        if self.state != from {
            return Err(MapReduceError::GateTransition {
                phase: self.phase,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
