// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0
use crate::channel_status_sender::ChannelStatusSender;
use map_reduce_core::phase_gate::{GateWaiter, PhaseGate};
use map_reduce_core::status_sender::CompletionMessage;
use tokio::sync::mpsc::{self, Sender};
use tokio::sync::watch;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{StreamExt, StreamMap};

const COMPLETION_BUFFER: usize = 10;

/// Phase gate built from a watch channel (release broadcast) and one mpsc
/// channel per worker (completions), drained through a StreamMap
pub struct ChannelPhaseGate {
    release_tx: watch::Sender<bool>,
    completion_txs: Vec<Sender<CompletionMessage>>,
    completion_streams: StreamMap<usize, ReceiverStream<CompletionMessage>>,
}

/// Worker-side view of the release broadcast
pub struct ChannelGateWaiter {
    rx: watch::Receiver<bool>,
}

impl GateWaiter for ChannelGateWaiter {
    async fn wait_release(&mut self) -> bool {
        loop {
            if *self.rx.borrow_and_update() {
                return true;
            }
            if self.rx.changed().await.is_err() {
                // Sender gone: released only if it said so before dropping
                return *self.rx.borrow();
            }
        }
    }
}

impl PhaseGate for ChannelPhaseGate {
    type Waiter = ChannelGateWaiter;
    type StatusSender = ChannelStatusSender;

    fn setup(num_workers: usize) -> Self {
        let (release_tx, _) = watch::channel(false);
        let mut completion_txs = Vec::with_capacity(num_workers);
        let mut completion_streams = StreamMap::new();

        for worker_idx in 0..num_workers {
            let (tx, rx) = mpsc::channel::<CompletionMessage>(COMPLETION_BUFFER);
            completion_txs.push(tx);
            completion_streams.insert(worker_idx, ReceiverStream::new(rx));
        }

        Self {
            release_tx,
            completion_txs,
            completion_streams,
        }
    }

    fn waiter(&self) -> Self::Waiter {
        ChannelGateWaiter {
            rx: self.release_tx.subscribe(),
        }
    }

    fn get_status_sender(&self, worker_id: usize) -> Self::StatusSender {
        ChannelStatusSender {
            tx: self.completion_txs[worker_id].clone(),
        }
    }

    fn release(&mut self) {
        self.release_tx.send_replace(true);
        // Only the workers' senders remain, so every stream ends once its worker exits
        self.completion_txs.clear();
    }

    async fn wait_next(&mut self) -> Option<CompletionMessage> {
        self.completion_streams
            .next()
            .await
            .map(|(stream_idx, msg)| match msg {
                Ok(worker_id) => Ok(worker_id),
                Err(_) => Err(stream_idx),
            })
    }
}
