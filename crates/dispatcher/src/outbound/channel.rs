//! ChannelOutbound - latest-value hand-off to an in-process consumer
//!
//! One `watch` slot per gesture kind: a newer pan replaces a pan the
//! consumer has not picked up yet, likewise for zoom. There is no queued
//! history; a slow consumer only ever sees the freshest vector.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{ContractError, GestureKind, GestureMessage, OutboundChannel};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::watch;
use tracing::debug;

/// Sequence-stamped slot value; `None` until the first send
type Slot = Option<(u64, GestureMessage)>;

fn slot_index(kind: GestureKind) -> usize {
    match kind {
        GestureKind::Pan => 0,
        GestureKind::Zoom => 1,
    }
}

/// Non-blocking outbound; never waits on the consumer
///
/// A closed receiver means the client is gone.
pub struct ChannelOutbound {
    name: String,
    slots: [watch::Sender<Slot>; 2],
    /// Sequence of the last message written per slot
    written: [u64; 2],
    /// Sequence of the last message taken per slot, updated by the receiver
    taken: Arc<[AtomicU64; 2]>,
    superseded: u64,
}

impl ChannelOutbound {
    /// Create the outbound and its receiving end
    pub fn new(name: impl Into<String>) -> (Self, GestureReceiver) {
        let (pan_tx, pan_rx) = watch::channel(None);
        let (zoom_tx, zoom_rx) = watch::channel(None);
        let taken = Arc::new([AtomicU64::new(0), AtomicU64::new(0)]);
        let outbound = Self {
            name: name.into(),
            slots: [pan_tx, zoom_tx],
            written: [0; 2],
            taken: Arc::clone(&taken),
            superseded: 0,
        };
        let receiver = GestureReceiver {
            slots: [pan_rx, zoom_rx],
            taken,
        };
        (outbound, receiver)
    }

    /// Messages overwritten before the consumer picked them up
    pub fn superseded(&self) -> u64 {
        self.superseded
    }
}

impl OutboundChannel for ChannelOutbound {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, message: GestureMessage) -> Result<(), ContractError> {
        let index = slot_index(message.kind());
        let slot = &self.slots[index];
        if slot.is_closed() {
            return Err(ContractError::channel_closed(&self.name, "receiver dropped"));
        }

        let previous = self.written[index];
        if previous > self.taken[index].load(Ordering::Acquire) {
            self.superseded += 1;
            debug!(outbound = %self.name, gesture = %message.kind(), "pending gesture superseded");
        }

        let sequence = previous + 1;
        self.written[index] = sequence;
        slot.send_replace(Some((sequence, message)));
        Ok(())
    }
}

/// Receiving end of a `ChannelOutbound`
///
/// When both a pan and a zoom are pending, the pan is returned first.
pub struct GestureReceiver {
    slots: [watch::Receiver<Slot>; 2],
    taken: Arc<[AtomicU64; 2]>,
}

impl GestureReceiver {
    /// Wait for the next gesture; `None` once the outbound is dropped and
    /// nothing is pending
    pub async fn recv(&mut self) -> Option<GestureMessage> {
        loop {
            match self.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => {}
            }

            let [pan, zoom] = &mut self.slots;
            tokio::select! {
                biased;
                _ = pan.changed() => {}
                _ = zoom.changed() => {}
            }
        }
    }

    /// Take a pending gesture without waiting
    pub fn try_recv(&mut self) -> Result<GestureMessage, TryRecvError> {
        for index in 0..self.slots.len() {
            let value = self.slots[index].borrow_and_update();
            if !value.has_changed() {
                continue;
            }
            if let Some((sequence, message)) = *value {
                self.taken[index].store(sequence, Ordering::Release);
                return Ok(message);
            }
        }

        if self.slots.iter().any(|slot| slot.has_changed().is_err()) {
            Err(TryRecvError::Disconnected)
        } else {
            Err(TryRecvError::Empty)
        }
    }
}
