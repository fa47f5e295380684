//! Surface events and the bounded queue that carries them from window
//! handlers to the animator.

use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

pub const INPUT_QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceEvent {
    /// Cursor position in surface pixels.
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    Resize { width: u32, height: u32 },
}

impl SurfaceEvent {
    /// Moves can be merged or dropped under pressure; every other event
    /// changes drag or hover state and must be delivered.
    pub fn is_move(&self) -> bool {
        matches!(self, Self::PointerMove { .. } | Self::TouchMove { .. })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TimedEvent {
    pub event: SurfaceEvent,
    pub at: Instant,
}

/// Producer side, cloned into every handler.
#[derive(Clone)]
pub struct InputSender {
    tx: Sender<TimedEvent>,
    rx: Receiver<TimedEvent>,
    attached: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
}

impl InputSender {
    pub fn send(&self, event: SurfaceEvent) -> bool {
        self.send_at(event, Instant::now())
    }

    /// Queues `event`; returns false once the loop is disposed or the event
    /// was dropped. On a full queue a move is dropped, while any other event
    /// first makes room by merging runs of queued moves.
    pub fn send_at(&self, event: SurfaceEvent, at: Instant) -> bool {
        if !self.attached.load(Ordering::Acquire) {
            return false;
        }

        let timed = TimedEvent { event, at };
        match self.tx.try_send(timed) {
            Ok(()) => return true,
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(_)) if event.is_move() => {}
            Err(TrySendError::Full(_)) => {
                self.coalesce_moves();
                if self.tx.try_send(timed).is_ok() {
                    return true;
                }
                tracing::warn!(?event, "input queue full of non-move events");
            }
        }

        self.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(?event, "input queue full, event dropped");
        false
    }

    /// Collapses each run of consecutive same-kind moves in the queue to its
    /// last event. Touch drags accumulate deltas from the last seen touch, so
    /// the merged run ends in the same state.
    fn coalesce_moves(&self) {
        let mut kept: Vec<TimedEvent> = Vec::with_capacity(self.tx.len());
        let mut merged = 0u64;

        for timed in self.rx.try_iter() {
            let same_run = kept.last().is_some_and(|last| {
                timed.event.is_move()
                    && mem::discriminant(&last.event) == mem::discriminant(&timed.event)
            });
            match kept.last_mut() {
                Some(last) if same_run => *last = timed,
                _ => {
                    kept.push(timed);
                    continue;
                }
            }
            merged += 1;
        }

        for timed in kept {
            if self.tx.try_send(timed).is_err() {
                merged += 1;
            }
        }

        if merged > 0 {
            self.dropped.fetch_add(merged, Ordering::Relaxed);
            tracing::trace!(merged, "queued moves coalesced");
        }
    }

    #[cfg(test)]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }

    fn attach(&self) {
        self.attached.store(true, Ordering::Release);
    }
}

/// Consumer side, owned by the animator.
pub struct InputQueue {
    rx: Receiver<TimedEvent>,
    sender: InputSender,
}

impl InputQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = channel::bounded(capacity);
        Self {
            rx: rx.clone(),
            sender: InputSender {
                tx,
                rx,
                attached: Arc::new(AtomicBool::new(true)),
                dropped: Arc::new(AtomicU64::new(0)),
            },
        }
    }

    pub fn sender(&self) -> InputSender {
        self.sender.clone()
    }

    pub fn drain(&self) -> impl Iterator<Item = TimedEvent> + '_ {
        self.rx.try_iter()
    }

    pub fn attach(&self) {
        self.sender.attach();
    }

    /// Stops accepting events and discards whatever is still queued.
    pub fn detach(&self) {
        self.sender.detach();
        while self.rx.try_recv().is_ok() {}
    }

    pub fn dropped(&self) -> u64 {
        self.sender.dropped.load(Ordering::Relaxed)
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new(INPUT_QUEUE_CAPACITY)
    }
}
