//! Single-slot edge mailbox between interrupt and polling contexts.
//!
//! The interrupt handler publishes each captured edge; the polling loop
//! takes at most one per iteration. Timestamp, level, and the pending
//! flag pack into a single `AtomicU32`, so a handler firing between the
//! two halves of a 16-bit read can never tear the value. Latest event
//! wins; the radio protocol tolerates the loss.

use portable_atomic::{AtomicU32, Ordering};

use crate::time::{EdgeEvent, Tick};

const LEVEL_BIT: u32 = 1 << 16;
const PENDING_BIT: u32 = 1 << 17;

/// Lock-free one-event mailbox.
#[derive(Debug)]
pub struct EdgeLatch {
    slot: AtomicU32,
}

impl EdgeLatch {
    /// Creates an empty latch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: AtomicU32::new(0),
        }
    }

    /// Stores the newest edge, overwriting any unconsumed one.
    pub fn publish(&self, event: EdgeEvent) {
        let mut word = u32::from(event.at.raw()) | PENDING_BIT;
        if event.level {
            word |= LEVEL_BIT;
        }
        self.slot.store(word, Ordering::Release);
    }

    /// Takes the pending edge, if any, clearing the pending flag while
    /// keeping the timestamp readable for silence checks.
    pub fn take(&self) -> Option<EdgeEvent> {
        let word = self.slot.fetch_and(!PENDING_BIT, Ordering::AcqRel);
        if word & PENDING_BIT == 0 {
            return None;
        }
        Some(unpack(word))
    }

    /// Timestamp of the most recently published edge, consumed or not.
    ///
    /// Reads [`Tick::ZERO`] until the first capture; the decoder's void
    /// reset is idempotent so the stale seed is harmless.
    #[must_use]
    pub fn last_edge_at(&self) -> Tick {
        unpack(self.slot.load(Ordering::Acquire)).at
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn unpack(word: u32) -> EdgeEvent {
    EdgeEvent::new(Tick::new(word as u16), word & LEVEL_BIT != 0)
}
