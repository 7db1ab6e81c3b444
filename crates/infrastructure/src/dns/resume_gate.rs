//! Exactly-once settlement for a single transport attempt.
//!
//! An attempt has several independent terminal signals (the transport task
//! finishing, failing, or its timer firing). Whichever arrives first settles
//! the attempt; the rest are discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

/// Single-use gate: the first `try_resume` caller runs its action, every
/// later or concurrent caller returns without running anything.
#[derive(Debug, Default)]
pub struct ResumeGate {
    fired: AtomicBool,
}

impl ResumeGate {
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Runs `action` if and only if this call moves the gate from armed to fired.
    ///
    /// The flag is flipped before `action` runs, so `action` holds no lock of
    /// the gate and may block or take other locks freely.
    pub fn try_resume<F: FnOnce()>(&self, action: F) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        action();
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Delivers the first of several competing outcomes to the attempt's waiter.
pub struct AttemptSettler<T> {
    gate: ResumeGate,
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> AttemptSettler<T> {
    pub fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let settler = Self {
            gate: ResumeGate::new(),
            sender: Mutex::new(Some(tx)),
        };
        (settler, rx)
    }

    /// Returns `false` if the attempt was already settled; `outcome` is dropped.
    pub fn settle(&self, outcome: T) -> bool {
        self.gate.try_resume(|| {
            let sender = self
                .sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(tx) = sender {
                // The waiter may have gone away; nothing left to notify.
                let _ = tx.send(outcome);
            }
        })
    }

    pub fn is_settled(&self) -> bool {
        self.gate.is_fired()
    }
}
