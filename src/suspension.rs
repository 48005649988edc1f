//! Single-slot resume signal shared between the command loop and the
//! engine threads that report debuggee stops.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Default)]
struct Slot {
    pending: Mutex<bool>,
    ready: Condvar,
}

/// Auto-resetting signal with one slot.
///
/// Any number of `signal` calls made while nobody is waiting collapse into a
/// single pending wakeup. Clones share the same slot.
#[derive(Clone, Default)]
pub struct ResumeSignal {
    slot: Arc<Slot>,
}

impl ResumeSignal {
    pub fn new() -> ResumeSignal {
        ResumeSignal::default()
    }

    fn pending(&self) -> MutexGuard<'_, bool> {
        // The slot is a plain bool, so a poisoned lock still holds a usable value.
        self.slot
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks the slot as pending and wakes the waiter, if any.
    pub fn signal(&self) {
        let mut pending = self.pending();
        *pending = true;
        self.slot.ready.notify_one();
    }

    /// Blocks until a signal is pending, then consumes it.
    pub fn wait(&self) {
        let mut pending = self.pending();
        while !*pending {
            pending = self
                .slot
                .ready
                .wait(pending)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        *pending = false;
    }

    /// Consumes a pending signal without blocking. Returns whether one was pending.
    pub fn try_wait(&self) -> bool {
        let mut pending = self.pending();
        std::mem::replace(&mut *pending, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn signal_before_wait_is_retained() {
        let signal = ResumeSignal::new();
        signal.signal();
        signal.wait();
        assert!(!signal.try_wait());
    }

    #[test]
    fn repeated_signals_coalesce_into_one_wakeup() {
        let signal = ResumeSignal::new();
        signal.signal();
        signal.signal();
        signal.signal();

        signal.wait();
        assert!(!signal.try_wait(), "extra signals must not be queued");
    }

    #[test]
    fn wait_blocks_until_another_thread_signals() {
        let signal = ResumeSignal::new();
        let engine = signal.clone();
        let (done_tx, done_rx) = mpsc::channel();

        let waiter = thread::spawn(move || {
            signal.wait();
            done_tx.send(()).unwrap();
        });

        assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());

        engine.signal();
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("waiter was not woken");
        waiter.join().unwrap();
    }

    #[test]
    fn one_signal_wakes_exactly_one_wait() {
        let signal = ResumeSignal::new();
        let engine = signal.clone();
        let (done_tx, done_rx) = mpsc::channel();

        let waiter = thread::spawn(move || {
            for _ in 0..2 {
                signal.wait();
                done_tx.send(()).unwrap();
            }
        });

        engine.signal();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());

        engine.signal();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
    }
}
