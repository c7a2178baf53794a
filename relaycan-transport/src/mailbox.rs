//! Transmit-mailbox pool.
//!
//! The controller has [`MAILBOX_COUNT`] hardware transmit mailboxes. A frame
//! occupies one from submission until the transmit-complete interrupt, so
//! concurrent senders must arbitrate. [`MailboxPool`] tracks availability as
//! a bit per mailbox and holds the completion continuation registered with
//! each in-flight transmission.

use std::sync::{Condvar, Mutex};

/// Number of hardware transmit mailboxes.
pub const MAILBOX_COUNT: usize = 3;

/// Index of a hardware transmit mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mailbox(u8);

impl Mailbox {
    /// Wrap a mailbox index. Returns `None` for indices beyond the pool.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < MAILBOX_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The mailbox index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    const fn bit(self) -> u8 {
        1 << self.0
    }
}

/// Completion continuation registered with a transmission.
///
/// Runs in interrupt context when the frame leaves the bus; it must not block
/// and should do nothing beyond posting an event.
pub type Continuation = Box<dyn FnOnce() + Send>;

const ALL_FREE: u8 = (1 << MAILBOX_COUNT) - 1;

struct PoolState {
    free: u8,
    continuations: [Option<Continuation>; MAILBOX_COUNT],
}

/// Availability bit-set plus continuation table for the transmit mailboxes.
///
/// [`MailboxPool::acquire`] is the task-side half: it blocks until any bit is
/// set, claims the lowest free mailbox and records the continuation under the
/// same lock, so no two in-flight sends can ever hold the same index.
/// [`MailboxPool::complete`] is the interrupt-side half.
pub struct MailboxPool {
    state: Mutex<PoolState>,
    available: Condvar,
}

impl MailboxPool {
    /// A pool with every mailbox free.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PoolState {
                free: ALL_FREE,
                continuations: [None, None, None],
            }),
            available: Condvar::new(),
        }
    }

    /// Claim a free mailbox, blocking without timeout until one is available,
    /// and register `continuation` to run on its transmit completion.
    pub fn acquire(&self, continuation: Continuation) -> Mailbox {
        let mut state = self.state.lock().expect("mailbox pool poisoned");
        while state.free == 0 {
            state = self
                .available
                .wait(state)
                .expect("mailbox pool poisoned");
        }
        let index = state.free.trailing_zeros() as u8;
        let mailbox = Mailbox(index);
        state.free &= !mailbox.bit();
        state.continuations[mailbox.index()] = Some(continuation);
        mailbox
    }

    /// Release `mailbox` and run its registered continuation, if any.
    ///
    /// Interrupt-side: the availability bit is set and a waiter woken before
    /// the continuation runs, matching the hardware completion order. The
    /// continuation executes outside the pool lock, so a sender woken by the
    /// release may claim the mailbox again immediately.
    pub fn complete(&self, mailbox: Mailbox) {
        let continuation = {
            let mut state = self.state.lock().expect("mailbox pool poisoned");
            state.free |= mailbox.bit();
            state.continuations[mailbox.index()].take()
        };
        self.available.notify_one();
        if let Some(continuation) = continuation {
            continuation();
        }
    }

    /// Number of currently free mailboxes.
    pub fn free_count(&self) -> usize {
        self.state
            .lock()
            .expect("mailbox pool poisoned")
            .free
            .count_ones() as usize
    }
}

impl Default for MailboxPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn noop() -> Continuation {
        Box::new(|| {})
    }

    #[test]
    fn acquire_hands_out_distinct_mailboxes() {
        let pool = MailboxPool::new();
        let a = pool.acquire(noop());
        let b = pool.acquire(noop());
        let c = pool.acquire(noop());
        assert_eq!(
            [a.index(), b.index(), c.index()],
            [0, 1, 2],
            "lowest free index first"
        );
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn acquire_blocks_until_complete_releases_a_slot() {
        let pool = Arc::new(MailboxPool::new());
        let _a = pool.acquire(noop());
        let _b = pool.acquire(noop());
        let taken = pool.acquire(noop());

        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.acquire(noop()))
        };
        // The waiter cannot make progress until a completion happens.
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());

        pool.complete(taken);
        let reacquired = waiter.join().unwrap();
        assert_eq!(reacquired.index(), taken.index());
    }

    #[test]
    fn complete_runs_the_registered_continuation_once() {
        let pool = MailboxPool::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&ran);
        let mailbox = pool.acquire(Box::new(move || {
            flag.fetch_add(1, Ordering::SeqCst);
        }));

        pool.complete(mailbox);
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        // A spurious second completion has no continuation left to run.
        pool.complete(mailbox);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_two_in_flight_sends_share_a_mailbox() {
        let pool = Arc::new(MailboxPool::new());
        let in_flight: Arc<[AtomicBool; MAILBOX_COUNT]> =
            Arc::new([AtomicBool::new(false), AtomicBool::new(false), AtomicBool::new(false)]);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            let in_flight = Arc::clone(&in_flight);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    let mailbox = pool.acquire(noop());
                    let was = in_flight[mailbox.index()].swap(true, Ordering::SeqCst);
                    assert!(!was, "mailbox {} double-allocated", mailbox.index());
                    thread::yield_now();
                    in_flight[mailbox.index()].store(false, Ordering::SeqCst);
                    pool.complete(mailbox);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.free_count(), MAILBOX_COUNT);
    }
}
