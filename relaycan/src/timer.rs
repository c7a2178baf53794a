//! Thread-backed tick timers.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::event::{Event, EventSender, EventSink};

enum Mode {
    Periodic,
    OneShot,
}

/// A timer that posts an [`Event`] through an [`EventSink`] when it expires.
///
/// Periodic timers auto-reload: once started they fire every period until the
/// timer is dropped. One-shot timers fire once per [`TickTimer::start`];
/// starting one that is already armed restarts its countdown.
///
/// The callback runs on the timer's worker thread (the timer-service context)
/// and only posts, so it never blocks.
pub struct TickTimer {
    commands: Sender<()>,
}

impl TickTimer {
    /// A periodic timer with the given period.
    pub fn periodic(period: Duration, sink: EventSender, event: Event) -> Self {
        Self::spawn(Mode::Periodic, period, sink, event)
    }

    /// A one-shot timer with the given period.
    pub fn one_shot(period: Duration, sink: EventSender, event: Event) -> Self {
        Self::spawn(Mode::OneShot, period, sink, event)
    }

    /// Arm the timer. For a periodic timer the first call begins the
    /// auto-reload cycle and later calls are no-ops; for a one-shot timer
    /// every call (re)starts the countdown.
    pub fn start(&self) {
        // The worker only disappears when the timer is dropped.
        let _ = self.commands.send(());
    }

    fn spawn(mode: Mode, period: Duration, sink: EventSender, event: Event) -> Self {
        let (commands, arm) = mpsc::channel::<()>();
        thread::Builder::new()
            .name("tick-timer".into())
            .spawn(move || match mode {
                Mode::Periodic => {
                    // Wait for the initial start, then free-run.
                    if arm.recv().is_err() {
                        return;
                    }
                    loop {
                        match arm.recv_timeout(period) {
                            Err(RecvTimeoutError::Timeout) => {
                                // Queue overflow is dropped silently.
                                let _ = sink.post(event);
                            }
                            Ok(()) => {}
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                }
                Mode::OneShot => loop {
                    match arm.recv() {
                        Ok(()) => loop {
                            match arm.recv_timeout(period) {
                                Err(RecvTimeoutError::Timeout) => {
                                    let _ = sink.post(event);
                                    break;
                                }
                                // Re-armed mid-countdown: restart it.
                                Ok(()) => {}
                                Err(RecvTimeoutError::Disconnected) => return,
                            }
                        },
                        Err(_) => return,
                    }
                },
            })
            .expect("spawn timer thread");
        Self { commands }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{event_queue, EventSource};
    use std::time::Instant;

    #[test]
    fn one_shot_fires_once_per_start() {
        let (tx, rx) = event_queue(4);
        let timer = TickTimer::one_shot(Duration::from_millis(10), tx, Event::TimerFired);
        timer.start();
        assert_eq!(rx.next(), Some(Event::TimerFired));

        // Not auto-reloading: nothing else arrives until re-armed.
        let idle = Instant::now();
        timer.start();
        assert_eq!(rx.next(), Some(Event::TimerFired));
        assert!(idle.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn periodic_fires_repeatedly_after_a_single_start() {
        let (tx, rx) = event_queue(8);
        let timer = TickTimer::periodic(Duration::from_millis(5), tx, Event::TimerFired);
        timer.start();
        for _ in 0..3 {
            assert_eq!(rx.next(), Some(Event::TimerFired));
        }
        drop(timer);
    }
}
