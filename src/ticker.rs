//! Second ticker ownership.
//!
//! A `TickSource` starts periodic schedules; the face keeps at most one of
//! them alive in a `TickerSlot`, which always cancels the old schedule
//! before installing a new one.
//!
//! - `PollTicker` is driven from the host main loop with the current time
//! - `ThreadTicker` (feature `std`) runs each schedule on its own thread

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::ClockError;

pub const TICK_PERIOD_MS: u32 = 1000;

/// Delay that lands the first tick on the next whole second.
#[inline]
pub fn first_tick_delay(millisecond: u16) -> u32 {
    TICK_PERIOD_MS - (millisecond as u32 % TICK_PERIOD_MS)
}

pub type TickFn = Box<dyn FnMut() + Send + 'static>;

/// A running schedule.
pub trait TickHandle {
    /// Stop the schedule. After this returns the callback never runs again.
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
}

/// Something that can run a callback every `period_ms`, first after
/// `first_delay_ms`.
pub trait TickSource {
    type Handle: TickHandle;

    fn start(
        &mut self,
        first_delay_ms: u32,
        period_ms: u32,
        on_tick: TickFn,
    ) -> Result<Self::Handle, ClockError>;
}

/// Holder of the single live ticker.
pub struct TickerSlot<H: TickHandle> {
    active: Option<H>,
}

impl<H: TickHandle> TickerSlot<H> {
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Make `handle` the active ticker, cancelling the previous one first.
    pub fn replace(&mut self, handle: H) {
        if let Some(mut old) = self.active.take() {
            old.cancel();
            log::debug!("cancelled previous ticker");
        }
        self.active = Some(handle);
    }

    /// Cancel the active ticker, then start and install a new one from
    /// `source`. No two schedules overlap, even briefly.
    pub fn restart<S>(
        &mut self,
        source: &mut S,
        first_delay_ms: u32,
        period_ms: u32,
        on_tick: TickFn,
    ) -> Result<(), ClockError>
    where
        S: TickSource<Handle = H>,
    {
        self.cancel();
        let handle = source.start(first_delay_ms, period_ms, on_tick)?;
        log::debug!("ticker started, first tick in {} ms", first_delay_ms);
        self.active = Some(handle);
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let Some(mut old) = self.active.take() {
            old.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(|h| h.is_active())
    }

    pub fn active(&self) -> Option<&H> {
        self.active.as_ref()
    }
}

impl<H: TickHandle> Default for TickerSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: TickHandle> Drop for TickerSlot<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}

// -------------------- host loop driven ticker --------------------

struct Schedule {
    generation: u32,
    next_due_ms: u64,
    period_ms: u32,
    on_tick: TickFn,
}

#[derive(Default)]
struct PollInner {
    now_ms: u64,
    generation: u32,
    schedule: Option<Schedule>,
}

/// Ticker driven by `poll(now_ms)` from the host main loop.
///
/// Clones share the same schedule: hand one to the face and keep one to poll.
/// A new schedule's first delay counts from the latest known time: the last
/// `poll`/`set_now`, or the time source when one is attached.
#[derive(Clone)]
pub struct PollTicker {
    inner: Arc<Mutex<RefCell<PollInner>>>,
    time_source: Option<fn() -> u64>,
}

impl PollTicker {
    pub fn new(now_ms: u64) -> Self {
        let inner = PollInner {
            now_ms,
            ..PollInner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(RefCell::new(inner))),
            time_source: None,
        }
    }

    /// Read the current time from `now` whenever a schedule starts, e.g. the
    /// host's monotonic millisecond timer.
    pub fn with_time_source(mut self, now: fn() -> u64) -> Self {
        self.time_source = Some(now);
        self
    }

    /// Advance the known time without running due ticks.
    pub fn set_now(&self, now_ms: u64) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            inner.now_ms = inner.now_ms.max(now_ms);
        });
    }

    /// Advance to `now_ms` and run every tick that fell due, in order.
    /// Returns how many ticks ran.
    pub fn poll(&self, now_ms: u64) -> u32 {
        // Run callbacks outside the critical section, they take their own
        let taken = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            inner.now_ms = inner.now_ms.max(now_ms);
            inner.schedule.take()
        });
        let Some(mut schedule) = taken else {
            return 0;
        };

        let mut fired = 0;
        while schedule.next_due_ms <= now_ms {
            (schedule.on_tick)();
            schedule.next_due_ms += schedule.period_ms.max(1) as u64;
            fired += 1;
        }

        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            // A callback may have replaced or cancelled the schedule meanwhile
            if inner.schedule.is_none() && inner.generation == schedule.generation {
                inner.schedule = Some(schedule);
            }
        });
        fired
    }

    /// Time of the next due tick, if any schedule is live.
    pub fn next_due_ms(&self) -> Option<u64> {
        critical_section::with(|cs| {
            self.inner
                .borrow_ref(cs)
                .schedule
                .as_ref()
                .map(|s| s.next_due_ms)
        })
    }

    /// Number of live schedules (0 or 1).
    pub fn live_schedules(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).schedule.is_some() as usize)
    }
}

impl TickSource for PollTicker {
    type Handle = PollHandle;

    fn start(
        &mut self,
        first_delay_ms: u32,
        period_ms: u32,
        on_tick: TickFn,
    ) -> Result<PollHandle, ClockError> {
        let now = self.time_source.map(|now| now());
        let generation = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if let Some(now) = now {
                inner.now_ms = inner.now_ms.max(now);
            }
            inner.generation = inner.generation.wrapping_add(1);
            let generation = inner.generation;
            let next_due_ms = inner.now_ms + first_delay_ms as u64;
            inner.schedule = Some(Schedule {
                generation,
                next_due_ms,
                period_ms,
                on_tick,
            });
            generation
        });
        Ok(PollHandle {
            inner: self.inner.clone(),
            generation,
        })
    }
}

pub struct PollHandle {
    inner: Arc<Mutex<RefCell<PollInner>>>,
    generation: u32,
}

impl TickHandle for PollHandle {
    fn cancel(&mut self) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.generation == self.generation {
                inner.schedule = None;
                // Invalidate a schedule currently taken out by `poll`
                inner.generation = inner.generation.wrapping_add(1);
            }
        });
    }

    fn is_active(&self) -> bool {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            inner.generation == self.generation
        })
    }
}

// -------------------- thread ticker --------------------

#[cfg(feature = "std")]
pub use threaded::{ThreadHandle, ThreadTicker};

#[cfg(feature = "std")]
mod threaded {
    use super::*;

    use std::sync::mpsc::{self, RecvTimeoutError, Sender};
    use std::thread::{self, JoinHandle};
    use std::time::{Duration, Instant};

    /// Starts one named thread per schedule.
    #[derive(Copy, Clone, Debug, Default)]
    pub struct ThreadTicker;

    impl TickSource for ThreadTicker {
        type Handle = ThreadHandle;

        fn start(
            &mut self,
            first_delay_ms: u32,
            period_ms: u32,
            mut on_tick: TickFn,
        ) -> Result<ThreadHandle, ClockError> {
            let (stop_tx, stop_rx) = mpsc::channel::<()>();
            let period = Duration::from_millis(period_ms.max(1) as u64);
            let first = Duration::from_millis(first_delay_ms as u64);

            let thread = thread::Builder::new()
                .name("clock-ticker".into())
                .spawn(move || {
                    // Fixed rate: deadlines advance by whole periods
                    let mut deadline = Instant::now() + first;
                    loop {
                        let wait = deadline.saturating_duration_since(Instant::now());
                        match stop_rx.recv_timeout(wait) {
                            Err(RecvTimeoutError::Timeout) => {
                                on_tick();
                                deadline += period;
                            }
                            // Sender dropped or explicit stop
                            _ => break,
                        }
                    }
                })
                .map_err(|e| {
                    log::warn!("ticker thread spawn failed: {}", e);
                    ClockError::TickerSpawn
                })?;

            Ok(ThreadHandle {
                stop: Some(stop_tx),
                thread: Some(thread),
            })
        }
    }

    pub struct ThreadHandle {
        stop: Option<Sender<()>>,
        thread: Option<JoinHandle<()>>,
    }

    impl TickHandle for ThreadHandle {
        fn cancel(&mut self) {
            // Disconnecting wakes the sleeping thread
            drop(self.stop.take());
            if let Some(thread) = self.thread.take() {
                if thread.thread().id() != thread::current().id() {
                    let _ = thread.join();
                }
            }
        }

        fn is_active(&self) -> bool {
            self.stop.is_some()
                && self.thread.as_ref().is_some_and(|t| !t.is_finished())
        }
    }

    impl Drop for ThreadHandle {
        fn drop(&mut self) {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    fn counter() -> (Arc<AtomicU32>, TickFn) {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let f: TickFn = Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, f)
    }

    #[test]
    fn first_delay_aligns_to_next_second() {
        assert_eq!(first_tick_delay(0), 1000);
        assert_eq!(first_tick_delay(250), 750);
        assert_eq!(first_tick_delay(999), 1);
    }

    #[test]
    fn poll_fires_on_schedule() {
        let mut ticker = PollTicker::new(10_000);
        let (count, f) = counter();
        let _h = ticker.start(750, 1000, f).unwrap();
        assert_eq!(ticker.poll(10_749), 0);
        assert_eq!(ticker.poll(10_750), 1);
        assert_eq!(ticker.poll(11_749), 0);
        // catches up missed periods
        assert_eq!(ticker.poll(13_750), 3);
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(ticker.next_due_ms(), Some(14_750));
    }

    #[test]
    fn first_delay_counts_from_latest_time() {
        let mut ticker = PollTicker::new(0);
        ticker.set_now(2_250);
        let (count, f) = counter();
        let _h = ticker.start(first_tick_delay(250), TICK_PERIOD_MS, f).unwrap();
        assert_eq!(ticker.next_due_ms(), Some(3_000));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn time_source_anchors_new_schedules() {
        static NOW: AtomicU64 = AtomicU64::new(5_300);

        let mut ticker = PollTicker::new(0).with_time_source(|| NOW.load(Ordering::SeqCst));
        let (_, f) = counter();
        let _h = ticker.start(first_tick_delay(300), TICK_PERIOD_MS, f).unwrap();
        assert_eq!(ticker.next_due_ms(), Some(6_000));

        NOW.store(9_100, Ordering::SeqCst);
        let (_, f) = counter();
        let _h = ticker.start(first_tick_delay(100), TICK_PERIOD_MS, f).unwrap();
        assert_eq!(ticker.next_due_ms(), Some(10_000));
    }

    #[test]
    fn cancelled_schedule_never_fires() {
        let mut ticker = PollTicker::new(0);
        let (count, f) = counter();
        let mut h = ticker.start(1000, 1000, f).unwrap();
        assert!(h.is_active());
        h.cancel();
        assert!(!h.is_active());
        assert_eq!(ticker.poll(5_000), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn slot_keeps_one_live_ticker() {
        let mut ticker = PollTicker::new(0);
        let mut slot = TickerSlot::new();
        let (first, f) = counter();
        slot.replace(ticker.start(1000, 1000, f).unwrap());
        let (second, f) = counter();
        slot.replace(ticker.start(1000, 1000, f).unwrap());

        assert_eq!(ticker.live_schedules(), 1);
        assert!(slot.is_running());
        assert_eq!(ticker.poll(3_000), 3);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 3);

        drop(slot);
        assert_eq!(ticker.live_schedules(), 0);
    }

    #[test]
    fn stale_handle_does_not_cancel_newer_schedule() {
        let mut ticker = PollTicker::new(0);
        let (_, f) = counter();
        let mut old = ticker.start(1000, 1000, f).unwrap();
        let (_, f) = counter();
        let new = ticker.start(1000, 1000, f).unwrap();
        assert!(!old.is_active());
        old.cancel();
        assert!(new.is_active());
        assert_eq!(ticker.live_schedules(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn thread_ticker_runs_and_stops() {
        use std::time::Duration;

        let mut ticker = ThreadTicker;
        let (count, f) = counter();
        let mut h = ticker.start(5, 10, f).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        h.cancel();
        assert!(!h.is_active());
        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 1);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }
}
