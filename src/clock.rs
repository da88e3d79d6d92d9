//! Time-of-day state driven by the second ticker.
//!
//! - `ClockState` holds the 12-hour hand positions and the carry law
//! - `WallTime` / `WallClock` are the external time source read on resync
//! - `SharedClock` hands state from the ticker to the draw side
//!
//! The ticker is the only writer of the shared state. Readers take a copy
//! inside a critical section, so a redraw never sees a half-carried time.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;

const SECONDS_PER_MINUTE: u8 = 60;
const MINUTES_PER_HOUR: u8 = 60;
const HOURS_PER_DIAL: u8 = 12;

/// Hand positions: hour 0-11, minute 0-59, second 0-59.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockState {
    hour: u8,
    minute: u8,
    second: u8,
}

impl ClockState {
    /// Out-of-range fields wrap, a 24-hour hour folds onto the dial.
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour: hour % HOURS_PER_DIAL,
            minute: minute % MINUTES_PER_HOUR,
            second: second % SECONDS_PER_MINUTE,
        }
    }

    #[inline]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[inline]
    pub fn second(&self) -> u8 {
        self.second
    }

    /// One second forward, carrying into minutes and hours.
    pub fn advance(&mut self) {
        self.second += 1;
        if self.second == SECONDS_PER_MINUTE {
            self.second = 0;
            self.minute += 1;
            if self.minute == MINUTES_PER_HOUR {
                self.minute = 0;
                self.hour += 1;
                if self.hour == HOURS_PER_DIAL {
                    self.hour = 0;
                }
            }
        }
    }

    pub fn ticked(mut self) -> Self {
        self.advance();
        self
    }
}

impl From<WallTime> for ClockState {
    fn from(t: WallTime) -> Self {
        ClockState::new(t.hour, t.minute, t.second)
    }
}

/// Reading of the wall clock at resync time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u8,  // 0-11
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl WallTime {
    /// Build from a 24-hour reading.
    pub const fn from_hms_milli(hour: u8, minute: u8, second: u8, millisecond: u16) -> Self {
        Self {
            hour: hour % HOURS_PER_DIAL,
            minute: minute % MINUTES_PER_HOUR,
            second: second % SECONDS_PER_MINUTE,
            millisecond: millisecond % 1000,
        }
    }

    /// Time of day of a Unix timestamp in milliseconds (UTC), as kept by a
    /// free-running RTC second counter.
    pub const fn from_unix_millis(ms: u64) -> Self {
        let millisecond = (ms % 1000) as u16;
        let secs = (ms / 1000) % 86_400; // 86400 seconds in a day
        let hour = (secs / 3600) as u8;
        let minute = ((secs % 3600) / 60) as u8;
        let second = (secs % 60) as u8;
        Self::from_hms_milli(hour, minute, second, millisecond)
    }
}

/// External wall-clock source, read once per resize.
pub trait WallClock {
    fn now(&self) -> WallTime;
}

impl<F> WallClock for F
where
    F: Fn() -> WallTime,
{
    fn now(&self) -> WallTime {
        self()
    }
}

/// Always reports the same time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedClock(pub WallTime);

impl WallClock for FixedClock {
    fn now(&self) -> WallTime {
        self.0
    }
}

/// Local time of the host.
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl WallClock for SystemClock {
    fn now(&self) -> WallTime {
        use chrono::Timelike;

        let now = chrono::Local::now();
        // Leap seconds report nanos past 1e9
        let millisecond = (now.nanosecond() / 1_000_000).min(999) as u16;
        WallTime::from_hms_milli(
            now.hour() as u8,
            now.minute() as u8,
            now.second() as u8,
            millisecond,
        )
    }
}

/// State shared between the ticker and the draw side.
pub struct SharedClock {
    state: Mutex<Cell<ClockState>>,
    redraw: AtomicBool,
    ticks: AtomicU32,
}

impl SharedClock {
    pub const fn new(state: ClockState) -> Self {
        Self {
            state: Mutex::new(Cell::new(state)),
            redraw: AtomicBool::new(false),
            ticks: AtomicU32::new(0),
        }
    }

    /// Advance one second, then ask for a redraw.
    pub fn tick(&self) {
        let now = critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let next = cell.get().ticked();
            cell.set(next);
            next
        });
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.redraw.store(true, Ordering::Release);
        log::trace!(
            "tick {:02}:{:02}:{:02}",
            now.hour(),
            now.minute(),
            now.second()
        );
    }

    /// Replace the state wholesale, e.g. after a resize.
    pub fn resync(&self, state: ClockState) {
        critical_section::with(|cs| self.state.borrow(cs).set(state));
        self.redraw.store(true, Ordering::Release);
    }

    pub fn snapshot(&self) -> ClockState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Consume a pending redraw request.
    pub fn take_redraw(&self) -> bool {
        self.redraw.swap(false, Ordering::AcqRel)
    }

    /// Ticks applied since creation.
    pub fn tick_count(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new(ClockState::default())
    }
}
