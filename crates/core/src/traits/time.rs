//! Time abstraction traits for platform-agnostic session timing.
//!
//! This module provides the `TimeSource` trait that abstracts over different
//! monotonic clocks (Embassy `Instant`, mock) so the sampling and session
//! logic can be tested on the host with fully deterministic time.

use core::cell::Cell;

/// Platform-agnostic monotonic time source.
///
/// This trait abstracts over different time providers:
/// - `EmbassyClock` (in firmware crate) for the sensor node
/// - `MockTime` for host testing with controllable time
///
/// # Example
///
/// ```
/// use smartpt_core::traits::{TimeSource, MockTime};
///
/// fn due<T: TimeSource>(time: &T, last_tick_us: u64, period_us: u64) -> bool {
///     time.elapsed_since(last_tick_us) >= period_us
/// }
///
/// let time = MockTime::new();
/// time.advance(10_000);
/// assert!(due(&time, 0, 10_000));
/// ```
pub trait TimeSource: Clone + Send + Sync {
    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction to handle potential overflow.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// A shared reference to a clock is itself a clock.
///
/// Lets a test hand the same `MockTime` to both the code under test and the
/// tick source that advances it.
impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// Cloning copies the current reading; share one instance by reference
/// when several components must observe the same clock.
///
/// # Example
///
/// ```
/// use smartpt_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_us(), 0);
///
/// time.advance(10_000); // one 100 Hz sampling tick
/// assert_eq!(time.now_ms(), 10);
/// ```
#[derive(Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

// Safety: MockTime is only used in single-threaded test contexts
// where Cell is safe. The Send+Sync bounds on TimeSource trait
// are required for embedded contexts, but MockTime is not used there.
unsafe impl Send for MockTime {}
unsafe impl Sync for MockTime {}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by the specified amount.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
