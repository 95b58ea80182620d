//! Tick and clock adapters.

/// Fixed-period tick source for the sampling loop.
///
/// `next_tick` resolves once per period.
#[allow(async_fn_in_trait)]
pub trait Metronome {
    /// Wait for the next tick.
    async fn next_tick(&mut self);

    /// Restart the period from now (called when a session is anchored).
    fn reset(&mut self);
}

// ============================================================================
// Embassy Implementation
// ============================================================================

/// Embassy-based time source using the Embassy time driver.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl smartpt_core::traits::TimeSource for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }
}

/// `Metronome` backed by `embassy_time::Ticker`.
#[cfg(feature = "embassy")]
pub struct EmbassyTicker {
    ticker: embassy_time::Ticker,
}

#[cfg(feature = "embassy")]
impl EmbassyTicker {
    pub fn every_ms(period_ms: u32) -> Self {
        Self {
            ticker: embassy_time::Ticker::every(embassy_time::Duration::from_millis(
                period_ms as u64,
            )),
        }
    }
}

#[cfg(feature = "embassy")]
impl Metronome for EmbassyTicker {
    async fn next_tick(&mut self) {
        self.ticker.next().await;
    }

    fn reset(&mut self) {
        self.ticker.reset();
    }
}
