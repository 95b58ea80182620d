//! Session clock anchored at Start

/// Node-local monotonic time captured when Start was received
///
/// Every `time_offset_ms` in a session is measured from this anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionClock {
    anchor_us: u64,
}

impl SessionClock {
    pub const fn anchored_at(anchor_us: u64) -> Self {
        Self { anchor_us }
    }

    pub const fn anchor_us(&self) -> u64 {
        self.anchor_us
    }

    /// Whole milliseconds since the anchor, truncated to 16 bits
    ///
    /// The offset wraps every 65.536 s; the host extends it back to a
    /// monotonic value. Times before the anchor read as zero.
    pub fn offset_ms(&self, now_us: u64) -> u16 {
        (now_us.saturating_sub(self.anchor_us) / 1000) as u16
    }
}
