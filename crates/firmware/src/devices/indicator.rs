//! Fatal fault indicator
//!
//! A wiring fault found by the startup self-test is not recoverable in
//! software. The node stops doing anything else and blinks its status LED
//! until it is power-cycled.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// LED on/off time while signalling a fault
pub const FAULT_BLINK_MS: u32 = 100;

/// Status LED driven as a failure indicator
pub struct FaultIndicator<P, D> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> FaultIndicator<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// One on/off blink cycle
    ///
    /// Pin errors are ignored; there is nothing left to report them to.
    pub fn blink(&mut self) {
        let _ = self.pin.set_high();
        self.delay.delay_ms(FAULT_BLINK_MS);
        let _ = self.pin.set_low();
        self.delay.delay_ms(FAULT_BLINK_MS);
    }
}

/// Blink the failure indicator forever
pub fn fatal_fault_loop<P: OutputPin, D: DelayNs>(pin: P, delay: D) -> ! {
    crate::log_error!("Fatal hardware fault, halting");
    let mut indicator = FaultIndicator::new(pin, delay);
    loop {
        indicator.blink();
    }
}
