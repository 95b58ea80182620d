//! MPU-6050 Dual Sensor Driver
//!
//! Only the power-management and data registers are touched. The sensors
//! stay at their power-on full-scale ranges (±2 g, ±250 °/s), which the
//! host-side unit conversion relies on.

mod driver;
pub mod registers;

pub use driver::{BusError, DualMpu6050, SelfTestError};
