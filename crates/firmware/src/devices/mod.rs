//! Device drivers
//!
//! - `imu`: dual MPU-6050 bus access layer and startup self-test
//! - `indicator`: fatal fault indicator loop

pub mod imu;
pub mod indicator;

pub use indicator::{fatal_fault_loop, FaultIndicator};
