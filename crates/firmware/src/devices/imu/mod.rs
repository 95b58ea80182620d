//! IMU Drivers
//!
//! The node carries two MPU-6050 sensors on one shared I2C bus, told apart
//! only by their AD0 strap (0x68 / 0x69).
//!
//! ## Available Drivers
//!
//! - `DualMpu6050`: burst-read driver for both sensors, implements [`DualImu`]
//! - `MockBus`: scripted register file implementing the async I2C trait
//!   (tests or `mock` feature)
//!
//! Hardware drivers use `embedded_hal_async::i2c::I2c` trait and are platform-agnostic.
//!
//! ## Usage
//!
//! ```ignore
//! use smartpt_firmware::devices::imu::{DualImu, DualMpu6050};
//!
//! let mut sensors = DualMpu6050::new(i2c);
//! if let Err(fault) = sensors.self_test().await {
//!     fatal_fault_loop(led, delay);
//! }
//! let (a, b) = sensors.read_pair().await?;
//! ```

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod mpu6050;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockBus;
pub use mpu6050::{BusError, DualMpu6050, SelfTestError};

use smartpt_core::imu::SensorFrame;

/// Source of one synchronized read of both sensors
#[allow(async_fn_in_trait)]
pub trait DualImu {
    /// Read sensor A then sensor B
    ///
    /// Fails if either read fails; the caller skips the sample.
    async fn read_pair(&mut self) -> Result<(SensorFrame, SensorFrame), BusError>;
}
