//! MPU-6050 I2C Driver Implementation
//!
//! Both sensors hang off one bus handle. Every data read is a single
//! 14-byte burst starting at ACCEL_XOUT_H, so accelerometer and gyroscope
//! values of one sensor always come from the same internal sample.

use super::registers;
use crate::devices::imu::DualImu;
use core::fmt;
use embedded_hal_async::i2c::{Error as _, ErrorKind, I2c};
use smartpt_core::imu::{SensorFrame, SensorId};

/// Bus transaction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The sensor did not acknowledge its address or a data byte
    Nack(SensorId),
    /// Arbitration loss, bus fault or controller error
    Bus(SensorId),
}

impl BusError {
    fn from_kind(sensor: SensorId, kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => BusError::Nack(sensor),
            _ => BusError::Bus(sensor),
        }
    }

    pub fn sensor(&self) -> SensorId {
        match self {
            BusError::Nack(sensor) | BusError::Bus(sensor) => *sensor,
        }
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Nack(sensor) => write!(
                f,
                "sensor {:?} at {:#x} did not acknowledge",
                sensor,
                sensor.address()
            ),
            BusError::Bus(sensor) => write!(
                f,
                "bus error talking to sensor {:?} at {:#x}",
                sensor,
                sensor.address()
            ),
        }
    }
}

/// Startup self-test outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelfTestError {
    /// The sensor answered with all-zero data (missing or miswired)
    WiringFault(SensorId),
    /// The sensor could not be reached at all
    Bus(SensorId),
}

impl SelfTestError {
    pub fn sensor(&self) -> SensorId {
        match self {
            SelfTestError::WiringFault(sensor) | SelfTestError::Bus(sensor) => *sensor,
        }
    }
}

impl fmt::Display for SelfTestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelfTestError::WiringFault(sensor) => {
                write!(f, "sensor {:?} returned all-zero data", sensor)
            }
            SelfTestError::Bus(sensor) => write!(f, "sensor {:?} unreachable", sensor),
        }
    }
}

/// Driver for the two MPU-6050 sensors sharing one I2C bus
pub struct DualMpu6050<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> DualMpu6050<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Access the underlying bus (used by tests to inspect mock state)
    pub fn bus(&self) -> &I2C {
        &self.i2c
    }

    pub fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Release the bus handle
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Write a single register
    pub async fn write_register(
        &mut self,
        sensor: SensorId,
        reg: u8,
        value: u8,
    ) -> Result<(), BusError> {
        self.i2c
            .write(sensor.address(), &[reg, value])
            .await
            .map_err(|e| BusError::from_kind(sensor, e.kind()))
    }

    /// Read consecutive registers starting at `start_reg` in one transaction
    pub async fn read_burst(
        &mut self,
        sensor: SensorId,
        start_reg: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.i2c
            .write_read(sensor.address(), &[start_reg], buf)
            .await
            .map_err(|e| BusError::from_kind(sensor, e.kind()))
    }

    /// Clear the SLEEP bit on both sensors
    pub async fn wake_all(&mut self) -> Result<(), BusError> {
        for sensor in SensorId::ALL {
            self.write_register(sensor, registers::PWR_MGMT_1, registers::PWR_MGMT_1_WAKE)
                .await?;
        }
        Ok(())
    }

    /// Burst-read accelerometer and gyroscope triplets of one sensor
    ///
    /// Register bytes are big-endian; the temperature word is skipped.
    pub async fn read_frame(&mut self, sensor: SensorId) -> Result<SensorFrame, BusError> {
        let mut buf = [0u8; registers::BURST_LEN];
        self.read_burst(sensor, registers::ACCEL_XOUT_H, &mut buf)
            .await?;

        Ok(SensorFrame {
            accel: triplet_be(&buf[registers::BURST_ACCEL_OFFSET..]),
            gyro: triplet_be(&buf[registers::BURST_GYRO_OFFSET..]),
        })
    }

    /// Wake both sensors and verify each returns live data
    ///
    /// An all-zero burst is indistinguishable from a disconnected sensor
    /// feeding silent telemetry, so it is reported as a wiring fault.
    pub async fn self_test(&mut self) -> Result<(), SelfTestError> {
        for sensor in SensorId::ALL {
            self.write_register(sensor, registers::PWR_MGMT_1, registers::PWR_MGMT_1_WAKE)
                .await
                .map_err(|_| SelfTestError::Bus(sensor))?;
            crate::log_info!("Sensor {:?} ({:#x}) woken up", sensor, sensor.address());
        }

        for sensor in SensorId::ALL {
            let frame = self
                .read_frame(sensor)
                .await
                .map_err(|_| SelfTestError::Bus(sensor))?;
            if frame.is_all_zero() {
                crate::log_error!(
                    "Sensor {:?} ({:#x}) returned all zeros, check wiring",
                    sensor,
                    sensor.address()
                );
                return Err(SelfTestError::WiringFault(sensor));
            }
        }

        crate::log_info!("Self-test passed for both sensors");
        Ok(())
    }
}

impl<I2C: I2c> DualImu for DualMpu6050<I2C> {
    async fn read_pair(&mut self) -> Result<(SensorFrame, SensorFrame), BusError> {
        let a = self.read_frame(SensorId::A).await?;
        let b = self.read_frame(SensorId::B).await?;
        Ok((a, b))
    }
}

fn triplet_be(bytes: &[u8]) -> [i16; 3] {
    [
        i16::from_be_bytes([bytes[0], bytes[1]]),
        i16::from_be_bytes([bytes[2], bytes[3]]),
        i16::from_be_bytes([bytes[4], bytes[5]]),
    ]
}
