//! Inertial sample types
//!
//! Raw samples carry the sensors' native signed 16-bit register values for
//! both MPU-6050 units on the node. Physical samples are derived on the host
//! by dividing by fixed sensitivities, which assumes the power-on full-scale
//! ranges (±2 g, ±250 °/s) are never reconfigured.

/// Accelerometer sensitivity at ±2 g full scale (LSB per g)
pub const ACCEL_LSB_PER_G: f32 = 16384.0;

/// Gyroscope sensitivity at ±250 °/s full scale (LSB per °/s)
pub const GYRO_LSB_PER_DPS: f32 = 131.0;

/// One of the two sensors sharing the node's I2C bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorId {
    /// AD0 tied low
    A,
    /// AD0 tied high
    B,
}

impl SensorId {
    /// Both sensors in sampling order
    pub const ALL: [SensorId; 2] = [SensorId::A, SensorId::B];

    /// Fixed 7-bit bus address
    pub const fn address(self) -> u8 {
        match self {
            SensorId::A => 0x68,
            SensorId::B => 0x69,
        }
    }
}

/// Raw accelerometer and gyroscope triplets from one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorFrame {
    /// X, Y, Z acceleration (raw LSB)
    pub accel: [i16; 3],
    /// X, Y, Z angular rate (raw LSB)
    pub gyro: [i16; 3],
}

impl SensorFrame {
    /// Convert to physical units using the fixed sensitivities
    pub fn to_physical(&self) -> PhysicalFrame {
        PhysicalFrame {
            accel_g: self.accel.map(|v| v as f32 / ACCEL_LSB_PER_G),
            gyro_dps: self.gyro.map(|v| v as f32 / GYRO_LSB_PER_DPS),
        }
    }

    /// True when every register read back as zero
    ///
    /// A powered, connected MPU-6050 always reports gravity on at least one
    /// accelerometer axis, so an all-zero frame means the sensor is absent.
    pub fn is_all_zero(&self) -> bool {
        self.accel.iter().chain(self.gyro.iter()).all(|&v| v == 0)
    }
}

/// One sampling tick: both sensors plus the session-relative offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InertialSample {
    /// Milliseconds since the session clock anchor, truncated to 16 bits
    pub time_offset_ms: u16,
    pub sensor_a: SensorFrame,
    pub sensor_b: SensorFrame,
}

/// Physical-unit readings of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicalFrame {
    /// Acceleration in g
    pub accel_g: [f32; 3],
    /// Angular rate in °/s
    pub gyro_dps: [f32; 3],
}

/// Host-side sample with the clock offset applied
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicalSample {
    /// Milliseconds since the host sent Start (offset-corrected)
    pub timestamp_ms: u32,
    pub sensor_a: PhysicalFrame,
    pub sensor_b: PhysicalFrame,
}

impl PhysicalSample {
    /// Convert a raw sample whose 16-bit offset has already been extended
    pub fn from_raw(sample: &InertialSample, timestamp_ms: u32) -> Self {
        Self {
            timestamp_ms,
            sensor_a: sample.sensor_a.to_physical(),
            sensor_b: sample.sensor_b.to_physical(),
        }
    }
}
