//! MPU-6050 Register Definitions
//!
//! Based on MPU-6000/MPU-6050 Register Map (RM-MPU-6000A-00 v4.2).

#![allow(dead_code)]

/// Power management 1 (sleep, clock source)
pub const PWR_MGMT_1: u8 = 0x6B;

/// PWR_MGMT_1: wake up, internal 8 MHz oscillator
pub const PWR_MGMT_1_WAKE: u8 = 0x00;

/// PWR_MGMT_1: SLEEP bit, set at power-on
pub const PWR_MGMT_1_SLEEP: u8 = 0x40;

/// First data register; ACCEL_X..Z, TEMP, GYRO_X..Z follow big-endian
pub const ACCEL_XOUT_H: u8 = 0x3B;

/// First gyroscope data register
pub const GYRO_XOUT_H: u8 = 0x43;

/// WHO_AM_I register
pub const WHO_AM_I: u8 = 0x75;

/// Bytes in one accel + temp + gyro burst
pub const BURST_LEN: usize = 14;

/// Offset of the accelerometer triplet inside a burst
pub const BURST_ACCEL_OFFSET: usize = 0;

/// Offset of the gyroscope triplet inside a burst (after the temperature word)
pub const BURST_GYRO_OFFSET: usize = (GYRO_XOUT_H - ACCEL_XOUT_H) as usize;
