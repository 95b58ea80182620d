//! smartpt_core - Pure no_std acquisition logic for the SmartPT motion tracker
//!
//! This crate contains the platform-agnostic pieces shared by the sensor
//! node firmware and the host link client. Everything here can be tested on
//! the host without feature flags or an embedded runtime.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No behavior differs between firmware and host builds
//! - **Pure no_std**: No std library or allocator dependencies
//! - **Trait abstractions**: Clocks are injected via [`traits::TimeSource`]
//!
//! # Modules
//!
//! - [`imu`]: Raw and physical-unit inertial sample types
//! - [`protocol`]: 82-byte telemetry packet codec, commands, GATT identity
//! - [`session`]: Node Idle/Running state machine, session clock, batching
//! - [`align`]: Frame-indexed alignment of independently clocked streams
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)

#![no_std]

pub mod align;
pub mod imu;
pub mod protocol;
pub mod session;
pub mod traits;
