//! Mock I2C bus with two MPU-6050 register files
//!
//! Records register writes into a per-sensor register image and serves
//! burst reads from it, so the real `DualMpu6050` driver can be exercised
//! without hardware.
//!
//! ## Usage
//!
//! ```ignore
//! use smartpt_firmware::devices::imu::{DualMpu6050, MockBus};
//!
//! let mut bus = MockBus::new();
//! bus.set_frame(SensorId::A, frame);
//! bus.fail_data_read(4); // fifth burst read fails
//! let mut sensors = DualMpu6050::new(bus);
//! ```

use super::mpu6050::registers;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use heapless::Vec;
use smartpt_core::imu::{SensorFrame, SensorId};

/// Size of the emulated register address space
const REGISTER_SPACE: usize = 128;

/// Maximum number of scheduled read failures
const MAX_FAILURES: usize = 16;

struct SensorImage {
    registers: [u8; REGISTER_SPACE],
    attached: bool,
}

impl SensorImage {
    fn power_on() -> Self {
        let mut regs = [0u8; REGISTER_SPACE];
        regs[registers::PWR_MGMT_1 as usize] = registers::PWR_MGMT_1_SLEEP;
        regs[registers::WHO_AM_I as usize] = 0x68;
        Self {
            registers: regs,
            attached: true,
        }
    }

    fn asleep(&self) -> bool {
        self.registers[registers::PWR_MGMT_1 as usize] & registers::PWR_MGMT_1_SLEEP != 0
    }

    fn read(&self, reg: usize) -> u8 {
        let is_data = (registers::ACCEL_XOUT_H as usize
            ..registers::ACCEL_XOUT_H as usize + registers::BURST_LEN)
            .contains(&reg);
        // A sleeping sensor does not update its data registers
        if is_data && self.asleep() {
            0
        } else {
            self.registers[reg % REGISTER_SPACE]
        }
    }

    fn write(&mut self, reg: usize, value: u8) {
        self.registers[reg % REGISTER_SPACE] = value;
    }

    fn put_word(&mut self, reg: usize, value: i16) {
        let [hi, lo] = value.to_be_bytes();
        self.write(reg, hi);
        self.write(reg + 1, lo);
    }
}

/// Scripted I2C bus hosting sensor A (0x68) and sensor B (0x69)
pub struct MockBus {
    sensors: [SensorImage; 2],
    data_reads: usize,
    failures: Vec<usize, MAX_FAILURES>,
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBus {
    /// Both sensors attached, asleep, with zeroed data registers
    pub fn new() -> Self {
        Self {
            sensors: [SensorImage::power_on(), SensorImage::power_on()],
            data_reads: 0,
            failures: Vec::new(),
        }
    }

    fn image(&self, sensor: SensorId) -> &SensorImage {
        match sensor {
            SensorId::A => &self.sensors[0],
            SensorId::B => &self.sensors[1],
        }
    }

    fn image_mut(&mut self, sensor: SensorId) -> &mut SensorImage {
        match sensor {
            SensorId::A => &mut self.sensors[0],
            SensorId::B => &mut self.sensors[1],
        }
    }

    fn lookup(address: u8) -> Option<SensorId> {
        SensorId::ALL.into_iter().find(|s| s.address() == address)
    }

    /// Load accelerometer and gyroscope data registers
    pub fn set_frame(&mut self, sensor: SensorId, frame: SensorFrame) {
        let image = self.image_mut(sensor);
        let accel = registers::ACCEL_XOUT_H as usize;
        let gyro = registers::GYRO_XOUT_H as usize;
        for axis in 0..3 {
            image.put_word(accel + axis * 2, frame.accel[axis]);
            image.put_word(gyro + axis * 2, frame.gyro[axis]);
        }
    }

    /// Load the temperature word between the accel and gyro blocks
    pub fn set_temperature(&mut self, sensor: SensorId, raw: i16) {
        let reg = registers::ACCEL_XOUT_H as usize + 6;
        self.image_mut(sensor).put_word(reg, raw);
    }

    /// Stop acknowledging the sensor's address
    pub fn detach(&mut self, sensor: SensorId) {
        self.image_mut(sensor).attached = false;
    }

    /// Fail the `index`-th read transaction (zero-based, across both sensors)
    pub fn fail_data_read(&mut self, index: usize) {
        let _ = self.failures.push(index);
    }

    /// Number of read transactions served or failed so far
    pub fn data_reads(&self) -> usize {
        self.data_reads
    }

    /// Current register value
    pub fn register(&self, sensor: SensorId, reg: u8) -> u8 {
        self.image(sensor).registers[reg as usize % REGISTER_SPACE]
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c for MockBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let sensor = Self::lookup(address)
            .filter(|s| self.image(*s).attached)
            .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;

        if operations
            .iter()
            .any(|op| matches!(op, Operation::Read(_)))
        {
            let index = self.data_reads;
            self.data_reads += 1;
            if self.failures.contains(&index) {
                return Err(ErrorKind::Bus);
            }
        }

        let image = self.image_mut(sensor);
        let mut pointer = 0usize;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&reg, values)) = bytes.split_first() {
                        pointer = reg as usize;
                        for &value in values {
                            image.write(pointer, value);
                            pointer += 1;
                        }
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = image.read(pointer);
                        pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}
