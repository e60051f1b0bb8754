pub(crate) mod mpu6050;
mod compat;

#[cfg(test)]
pub(crate) mod testing;

pub use mpu6050::{
    convert, convert_temp_c, AccelRange, ClockSource, DlpfBandwidth, GyroRange, Mpu6050,
    Mpu6050Error, DEFAULT_CALIBRATION_SAMPLES, MPU6050_ADDR, MPU6050_ADDR_ALT,
};
