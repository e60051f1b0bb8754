#![cfg_attr(not(test), no_std)]

//! Блокирующий драйвер IMU MPU6050 для полетного контроллера
//!
//! Ядро библиотеки: чтение регистров, перевод в физические единицы,
//! конфигурация диапазонов и калибровка смещения гироскопа.

pub mod logging;

pub mod data;
pub mod drivers;

pub use data::{SensorSample, Vector3};
pub use drivers::bus::RegisterTransport;
pub use drivers::imu::{Mpu6050, Mpu6050Error};
