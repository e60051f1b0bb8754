#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, Config as I2cConfig};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

mod config;
mod tasks;

use crate::config::hardware::frequencies::I2C_FREQUENCY;
use crate::config::hardware::system::HEARTBEAT_PERIOD_MS;
use crate::tasks::*;

/// Точка входа в программу
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Инициализация HAL Raspberry Pi Pico
    let p = embassy_rp::init(Default::default());

    defmt::info!("=== Узел IMU v0.1.0 ===");

    // Настройка светодиода для индикации состояния
    let mut led = Output::new(p.PIN_25, Level::Low);

    // Инициализация I2C для IMU
    let i2c = {
        let sda = p.PIN_4; // GPIO4 - SDA
        let scl = p.PIN_5; // GPIO5 - SCL

        let mut config = I2cConfig::default();
        config.frequency = I2C_FREQUENCY;

        i2c::I2c::new_blocking(p.I2C0, scl, sda, config)
    };

    // Задача опроса датчиков
    spawner.spawn(sensor_task::task(i2c)).unwrap();

    // Задача телеметрии
    spawner.spawn(telemetry_task::task()).unwrap();

    defmt::info!("Система инициализирована");

    // Мигание светодиодом в нормальном режиме
    loop {
        led.toggle();
        Timer::after(Duration::from_millis(HEARTBEAT_PERIOD_MS)).await;
    }
}
