use crate::config::hardware::system::{IMU_SAMPLE_RATE_HZ, TELEMETRY_RATE_HZ};
use crate::tasks::SAMPLE_CHANNEL;

/// Каждый N-й отсчет попадает в лог
const LOG_DIVIDER: u32 = IMU_SAMPLE_RATE_HZ as u32 / TELEMETRY_RATE_HZ;

/// Задача вывода отсчетов IMU в лог
#[embassy_executor::task]
pub async fn task() {
    let receiver = SAMPLE_CHANNEL.receiver();
    let mut counter = 0u32;

    loop {
        let sample = receiver.receive().await;

        #[cfg(feature = "debug-sensors")]
        defmt::trace!(
            "IMU raw: accel=({}, {}, {}) gyro=({}, {}, {})",
            sample.accel.x,
            sample.accel.y,
            sample.accel.z,
            sample.gyro.x,
            sample.gyro.y,
            sample.gyro.z
        );

        counter += 1;
        if counter < LOG_DIVIDER {
            continue;
        }
        counter = 0;

        defmt::info!(
            "accel=({}, {}, {}) g, gyro=({}, {}, {}) °/s, temp={} °C",
            sample.accel.x,
            sample.accel.y,
            sample.accel.z,
            sample.gyro.x,
            sample.gyro.y,
            sample.gyro.z,
            sample.temp_c
        );
    }
}
