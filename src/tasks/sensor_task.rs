use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Ticker};

use flight_imu::Mpu6050;

use crate::config::hardware::i2c_addresses::MPU6050_AD0_HIGH;
use crate::config::hardware::imu::{DLPF, GYRO_CALIBRATION_SAMPLES};
use crate::config::hardware::system::{IMU_SAMPLE_RATE_HZ, MAX_CONSECUTIVE_ERRORS};
use crate::tasks::SAMPLE_CHANNEL;

/// Задача опроса IMU
///
/// Единственный владелец шины и драйвера.
#[embassy_executor::task]
pub async fn task(mut i2c: I2c<'static, I2C0, Blocking>) {
    let mut imu = Mpu6050::new(MPU6050_AD0_HIGH);

    if !imu.is_connected(&mut i2c) {
        defmt::error!("MPU6050 не отвечает на адресе 0x{:02x}", imu.address());
        return;
    }

    if let Err(e) = imu.check_identity(&mut i2c) {
        defmt::error!("Ошибка проверки MPU6050: {}", e);
        return;
    }

    // Инициализация IMU
    if let Err(e) = imu.init(&mut i2c) {
        defmt::error!("Ошибка инициализации IMU: {}", e);
        return;
    }

    if let Err(e) = imu.configure_low_pass_filter(&mut i2c, DLPF) {
        defmt::warn!("DLPF не настроен: {}", e);
    }

    // === Калибровка гироскопа ===
    // Блокирующая: Delay занимает исполнитель на GYRO_CALIBRATION_SAMPLES мс,
    // светодиод и телеметрия стоят до ее окончания. Канал еще пуст.
    defmt::info!("Калибровка IMU, не двигайте устройство...");
    match imu.calibrate_gyro(&mut i2c, &mut Delay, GYRO_CALIBRATION_SAMPLES) {
        Ok(_) => defmt::info!("Калибровка завершена"),
        Err(e) => defmt::warn!("Калибровка не выполнена: {}", e),
    }

    let sender = SAMPLE_CHANNEL.sender();

    // === Основной цикл опроса ===
    let mut ticker = Ticker::every(Duration::from_hz(IMU_SAMPLE_RATE_HZ));
    let mut error_count = 0u32;

    loop {
        ticker.next().await;

        // Все каналы одной транзакцией
        match imu.read_batch_data(&mut i2c) {
            Ok(sample) => {
                error_count = 0;

                if sender.try_send(sample).is_err() {
                    defmt::trace!("Буфер канала IMU переполнен");
                }
            }
            Err(e) => {
                error_count = error_count.saturating_add(1);
                defmt::warn!("Ошибка чтения IMU: {}", e);

                if error_count == MAX_CONSECUTIVE_ERRORS {
                    defmt::error!("Слишком много ошибок IMU подряд: {}", error_count);
                }
            }
        }
    }
}
