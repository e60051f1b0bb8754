//! Режим совместимости со старой прошивкой
//!
//! Ошибка шины не возвращается, а заменяется фиксированным значением:
//! нулевой вектор, NaN или вектор `-gyro_bias`. Нужен для сравнения
//! поведения при миграции, новый код должен использовать методы с `Result`.

use super::mpu6050::Mpu6050;
use crate::data::{SensorSample, Vector3};
use crate::drivers::bus::RegisterTransport;

impl Mpu6050 {
    /// Ускорение в g или нулевой вектор при ошибке
    pub fn read_accel_or_zero<B: RegisterTransport>(&self, bus: &mut B) -> Vector3 {
        self.read_accel(bus).unwrap_or_else(|_| Vector3::zeros())
    }

    /// Угловая скорость или `-gyro_bias` при ошибке
    ///
    /// Смещение вычитается и из нулевого вектора неудачного чтения.
    pub fn read_gyro_or_bias<B: RegisterTransport>(&self, bus: &mut B) -> Vector3 {
        self.read_gyro(bus).unwrap_or_else(|_| -self.gyro_bias())
    }

    /// Температура в °C или NaN при ошибке
    pub fn read_temp_c_or_nan<B: RegisterTransport>(&self, bus: &mut B) -> f64 {
        self.read_temp_c(bus).unwrap_or(f64::NAN)
    }

    /// Пакет данных или нулевой отсчет (гироскоп `-gyro_bias`) при ошибке
    pub fn read_batch_data_or_default<B: RegisterTransport>(&self, bus: &mut B) -> SensorSample {
        self.read_batch_data(bus).unwrap_or_else(|_| SensorSample {
            gyro: -self.gyro_bias(),
            ..SensorSample::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::data::Vector3;
    use crate::drivers::imu::mpu6050::{regs, Mpu6050, MPU6050_ADDR};
    use crate::drivers::imu::testing::{calibrate_on_constant, FakeI2c};

    #[test]
    fn test_sentinels_on_bus_failure() {
        let mut bus = FakeI2c::new(MPU6050_ADDR);
        let mut imu = Mpu6050::new(false);
        let bias = calibrate_on_constant(&mut imu, &mut bus, [32, -192, 384]);
        assert!(bias.x > 0.0 && bias.y < 0.0 && bias.z > 0.0);

        bus.fail_next(4);
        assert_eq!(imu.read_accel_or_zero(&mut bus), Vector3::zeros());
        assert!(imu.read_temp_c_or_nan(&mut bus).is_nan());
        assert_eq!(imu.read_gyro_or_bias(&mut bus), -bias);

        let sample = imu.read_batch_data_or_default(&mut bus);
        assert_eq!(sample.accel, Vector3::zeros());
        assert_eq!(sample.temp_c, 0.0);
        assert_eq!(sample.gyro, -bias);
    }

    #[test]
    fn test_zero_bias_failure_is_zero_vector() {
        let mut bus = FakeI2c::new(MPU6050_ADDR);
        let imu = Mpu6050::new(false);

        bus.fail_next(1);
        assert_eq!(imu.read_gyro_or_bias(&mut bus), Vector3::zeros());
    }

    #[test]
    fn test_success_passes_through() {
        let mut bus = FakeI2c::new(MPU6050_ADDR);
        let imu = Mpu6050::new(false);

        bus.set_registers(
            regs::ACCEL_XOUT_H,
            &[0x7F, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7F, 0xFF],
        );

        assert_eq!(imu.read_accel_or_zero(&mut bus), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(imu.read_gyro_or_bias(&mut bus), Vector3::new(0.0, 0.0, 250.0));
        assert_eq!(imu.read_temp_c_or_nan(&mut bus), 36.53);

        let sample = imu.read_batch_data_or_default(&mut bus);
        assert_eq!(sample.accel, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(sample.gyro, Vector3::new(0.0, 0.0, 250.0));
    }
}
