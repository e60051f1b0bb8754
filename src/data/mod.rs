//! Типы данных IMU

/// Трехкомпонентный вектор: ускорение (g), угловая скорость (°/с) или накопленная сумма
pub type Vector3 = nalgebra::Vector3<f64>;

/// Один отсчет MPU6050
///
/// Все три канала защелкнуты устройством в один и тот же момент,
/// если были прочитаны одной транзакцией (см. `Mpu6050::read_batch_data`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Ускорение в g
    pub accel: Vector3,
    /// Температура кристалла в °C
    pub temp_c: f64,
    /// Угловая скорость в °/с (за вычетом смещения)
    pub gyro: Vector3,
}

impl Default for SensorSample {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            temp_c: 0.0,
            gyro: Vector3::zeros(),
        }
    }
}
