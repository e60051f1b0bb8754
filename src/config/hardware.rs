//! Конфигурация аппаратного обеспечения узла IMU

use flight_imu::drivers::imu::DlpfBandwidth;

/// Конфигурация пинов GPIO
///
/// Пины выбираются в `main` через периферию embassy, константы здесь для справки.
#[allow(dead_code)]
pub mod pins {
    /// I2C для IMU
    pub mod i2c {
        /// Пин SDA для I2C0
        pub const SDA_PIN: u8 = 4;  // GPIO4
        /// Пин SCL для I2C0
        pub const SCL_PIN: u8 = 5;  // GPIO5
    }

    /// Дополнительные пины
    pub mod misc {
        /// Встроенный светодиод на Pico
        pub const LED_PIN: u8 = 25;    // GPIO25
    }
}

/// Конфигурация частот и скоростей
pub mod frequencies {
    /// Частота I2C шины (Гц)
    pub const I2C_FREQUENCY: u32 = 400_000; // 400 kHz
}

/// Адресация I2C устройств
pub mod i2c_addresses {
    /// Состояние вывода AD0 MPU6050 (false: 0x68, true: 0x69)
    pub const MPU6050_AD0_HIGH: bool = false;
}

/// Параметры системы
pub mod system {
    /// Частота опроса IMU (Гц)
    pub const IMU_SAMPLE_RATE_HZ: u64 = 100;

    /// Частота вывода телеметрии в лог (Гц)
    pub const TELEMETRY_RATE_HZ: u32 = 5;

    /// Период мигания светодиода (мс)
    pub const HEARTBEAT_PERIOD_MS: u64 = 500;

    /// Ошибок чтения подряд до сообщения о потере датчика
    pub const MAX_CONSECUTIVE_ERRORS: u32 = 100;

    /// Размер канала отсчетов
    pub const SAMPLE_CHANNEL_SIZE: usize = 10;
}

/// Настройки MPU6050
pub mod imu {
    use super::DlpfBandwidth;

    /// Полоса DLPF: 42Hz гироскоп, частота выдачи 1 кГц
    pub const DLPF: DlpfBandwidth = DlpfBandwidth::Bw42Hz;

    /// Количество измерений для калибровки гироскопа
    pub const GYRO_CALIBRATION_SAMPLES: u16 = flight_imu::drivers::imu::DEFAULT_CALIBRATION_SAMPLES;
}
