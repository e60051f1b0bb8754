//! Блокирующий драйвер MPU6050 (акселерометр + гироскоп + температура)
//!
//! Datasheet: MPU-6000/MPU-6050 Product Specification, Register Map rev 4.2

use embedded_hal::delay::DelayNs;

use crate::data::{SensorSample, Vector3};
use crate::drivers::bus::RegisterTransport;

/// Адрес MPU6050 на шине I2C (AD0 = LOW)
pub const MPU6050_ADDR: u8 = 0x68;
/// Альтернативный адрес MPU6050 (AD0 = HIGH)
pub const MPU6050_ADDR_ALT: u8 = 0x69;

/// Ожидаемое содержимое WHO_AM_I
const WHO_AM_I_VALUE: u8 = 0x68;

/// Делитель сырых значений. Положительный максимум i16 для обоих знаков,
/// как в документации производителя.
const RAW_FULL_SCALE: f64 = i16::MAX as f64;

/// Температура в °C = TEMP_OUT / 340 + 36.53
const TEMP_SENSITIVITY: f64 = 340.0;
const TEMP_OFFSET_C: f64 = 36.53;

/// Количество выборок для калибровки гироскопа по умолчанию
pub const DEFAULT_CALIBRATION_SAMPLES: u16 = 1000;

/// Пауза между выборками калибровки (частота выдачи данных 1 кГц)
const CALIBRATION_SAMPLE_DELAY_MS: u32 = 1;

/// Регистры MPU6050
pub(crate) mod regs {
    pub const CONFIG: u8 = 0x1A;           // Конфигурация (DLPF)
    pub const GYRO_CONFIG: u8 = 0x1B;     // Конфигурация гироскопа
    pub const ACCEL_CONFIG: u8 = 0x1C;    // Конфигурация акселерометра
    pub const INT_STATUS: u8 = 0x3A;      // Статус прерываний
    pub const PWR_MGMT_1: u8 = 0x6B;      // Управление питанием
    pub const WHO_AM_I: u8 = 0x75;        // Идентификатор устройства

    // Регистры данных (идут подряд: accel 6, temp 2, gyro 6)
    pub const ACCEL_XOUT_H: u8 = 0x3B;    // Старший байт X акселерометра
    pub const TEMP_OUT_H: u8 = 0x41;      // Старший байт температуры
    pub const GYRO_XOUT_H: u8 = 0x43;     // Старший байт X гироскопа
}

/// Маски битовых полей
mod masks {
    /// DLPF_CFG, биты 0-2 регистра CONFIG
    pub const DLPF_CFG: u8 = 0b0000_0111;
    /// FS_SEL / AFS_SEL, биты 3-4
    pub const FULL_SCALE: u8 = 0b0001_1000;
    /// SLEEP (бит 6) и CLKSEL (биты 0-2) в PWR_MGMT_1
    pub const POWER: u8 = 0b0100_0111;
    pub const SLEEP: u8 = 0b0100_0000;
    /// DATA_RDY_INT в INT_STATUS
    pub const DATA_READY: u8 = 0b0000_0001;
}

/// Длины транзакций чтения
const VECTOR_LEN: usize = 6;
const TEMP_LEN: usize = 2;
const BATCH_LEN: usize = VECTOR_LEN + TEMP_LEN + VECTOR_LEN;

/// Диапазон измерения акселерометра (значения уже сдвинуты в биты 3-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    /// ±2g
    G2 = 0x00,
    /// ±4g
    G4 = 0x08,
    /// ±8g
    G8 = 0x10,
    /// ±16g
    G16 = 0x18,
}

impl AccelRange {
    /// Полная шкала в g
    pub const fn full_scale_g(self) -> f64 {
        match self {
            AccelRange::G2 => 2.0,
            AccelRange::G4 => 4.0,
            AccelRange::G8 => 8.0,
            AccelRange::G16 => 16.0,
        }
    }
}

/// Диапазон измерения гироскопа (значения уже сдвинуты в биты 3-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
    /// ±250°/s
    Deg250 = 0x00,
    /// ±500°/s
    Deg500 = 0x08,
    /// ±1000°/s
    Deg1000 = 0x10,
    /// ±2000°/s
    Deg2000 = 0x18,
}

impl GyroRange {
    /// Полная шкала в °/с
    pub const fn full_scale_dps(self) -> f64 {
        match self {
            GyroRange::Deg250 => 250.0,
            GyroRange::Deg500 => 500.0,
            GyroRange::Deg1000 => 1000.0,
            GyroRange::Deg2000 => 2000.0,
        }
    }
}

/// Полоса пропускания DLPF (частоты гироскопа)
///
/// Любое значение кроме `Off` снижает внутреннюю частоту гироскопа с 8 кГц до 1 кГц.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DlpfBandwidth {
    /// Фильтр выключен (256Hz)
    Off = 0,
    Bw188Hz = 1,
    Bw98Hz = 2,
    Bw42Hz = 3,
    Bw20Hz = 4,
    Bw10Hz = 5,
    Bw5Hz = 6,
}

/// Источник тактирования (CLKSEL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Внутренний генератор 8 МГц
    Internal8MHz = 0,
    /// PLL от гироскопа X (точнее внутреннего генератора)
    PllGyroX = 1,
    PllGyroY = 2,
    PllGyroZ = 3,
    /// PLL от внешнего 32.768 кГц
    PllExternal32kHz = 4,
    /// PLL от внешнего 19.2 МГц
    PllExternal19MHz = 5,
    /// Генератор остановлен
    Stopped = 7,
}

/// Ошибки работы с MPU6050
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mpu6050Error<E> {
    /// Ошибка шины (таймаут, NACK)
    Bus(E),
    /// Неверный идентификатор устройства
    InvalidDevice(u8),
    /// Калибровка запрошена без выборок
    NoSamples,
}

impl<E: core::fmt::Debug> core::fmt::Display for Mpu6050Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Mpu6050Error::Bus(e) => write!(f, "MPU6050: bus error: {:?}", e),
            Mpu6050Error::InvalidDevice(id) => write!(f, "MPU6050: invalid device ID 0x{:02x}", id),
            Mpu6050Error::NoSamples => write!(f, "MPU6050: calibration requested with zero samples"),
        }
    }
}

// Реализация Format для defmt
#[cfg(feature = "defmt")]
impl<E: core::fmt::Debug> defmt::Format for Mpu6050Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Mpu6050Error::Bus(e) => defmt::write!(fmt, "MPU6050: bus error: {}", defmt::Debug2Format(e)),
            Mpu6050Error::InvalidDevice(id) => defmt::write!(fmt, "MPU6050: invalid device ID 0x{:02x}", id),
            Mpu6050Error::NoSamples => defmt::write!(fmt, "MPU6050: zero calibration samples"),
        }
    }
}

/// Перевод сырого значения в физические единицы: `raw * full_scale / 32767`
#[inline]
pub fn convert(raw: i16, full_scale: f64) -> f64 {
    raw as f64 * full_scale / RAW_FULL_SCALE
}

/// Перевод сырого значения температуры в °C
#[inline]
pub fn convert_temp_c(raw: i16) -> f64 {
    raw as f64 / TEMP_SENSITIVITY + TEMP_OFFSET_C
}

/// Старший байт первым
#[inline]
fn pack_bytes_signed(high: u8, low: u8) -> i16 {
    i16::from_be_bytes([high, low])
}

/// Три оси из шести байт (X_H, X_L, Y_H, Y_L, Z_H, Z_L)
fn vector_from_bytes(bytes: &[u8], full_scale: f64) -> Vector3 {
    Vector3::new(
        convert(pack_bytes_signed(bytes[0], bytes[1]), full_scale),
        convert(pack_bytes_signed(bytes[2], bytes[3]), full_scale),
        convert(pack_bytes_signed(bytes[4], bytes[5]), full_scale),
    )
}

/// Драйвер MPU6050
///
/// Хранит только состояние конфигурации; шина передается в каждую операцию.
#[derive(Debug, Clone)]
pub struct Mpu6050 {
    /// Адрес устройства (7 бит)
    addr: u8,
    /// Диапазон акселерометра
    accel_range: AccelRange,
    /// Диапазон гироскопа
    gyro_range: GyroRange,
    /// Смещение нуля гироскопа, °/с
    gyro_bias: Vector3,
}

impl Mpu6050 {
    /// Создание нового экземпляра драйвера
    ///
    /// `alternate_addr` соответствует состоянию вывода AD0. Диапазоны по умолчанию
    /// (±2g, ±250°/s) попадают в устройство только после `init` или `configure_*`.
    pub fn new(alternate_addr: bool) -> Self {
        Self {
            addr: if alternate_addr { MPU6050_ADDR_ALT } else { MPU6050_ADDR },
            accel_range: AccelRange::G2,
            gyro_range: GyroRange::Deg250,
            gyro_bias: Vector3::zeros(),
        }
    }

    pub fn address(&self) -> u8 {
        self.addr
    }

    pub fn accel_range(&self) -> AccelRange {
        self.accel_range
    }

    pub fn gyro_range(&self) -> GyroRange {
        self.gyro_range
    }

    pub fn gyro_bias(&self) -> Vector3 {
        self.gyro_bias
    }

    /// Инициализация MPU6050
    ///
    /// Тактирование от гироскопа X без сна, затем самые чувствительные диапазоны.
    /// При ошибке на любом шаге последовательность прерывается без отката.
    pub fn init<B: RegisterTransport>(&mut self, bus: &mut B) -> Result<(), Mpu6050Error<B::Error>> {
        // Тактирование от гироскопа точнее внутреннего генератора
        self.configure_power(bus, false, ClockSource::PllGyroX)?;

        self.configure_accel_range(bus, AccelRange::G2)?;
        self.configure_gyro_range(bus, GyroRange::Deg250)?;

        crate::log_info!("MPU6050 (0x{:02x}) инициализирован", self.addr);
        Ok(())
    }

    /// Проверка ответа устройства на своем адресе
    pub fn is_connected<B: RegisterTransport>(&self, bus: &mut B) -> bool {
        bus.probe(self.addr).is_ok()
    }

    /// Чтение регистра WHO_AM_I
    pub fn who_am_i<B: RegisterTransport>(&self, bus: &mut B) -> Result<u8, Mpu6050Error<B::Error>> {
        let [id] = self.fetch::<B, 1>(bus, regs::WHO_AM_I)?;
        Ok(id)
    }

    /// Проверка идентификатора устройства
    pub fn check_identity<B: RegisterTransport>(&self, bus: &mut B) -> Result<(), Mpu6050Error<B::Error>> {
        let id = self.who_am_i(bus)?;
        if id != WHO_AM_I_VALUE {
            crate::log_error!("Неверный ID устройства: 0x{:02x}", id);
            return Err(Mpu6050Error::InvalidDevice(id));
        }
        Ok(())
    }

    /// Проверка готовности новых данных
    pub fn data_ready<B: RegisterTransport>(&self, bus: &mut B) -> Result<bool, Mpu6050Error<B::Error>> {
        let [status] = self.fetch::<B, 1>(bus, regs::INT_STATUS)?;
        Ok(status & masks::DATA_READY != 0)
    }

    /// Настройка цифрового ФНЧ (DLPF_CFG в CONFIG)
    pub fn configure_low_pass_filter<B: RegisterTransport>(
        &mut self,
        bus: &mut B,
        bandwidth: DlpfBandwidth,
    ) -> Result<(), Mpu6050Error<B::Error>> {
        self.update_register(bus, regs::CONFIG, bandwidth as u8, masks::DLPF_CFG)
    }

    /// Установка диапазона измерения гироскопа
    ///
    /// Кэшированный диапазон меняется только после успешной записи.
    pub fn configure_gyro_range<B: RegisterTransport>(
        &mut self,
        bus: &mut B,
        range: GyroRange,
    ) -> Result<(), Mpu6050Error<B::Error>> {
        self.update_register(bus, regs::GYRO_CONFIG, range as u8, masks::FULL_SCALE)?;
        self.gyro_range = range;
        Ok(())
    }

    /// Установка диапазона измерения акселерометра
    ///
    /// Кэшированный диапазон меняется только после успешной записи.
    pub fn configure_accel_range<B: RegisterTransport>(
        &mut self,
        bus: &mut B,
        range: AccelRange,
    ) -> Result<(), Mpu6050Error<B::Error>> {
        self.update_register(bus, regs::ACCEL_CONFIG, range as u8, masks::FULL_SCALE)?;
        self.accel_range = range;
        Ok(())
    }

    /// Настройка PWR_MGMT_1: бит сна и источник тактирования
    pub fn configure_power<B: RegisterTransport>(
        &mut self,
        bus: &mut B,
        enable_sleep: bool,
        clock: ClockSource,
    ) -> Result<(), Mpu6050Error<B::Error>> {
        let sleep = if enable_sleep { masks::SLEEP } else { 0 };
        self.update_register(bus, regs::PWR_MGMT_1, sleep | clock as u8, masks::POWER)
    }

    /// Ускорение в g
    pub fn read_accel<B: RegisterTransport>(&self, bus: &mut B) -> Result<Vector3, Mpu6050Error<B::Error>> {
        let buf = self.fetch::<B, VECTOR_LEN>(bus, regs::ACCEL_XOUT_H)?;
        Ok(vector_from_bytes(&buf, self.accel_range.full_scale_g()))
    }

    /// Угловая скорость в °/с за вычетом смещения
    pub fn read_gyro<B: RegisterTransport>(&self, bus: &mut B) -> Result<Vector3, Mpu6050Error<B::Error>> {
        let buf = self.fetch::<B, VECTOR_LEN>(bus, regs::GYRO_XOUT_H)?;
        Ok(vector_from_bytes(&buf, self.gyro_range.full_scale_dps()) - self.gyro_bias)
    }

    /// Температура кристалла в °C
    pub fn read_temp_c<B: RegisterTransport>(&self, bus: &mut B) -> Result<f64, Mpu6050Error<B::Error>> {
        let [high, low] = self.fetch::<B, TEMP_LEN>(bus, regs::TEMP_OUT_H)?;
        Ok(convert_temp_c(pack_bytes_signed(high, low)))
    }

    /// Чтение всех 14 байт данных одной транзакцией (с ACCEL_XOUT_H по GYRO_ZOUT_L)
    ///
    /// Только так все каналы гарантированно относятся к одному отсчету.
    pub fn read_batch_data<B: RegisterTransport>(
        &self,
        bus: &mut B,
    ) -> Result<SensorSample, Mpu6050Error<B::Error>> {
        let buf = self.fetch::<B, BATCH_LEN>(bus, regs::ACCEL_XOUT_H)?;

        let (accel, rest) = buf.split_at(VECTOR_LEN);
        let (temp, gyro) = rest.split_at(TEMP_LEN);

        Ok(SensorSample {
            accel: vector_from_bytes(accel, self.accel_range.full_scale_g()),
            temp_c: convert_temp_c(pack_bytes_signed(temp[0], temp[1])),
            gyro: vector_from_bytes(gyro, self.gyro_range.full_scale_dps()) - self.gyro_bias,
        })
    }

    /// Калибровка гироскопа (определение смещения нуля)
    ///
    /// Устройство должно быть неподвижно. Смещение сбрасывается, затем берется
    /// среднее `samples` показаний. Неудачное чтение дает в сумму нулевой вектор.
    pub fn calibrate_gyro<B, D>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        samples: u16,
    ) -> Result<Vector3, Mpu6050Error<B::Error>>
    where
        B: RegisterTransport,
        D: DelayNs,
    {
        if samples == 0 {
            return Err(Mpu6050Error::NoSamples);
        }

        crate::log_info!("Начало калибровки гироскопа, {} измерений", samples);

        self.gyro_bias = Vector3::zeros();
        let mut running_sum = Vector3::zeros();
        let mut failed = 0u16;

        for _ in 0..samples {
            match self.read_gyro(bus) {
                Ok(rate) => running_sum += rate,
                Err(_) => failed += 1,
            }
            delay.delay_ms(CALIBRATION_SAMPLE_DELAY_MS);
        }

        if failed > 0 {
            crate::log_warn!("Калибровка: {} из {} измерений не прочитаны", failed, samples);
        }

        self.gyro_bias = running_sum / samples as f64;

        crate::log_info!(
            "Калибровка завершена. Смещения: X={}, Y={}, Z={}",
            self.gyro_bias.x,
            self.gyro_bias.y,
            self.gyro_bias.z
        );

        Ok(self.gyro_bias)
    }

    /// Чтение нескольких регистров подряд в локальный буфер
    fn fetch<B: RegisterTransport, const N: usize>(
        &self,
        bus: &mut B,
        start: u8,
    ) -> Result<[u8; N], Mpu6050Error<B::Error>> {
        let mut buf = [0u8; N];
        bus.read_registers(self.addr, start, &mut buf)
            .map_err(Mpu6050Error::Bus)?;
        Ok(buf)
    }

    /// Запись битового поля по маске (read-modify-write)
    ///
    /// При ошибке чтения запись не выполняется.
    fn update_register<B: RegisterTransport>(
        &self,
        bus: &mut B,
        reg: u8,
        value: u8,
        mask: u8,
    ) -> Result<(), Mpu6050Error<B::Error>> {
        let [current] = self.fetch::<B, 1>(bus, reg)?;
        let byte = (current & !mask) | (value & mask);

        crate::log_debug!("MPU6050: регистр 0x{:02x} <- 0x{:02x}", reg, byte);

        bus.write_registers(self.addr, reg, &[byte])
            .map_err(Mpu6050Error::Bus)
    }
}
