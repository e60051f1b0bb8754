//! Регистровый транспорт шины
//!
//! Драйверы не владеют шиной: каждая операция получает `&mut` транспорт
//! на время вызова и адресует устройство явно.

use embedded_hal::i2c::{I2c, Operation};

/// Размер буфера записи на стеке (адрес регистра + данные)
const MAX_INLINE_WRITE: usize = 16;

/// Чтение/запись последовательных 8-битных регистров устройства
///
/// Операции блокирующие, таймаут задает платформа. Ошибка делает
/// недействительным весь буфер, частичного успеха нет.
pub trait RegisterTransport {
    type Error: core::fmt::Debug;

    /// Чтение `buf.len()` регистров начиная с `start`
    fn read_registers(&mut self, addr: u8, start: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Запись `data` в регистры начиная с `start`
    fn write_registers(&mut self, addr: u8, start: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Проверка присутствия устройства на шине
    fn probe(&mut self, addr: u8) -> Result<(), Self::Error>;
}

impl<I: I2c> RegisterTransport for I {
    type Error = I::Error;

    fn read_registers(&mut self, addr: u8, start: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.write_read(addr, &[start], buf)
    }

    fn write_registers(&mut self, addr: u8, start: u8, data: &[u8]) -> Result<(), Self::Error> {
        // Адрес регистра и данные одной операцией: [start, data..]
        if data.len() < MAX_INLINE_WRITE {
            let mut buf = [0u8; MAX_INLINE_WRITE];
            buf[0] = start;
            buf[1..=data.len()].copy_from_slice(data);
            return self.write(addr, &buf[..=data.len()]);
        }

        // Длинный блок: по контракту embedded-hal соседние записи идут без повторного START
        self.transaction(addr, &mut [Operation::Write(&[start]), Operation::Write(data)])
    }

    fn probe(&mut self, addr: u8) -> Result<(), Self::Error> {
        // Пустая запись отвергается частью HAL (embassy-rp), читаем один байт
        let mut buf = [0u8; 1];
        self.read(addr, &mut buf)
    }
}
