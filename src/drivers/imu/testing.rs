//! Тестовая шина I2C с регистровой памятью

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use super::mpu6050::{regs, Mpu6050};
use crate::data::Vector3;

/// Завершенная транзакция, как ее видит устройство
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    Read { address: u8, start: u8, len: usize },
    Write { address: u8, start: u8, data: Vec<u8> },
    Probe { address: u8 },
}

impl Transfer {
    pub fn address(&self) -> u8 {
        match self {
            Transfer::Read { address, .. }
            | Transfer::Write { address, .. }
            | Transfer::Probe { address } => *address,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError(ErrorKind);

impl i2c::Error for FakeError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Устройство с 256 регистрами и автоинкрементом адреса
pub struct FakeI2c {
    address: u8,
    registers: [u8; 256],
    pointer: u8,
    fail_next: usize,
    fail_writes: bool,
    strict_writes: bool,
    transfers: Vec<Transfer>,
}

impl FakeI2c {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            pointer: 0,
            fail_next: 0,
            fail_writes: false,
            strict_writes: false,
            transfers: Vec::new(),
        }
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.registers[reg as usize]
    }

    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.registers[reg as usize] = value;
    }

    pub fn set_registers(&mut self, start: u8, values: &[u8]) {
        let start = start as usize;
        self.registers[start..start + values.len()].copy_from_slice(values);
    }

    /// Следующие `count` транзакций завершатся таймаутом
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    /// Все записи получают NACK на данных
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Контроллер, который ставит повторный START перед каждой операцией записи.
    /// Транзакция из нескольких `Operation::Write` получает NACK.
    pub fn strict_writes(&mut self, strict: bool) {
        self.strict_writes = strict;
    }

    /// Успешные транзакции по порядку
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn clear_transfers(&mut self) {
        self.transfers.clear();
    }
}

impl ErrorType for FakeI2c {
    type Error = FakeError;
}

impl I2c for FakeI2c {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(FakeError(ErrorKind::Other));
        }
        if address != self.address {
            return Err(FakeError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        }

        let write_ops = operations.iter().filter(|op| matches!(op, Operation::Write(_))).count();
        if self.strict_writes && write_ops > 1 {
            return Err(FakeError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)));
        }

        let mut written = Vec::new();
        let mut read_len = 0;
        for op in operations.iter() {
            match op {
                Operation::Write(bytes) => written.extend_from_slice(bytes),
                Operation::Read(buf) => read_len += buf.len(),
            }
        }

        if read_len == 0 {
            if self.fail_writes {
                return Err(FakeError(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)));
            }
            let Some((&start, data)) = written.split_first() else {
                return Ok(());
            };
            let from = start as usize;
            self.registers[from..from + data.len()].copy_from_slice(data);
            self.pointer = start.wrapping_add(data.len() as u8);
            self.transfers.push(Transfer::Write { address, start, data: data.to_vec() });
            return Ok(());
        }

        // Без адреса регистра это проверка присутствия
        let transfer = match written.first() {
            Some(&start) => {
                self.pointer = start;
                Transfer::Read { address, start, len: read_len }
            }
            None => Transfer::Probe { address },
        };

        for op in operations.iter_mut() {
            if let Operation::Read(buf) = op {
                for byte in buf.iter_mut() {
                    *byte = self.registers[self.pointer as usize];
                    self.pointer = self.pointer.wrapping_add(1);
                }
            }
        }

        self.transfers.push(transfer);
        Ok(())
    }
}

/// Задержка, которая только считает запрошенное время
#[derive(Debug, Default)]
pub struct CountingDelay {
    total_ns: u64,
}

impl CountingDelay {
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Калибровка по неподвижному сигналу `raw` (4 выборки), журнал транзакций очищается
pub fn calibrate_on_constant(imu: &mut Mpu6050, bus: &mut FakeI2c, raw: [i16; 3]) -> Vector3 {
    let mut bytes = [0u8; 6];
    for (chunk, value) in bytes.chunks_exact_mut(2).zip(raw) {
        chunk.copy_from_slice(&value.to_be_bytes());
    }
    bus.set_registers(regs::GYRO_XOUT_H, &bytes);

    let bias = imu.calibrate_gyro(bus, &mut CountingDelay::default(), 4).unwrap();
    bus.clear_transfers();
    bias
}
