use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use flight_imu::SensorSample;

use crate::config::hardware::system::SAMPLE_CHANNEL_SIZE;

pub mod sensor_task;
pub mod telemetry_task;

/// Канал отсчетов от задачи опроса к телеметрии
pub static SAMPLE_CHANNEL: Channel<CriticalSectionRawMutex, SensorSample, SAMPLE_CHANNEL_SIZE> = Channel::new();
