pub mod bus;
pub mod imu;
