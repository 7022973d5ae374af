pub mod calibration;

pub use calibration::{CalibrationTable, TaskConstants};
