//! Type definitions for viscars

pub mod camera_info;
pub mod config;
pub mod error;

pub use camera_info::CameraInfo;
pub use config::CameraConfig;
pub use error::{Error, Result};
