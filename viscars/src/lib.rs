//! # viscars
//!
//! Pure-Rust VISCA protocol stack for serial PTZ camera control.
//!
//! ## Features
//!
//! - Self-contained protocol engine: framing, ack/completion
//!   correlation and device addressing with no native dependencies
//! - Async API using Tokio over `tokio-serial`
//! - Shareable bus: multiple camera handles over one serial link
//!
//! ## Quick Start
//!
//! ```no_run
//! use viscars::{Camera, CameraConfig};
//!
//! #[tokio::main]
//! async fn main() -> viscars::Result<()> {
//!     let mut camera = Camera::new();
//!     camera.reconnect(&CameraConfig::new("/dev/ttyUSB0", 9600)).await?;
//!
//!     camera.zoom_in().await?;
//!     camera.stop_zoom().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod camera;
pub mod error;

// Re-exports
pub use bus::{Bus, SharedBus};
pub use camera::Camera;
pub use error::{Error, Result};

// Re-export protocol types
pub use viscars_core::{Command, DZoomMode, DeviceError, Inquiry, Packet, Reply, ZoomSpeed};
pub use viscars_transport::{SerialTransport, Transport};
pub use viscars_types::{CameraConfig, CameraInfo};
