//! High-level camera controller

use tracing::{debug, info, warn};

use viscars_core::{command, constants::OPTICAL_ZOOM_MAX, Command, DZoomMode, Inquiry, ZoomSpeed};
use viscars_transport::{SerialTransport, Transport};
use viscars_types::{CameraConfig, CameraInfo};

use crate::bus::{Bus, SharedBus};
use crate::error::Result;

/// Primary device address assigned after bus addressing
pub const DEFAULT_ADDRESS: u8 = 1;

/// Default max-zoom bound: the optical zoom range of the modeled device
/// family, valid once digital zoom is disabled
pub const DEFAULT_MAX_ZOOM: f64 = OPTICAL_ZOOM_MAX as f64;

/// One addressed VISCA camera
///
/// All operations are sequential: each call drives a full
/// send/ack/completion exchange under the bus lock before returning.
///
/// # Examples
///
/// ```no_run
/// use viscars::{Camera, CameraConfig};
///
/// #[tokio::main]
/// async fn main() -> viscars::Result<()> {
///     let mut camera = Camera::new();
///     camera.reconnect(&CameraConfig::new("/dev/ttyUSB0", 9600)).await?;
///
///     camera.zoom_in().await?;
///     camera.stop_zoom().await?;
///     println!("zoom is at {}", camera.zoom().await?);
///
///     Ok(())
/// }
/// ```
pub struct Camera {
    bus: SharedBus,
    address: u8,
    info: Option<CameraInfo>,
    current_zoom: f64,
    max_zoom: f64,
}

impl Camera {
    /// Create a camera with its own private bus
    pub fn new() -> Self {
        Self::on_bus(Bus::new().shared())
    }

    /// Create a camera handle on an existing (possibly shared) bus
    pub fn on_bus(bus: SharedBus) -> Self {
        Self {
            bus,
            address: DEFAULT_ADDRESS,
            info: None,
            current_zoom: 0.0,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    /// Tear down any previous connection and bring the camera up on the
    /// configured serial port
    pub async fn reconnect(&mut self, config: &CameraConfig) -> Result<()> {
        info!(%config, "reconnecting");
        let transport = SerialTransport::new(&config.port, config.rate);
        self.reconnect_with(Box::new(transport)).await
    }

    /// Reconnect over an explicit transport
    ///
    /// This is the injection point for non-serial transports; the
    /// integration tests drive a simulated camera through here.
    pub async fn reconnect_with(&mut self, transport: Box<dyn Transport>) -> Result<()> {
        self.info = None;
        let mut bus = self.bus.lock().await;

        // Best effort; a half-dead previous connection must not block the
        // new one.
        if let Err(e) = bus.disconnect().await {
            warn!("reconnect: closing previous connection failed: {e}");
        }

        bus.connect(transport).await?;
        bus.set_broadcast(false);

        // The original controller survives a failed address assignment:
        // the camera usually keeps its prior address. Kept non-fatal,
        // flagged for review in DESIGN.md.
        match bus.set_address().await {
            Ok(cameras) => debug!(cameras, "bus addressing done"),
            Err(e) => warn!("reconnect: address assignment failed: {e}"),
        }

        self.address = DEFAULT_ADDRESS;

        if let Err(e) = bus.clear(self.address).await {
            warn!("reconnect: IF_Clear failed: {e}");
        }

        // A camera that cannot identify itself is treated as absent
        let payload = bus.inquiry(self.address, &Inquiry::Version).await?;
        let info = CameraInfo::parse(&payload)?;
        info!(%info, "camera identified");
        bus.set_socket_count(info.socket_count);

        // The max-zoom bound is only valid with digital zoom off; sent
        // twice because some units drop the first write after power-up
        bus.command(self.address, &Command::DZoom(DZoomMode::Off)).await?;
        bus.command(self.address, &Command::DZoom(DZoomMode::Off)).await?;

        drop(bus);

        self.info = Some(info);
        self.max_zoom = DEFAULT_MAX_ZOOM;

        Ok(())
    }

    /// Stop any zoom movement
    pub async fn stop_zoom(&mut self) -> Result<()> {
        let mut bus = self.bus.lock().await;
        bus.command(self.address, &Command::ZoomStop).await
    }

    /// Zoom in: directional command, then the speed-qualified variant
    ///
    /// The speed-qualified command is not attempted when the first fails.
    pub async fn zoom_in(&mut self) -> Result<()> {
        debug!("zoom in");
        let mut bus = self.bus.lock().await;
        bus.command(self.address, &Command::ZoomTele).await?;
        bus.command(self.address, &Command::ZoomTeleSpeed(ZoomSpeed::MAX))
            .await?;
        Ok(())
    }

    /// Zoom out: directional command, then the speed-qualified variant
    pub async fn zoom_out(&mut self) -> Result<()> {
        debug!("zoom out");
        let mut bus = self.bus.lock().await;
        bus.command(self.address, &Command::ZoomWide).await?;
        bus.command(self.address, &Command::ZoomWideSpeed(ZoomSpeed::MAX))
            .await?;
        Ok(())
    }

    /// Move zoom to an absolute position, clamped to the max-zoom bound
    pub async fn set_zoom(&mut self, value: u16) -> Result<()> {
        let bound = self.max_zoom.clamp(0.0, u16::MAX as f64) as u16;
        let value = value.min(bound);

        let mut bus = self.bus.lock().await;
        bus.command(self.address, &Command::ZoomDirect(value)).await?;
        drop(bus);

        self.current_zoom = value as f64;
        Ok(())
    }

    /// Set the max-zoom bound; local state only, no protocol exchange
    pub fn set_max_zoom(&mut self, value: f64) {
        self.max_zoom = value;
    }

    /// Query the current zoom position from the device
    pub async fn zoom(&mut self) -> Result<f64> {
        let mut bus = self.bus.lock().await;
        let payload = bus.inquiry(self.address, &Inquiry::ZoomPos).await?;
        drop(bus);

        let value = command::unpack_nibbles(&payload)?;
        debug!(zoom = value, "zoom position read");

        self.current_zoom = value as f64;
        Ok(value as f64)
    }

    /// Round-trip smoke test: zoom to 0, then to the max bound, then read
    /// the position back
    ///
    /// Surfaces the first failing step's error.
    pub async fn check(&mut self) -> Result<()> {
        if let Err(e) = self.set_zoom(0).await {
            warn!("check: set_zoom(0) failed: {e}");
            return Err(e);
        }

        let max = self.max_zoom as u16;
        if let Err(e) = self.set_zoom(max).await {
            warn!("check: set_zoom({max}) failed: {e}");
            return Err(e);
        }

        match self.zoom().await {
            Ok(value) => {
                info!(zoom = value, "check complete");
                Ok(())
            }
            Err(e) => {
                warn!("check: zoom inquiry failed: {e}");
                Err(e)
            }
        }
    }

    /// Device address on the bus
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Identification reported during the last successful reconnect
    pub fn info(&self) -> Option<&CameraInfo> {
        self.info.as_ref()
    }

    /// Last zoom value written or read
    pub fn current_zoom(&self) -> f64 {
        self.current_zoom
    }

    /// Configured max-zoom bound
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_create() {
        let camera = Camera::new();
        assert_eq!(camera.address(), DEFAULT_ADDRESS);
        assert_eq!(camera.max_zoom(), DEFAULT_MAX_ZOOM);
        assert!(camera.info().is_none());
    }

    #[test]
    fn test_set_max_zoom_is_local() {
        let mut camera = Camera::new();
        camera.set_max_zoom(1000.0);
        assert_eq!(camera.max_zoom(), 1000.0);
    }
}
