//! Zoom smoke-test example
//!
//! Reconnects, runs the round-trip check, then nudges the zoom.

use std::time::Duration;
use tokio::time::sleep;
use viscars::{Camera, CameraConfig};

#[tokio::main]
async fn main() -> viscars::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let port = std::env::var("VISCA_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let mut camera = Camera::new();
    camera.reconnect(&CameraConfig::new(port, 9600)).await?;

    camera.check().await?;

    println!("zooming in for a second...");
    camera.zoom_in().await?;
    sleep(Duration::from_secs(1)).await;
    camera.stop_zoom().await?;

    println!("zoom position: {}", camera.zoom().await?);

    Ok(())
}
