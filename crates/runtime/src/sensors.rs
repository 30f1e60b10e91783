use std::time::Duration;

use catalog::BoxFuture;
use foundation::math::{GeoPoint, normalize_degrees};
use tokio::sync::mpsc;

/// One raw magnetometer reading, device axes, microtesla.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetometerSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    PermissionDenied,
    Unavailable(String),
    Timeout(Duration),
    /// The sample stream ended before producing a value.
    StreamClosed,
}

impl std::fmt::Display for SensorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorError::PermissionDenied => write!(f, "sensor permission denied"),
            SensorError::Unavailable(msg) => write!(f, "sensor unavailable: {msg}"),
            SensorError::Timeout(after) => write!(f, "sensor read timed out after {after:?}"),
            SensorError::StreamClosed => write!(f, "sensor stream closed"),
        }
    }
}

impl std::error::Error for SensorError {}

/// Device sensors as provided by the host platform.
pub trait DeviceSensors: Send + Sync {
    fn current_position(&self) -> BoxFuture<'_, Result<GeoPoint, SensorError>>;

    /// Subscribes to magnetometer samples. Dropping the receiver unsubscribes.
    fn magnetometer(&self) -> Result<mpsc::Receiver<MagnetometerSample>, SensorError>;
}

/// Compass heading in degrees, `[0, 360)`.
pub fn heading_from_magnetometer(sample: MagnetometerSample) -> f64 {
    normalize_degrees(sample.y.atan2(sample.x).to_degrees() - 90.0)
}

/// Bounded, one-shot reads on top of [`DeviceSensors`].
pub struct SensorReader<S> {
    sensors: S,
    timeout: Duration,
}

impl<S: DeviceSensors> SensorReader<S> {
    pub fn new(sensors: S, timeout: Duration) -> Self {
        Self { sensors, timeout }
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn position(&self) -> Result<GeoPoint, SensorError> {
        match tokio::time::timeout(self.timeout, self.sensors.current_position()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "position read timed out");
                Err(SensorError::Timeout(self.timeout))
            }
        }
    }

    /// Reads exactly one magnetometer sample and unsubscribes.
    pub async fn heading(&self) -> Result<f64, SensorError> {
        let mut samples = self.sensors.magnetometer()?;
        let first = tokio::time::timeout(self.timeout, samples.recv()).await;
        drop(samples);
        match first {
            Ok(Some(sample)) => Ok(heading_from_magnetometer(sample)),
            Ok(None) => Err(SensorError::StreamClosed),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "heading read timed out");
                Err(SensorError::Timeout(self.timeout))
            }
        }
    }
}
