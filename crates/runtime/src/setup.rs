//! First-run capture of a project's reference location.

use foundation::math::GeoPoint;
use scene::{DeviceFix, ReferenceLocation};

use crate::action::Action;
use crate::event_bus::NoticeLevel;
use crate::sensors::{DeviceSensors, SensorError, SensorReader};
use crate::store::SharedStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetupStep {
    AwaitingLocation,
    AwaitingHeading { point: GeoPoint },
    Complete(ReferenceLocation),
}

/// Walks the user through capturing position, then heading.
///
/// A failed read leaves the flow on its current step; calling
/// [`SetupFlow::advance`] again retries it.
pub struct SetupFlow<S> {
    reader: SensorReader<S>,
    store: SharedStore,
    step: SetupStep,
}

impl<S: DeviceSensors> SetupFlow<S> {
    pub fn new(reader: SensorReader<S>, store: SharedStore) -> Self {
        Self {
            reader,
            store,
            step: SetupStep::AwaitingLocation,
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.step, SetupStep::Complete(_))
    }

    /// Performs the read for the current step and moves on if it succeeds.
    pub async fn advance(&mut self) -> Result<SetupStep, SensorError> {
        match self.step {
            SetupStep::AwaitingLocation => {
                let point = self.reader.position().await.map_err(|e| self.fail("location", e))?;
                self.step = SetupStep::AwaitingHeading { point };
            }
            SetupStep::AwaitingHeading { point } => {
                let heading = self.reader.heading().await.map_err(|e| self.fail("heading", e))?;
                let reference = ReferenceLocation {
                    point,
                    orientation: heading,
                };
                let mut store = self.store.lock();
                store.dispatch(Action::SetDeviceFix(DeviceFix { point, heading }));
                if !store.dispatch(Action::SetReferenceLocation(reference)) {
                    if reference.is_valid() {
                        tracing::info!("project already has a reference location; keeping it");
                    } else {
                        tracing::warn!(?reference, "ignoring out-of-range reference reading");
                    }
                }
                store.dispatch(Action::CompleteSetup);
                drop(store);
                tracing::info!(
                    latitude = point.latitude,
                    longitude = point.longitude,
                    orientation = heading,
                    "reference location captured"
                );
                self.step = SetupStep::Complete(reference);
            }
            SetupStep::Complete(_) => {}
        }
        Ok(self.step)
    }

    fn fail(&self, what: &str, err: SensorError) -> SensorError {
        tracing::warn!("setup {what} read failed: {err}");
        self.store.lock().notify(
            NoticeLevel::Error,
            "sensor_failed",
            format!("Could not read {what}: {err}"),
        );
        err
    }
}
