//! Timer-driven and on-demand persistence of the open project.

use std::sync::Arc;
use std::time::Duration;

use catalog::{CatalogError, ProjectStore, SaveReceipt};
use foundation::time::TimestampMs;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::action::Action;
use crate::event_bus::NoticeLevel;
use crate::store::SharedStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveError {
    /// No project is open.
    NoProject,
    /// The save loop needs a non-zero period.
    ZeroInterval,
    Catalog(CatalogError),
}

impl std::fmt::Display for AutosaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutosaveError::NoProject => write!(f, "no project is open"),
            AutosaveError::ZeroInterval => write!(f, "autosave interval must be greater than zero"),
            AutosaveError::Catalog(e) => write!(f, "save failed: {e}"),
        }
    }
}

impl std::error::Error for AutosaveError {}

/// Saves the open project of one user to a [`ProjectStore`].
pub struct Autosaver {
    store: SharedStore,
    catalog: Arc<dyn ProjectStore>,
    user_id: String,
}

impl Autosaver {
    pub fn new(store: SharedStore, catalog: Arc<dyn ProjectStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            catalog,
            user_id: user_id.into(),
        }
    }

    /// Saves immediately, as for an explicit "Save".
    ///
    /// Success clears `unsaved_changes` unless the content changed while the
    /// save was in flight. Failure leaves the flag set, posts an error notice
    /// and is not retried.
    pub async fn save_now(&self) -> Result<SaveReceipt, AutosaveError> {
        let (doc, revision) = {
            let store = self.store.lock();
            let doc = store
                .snapshot(TimestampMs::now())
                .ok_or(AutosaveError::NoProject)?;
            (doc, store.revision())
        };

        match self.catalog.save_project(&self.user_id, &doc.id, &doc).await {
            Ok(receipt) => {
                let mut store = self.store.lock();
                if store.revision() == revision {
                    store.dispatch(Action::SetUnsavedChanges(false));
                } else {
                    tracing::debug!("project changed during save; keeping unsaved flag");
                }
                tracing::info!(
                    project = %doc.id,
                    written = receipt.written,
                    "project saved"
                );
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(project = %doc.id, "save failed: {e}");
                self.store.lock().notify(
                    NoticeLevel::Error,
                    "save_failed",
                    format!("Could not save project: {e}"),
                );
                Err(AutosaveError::Catalog(e))
            }
        }
    }

    /// One timer tick: saves only when autosave is on and there is something to save.
    pub async fn tick(&self) -> Option<Result<SaveReceipt, AutosaveError>> {
        let due = {
            let store = self.store.lock();
            let settings = &store.state().settings;
            settings.auto_save && settings.unsaved_changes
        };
        if !due {
            return None;
        }
        Some(self.save_now().await)
    }

    /// Starts the periodic save loop. The first tick fires after `period`.
    pub fn spawn(self: Arc<Self>, period: Duration) -> Result<AutosaveHandle, AutosaveError> {
        if period.is_zero() {
            return Err(AutosaveError::ZeroInterval);
        }
        let saver = self;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                // Errors are already surfaced as notices.
                let _ = saver.tick().await;
            }
        });
        tracing::debug!(?period, "autosave started");
        Ok(AutosaveHandle { task })
    }
}

/// Running autosave loop. Dropping the handle stops it.
#[derive(Debug)]
pub struct AutosaveHandle {
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Stops the loop, same as dropping the handle.
    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("autosave stopped");
    }
}

/// Keeps the autosave loop running exactly while autosave is enabled.
pub struct AutosaveController {
    saver: Arc<Autosaver>,
    period: Duration,
    handle: Option<AutosaveHandle>,
}

impl AutosaveController {
    pub fn new(saver: Arc<Autosaver>, period: Duration) -> Result<Self, AutosaveError> {
        if period.is_zero() {
            return Err(AutosaveError::ZeroInterval);
        }
        Ok(Self {
            saver,
            period,
            handle: None,
        })
    }

    /// Starts or stops the loop to match `auto_save`.
    pub fn sync(&mut self, auto_save: bool) {
        match (auto_save, self.handle.is_some()) {
            // The period was checked in `new`, so spawning cannot fail here.
            (true, false) => self.handle = Arc::clone(&self.saver).spawn(self.period).ok(),
            (false, true) => self.handle = None,
            _ => {}
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn saver(&self) -> &Arc<Autosaver> {
        &self.saver
    }
}
