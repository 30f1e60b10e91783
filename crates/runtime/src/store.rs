use std::sync::Arc;

use foundation::time::TimestampMs;
use formats::ProjectDocument;
use parking_lot::Mutex;

use crate::action::Action;
use crate::event_bus::{EventBus, Notice, NoticeLevel};
use crate::reduce::transition;
use crate::select;
use crate::state::AppState;

/// Sole writer of session state.
///
/// One store per running session; `LOGOUT` resets it to the initial state.
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
    /// Bumped on every change to persisted content.
    revision: u64,
    events: EventBus,
}

/// Store shared between the session and its background tasks.
///
/// Lock only around synchronous work; never hold the guard across `.await`.
pub type SharedStore = Arc<Mutex<Store>>;

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies `action`; returns `true` if the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match transition(&self.state, &action) {
            Some(next) => {
                if next.content_changed {
                    self.revision += 1;
                }
                self.state = next.state;
                tracing::debug!(action = action.kind(), revision = self.revision, "dispatched");
                true
            }
            None => {
                tracing::debug!(action = action.kind(), "no state change");
                false
            }
        }
    }

    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) -> usize {
        let mut applied = 0;
        for action in actions {
            if self.dispatch(action) {
                applied += 1;
            }
        }
        applied
    }

    /// Persistable document of the open project, stamped `now`.
    pub fn snapshot(&self, now: TimestampMs) -> Option<ProjectDocument> {
        select::project_document(&self.state, now)
    }

    pub fn notify(&mut self, level: NoticeLevel, kind: &'static str, message: impl Into<String>) {
        self.events.emit(level, kind, message);
    }

    pub fn notices(&self) -> &[Notice] {
        self.events.notices()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::action::Action;
    use crate::event_bus::NoticeLevel;
    use crate::state::{AppState, LoadedProject, ProjectMeta};
    use foundation::time::TimestampMs;
    use scene::{Model, ModelId};

    fn load_action() -> Action {
        Action::LoadProject(Box::new(LoadedProject {
            meta: ProjectMeta {
                id: "p1".to_string(),
                name: "Loft".to_string(),
                created_at: TimestampMs(3),
                thumb: None,
            },
            reference: None,
            corners: Vec::new(),
            is_first_time: false,
            transform: Default::default(),
            models: vec![Model::new(ModelId::new("m1"), "chair", "Chair")],
            lights: Vec::new(),
        }))
    }

    #[test]
    fn dispatch_reports_changes_and_bumps_revision_for_content() {
        let mut store = Store::new();
        assert!(store.dispatch(load_action()));
        let loaded = store.revision();

        assert!(store.dispatch(Action::SelectModel(ModelId::new("m1"))));
        assert_eq!(store.revision(), loaded);

        assert!(store.dispatch(Action::RotateScene(15.0)));
        assert_eq!(store.revision(), loaded + 1);
        assert!(store.state().settings.unsaved_changes);

        assert!(!store.dispatch(Action::Unrecognized("X".to_string())));
        assert_eq!(store.revision(), loaded + 1);
    }

    #[test]
    fn snapshot_requires_open_project() {
        let mut store = Store::with_state(AppState::default());
        assert!(store.snapshot(TimestampMs(10)).is_none());
        store.dispatch(load_action());
        let doc = store.snapshot(TimestampMs(10)).expect("snapshot");
        assert_eq!(doc.id, "p1");
        assert_eq!(doc.objects.len(), 1);
        assert_eq!(doc.modified_at, TimestampMs(10));
    }

    #[test]
    fn dispatch_all_counts_effective_actions() {
        let mut store = Store::new();
        let applied = store.dispatch_all([
            load_action(),
            Action::SetScale(1.0),
            Action::SetScale(3.0),
            Action::Unrecognized("Y".to_string()),
        ]);
        assert_eq!(applied, 2);
    }

    #[test]
    fn notices_can_be_drained() {
        let mut store = Store::new();
        store.notify(NoticeLevel::Error, "save_failed", "offline");
        assert_eq!(store.notices().len(), 1);
        assert_eq!(store.drain_notices()[0].message, "offline");
        assert!(store.notices().is_empty());
    }
}
