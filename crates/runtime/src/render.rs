use scene::RenderFrame;

use crate::select;
use crate::state::AppState;

/// Receives world placements whenever they change.
pub trait RenderTarget {
    fn present(&mut self, frame: &RenderFrame);
}

/// Pushes frames to a [`RenderTarget`], skipping unchanged ones.
#[derive(Debug, Default)]
pub struct RenderSync {
    last: Option<RenderFrame>,
}

impl RenderSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a new frame was presented.
    pub fn sync(&mut self, state: &AppState, target: &mut dyn RenderTarget) -> bool {
        let frame = select::render_frame(state);
        if self.last.as_ref() == Some(&frame) {
            return false;
        }
        target.present(&frame);
        tracing::trace!(
            models = frame.models.len(),
            lights = frame.lights.len(),
            "frame presented"
        );
        self.last = Some(frame);
        true
    }

    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderSync, RenderTarget};
    use crate::action::Action;
    use crate::store::Store;
    use scene::{Model, ModelId, RenderFrame, TrackingState};

    #[derive(Default)]
    struct Recorder {
        frames: Vec<RenderFrame>,
    }

    impl RenderTarget for Recorder {
        fn present(&mut self, frame: &RenderFrame) {
            self.frames.push(frame.clone());
        }
    }

    #[test]
    fn presents_only_changed_frames_and_hides_without_tracking() {
        let mut store = Store::new();
        store.dispatch(Action::SetModels(vec![Model::new(ModelId::new("m"), "a", "A")]));
        store.dispatch(Action::SetTrackingState(TrackingState::Normal));

        let mut sync = RenderSync::new();
        let mut target = Recorder::default();
        assert!(sync.sync(store.state(), &mut target));
        assert!(!sync.sync(store.state(), &mut target));
        assert_eq!(target.frames[0].models.len(), 1);

        store.dispatch(Action::SetTrackingState(TrackingState::Unavailable));
        assert!(sync.sync(store.state(), &mut target));
        assert!(target.frames[1].is_empty());
        // Tracking loss does not touch the scene itself.
        assert_eq!(store.state().scene.model_count(), 1);
    }
}
