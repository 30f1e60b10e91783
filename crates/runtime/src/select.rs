//! Read-only views over [`AppState`].

use foundation::time::TimestampMs;
use formats::ProjectDocument;
use scene::{GeoAnchor, Light, LightId, LightKind, Model, RenderFrame, compute_frame};

use crate::state::AppState;

pub fn visible_models(state: &AppState) -> impl Iterator<Item = &Model> {
    state.scene.models().filter(|m| m.is_visible)
}

pub fn selected_model(state: &AppState) -> Option<&Model> {
    state.scene.selected_model()
}

pub fn lights_of_kind(state: &AppState, kind: LightKind) -> Vec<(LightId, Light)> {
    state
        .lights
        .lights()
        .into_iter()
        .filter(|(_, light)| light.kind() == kind)
        .collect()
}

pub fn anchor(state: &AppState) -> GeoAnchor {
    GeoAnchor::new(state.project.reference)
}

/// World placements for the renderer.
pub fn render_frame(state: &AppState) -> RenderFrame {
    compute_frame(
        &state.scene,
        &state.lights,
        &anchor(state),
        state.device.fix,
        state.device.tracking,
    )
}

pub fn has_unsaved_changes(state: &AppState) -> bool {
    state.settings.unsaved_changes
}

/// Document to persist for the open project, or `None` if none is open.
///
/// Lights are written only when `save_lights` is on.
pub fn project_document(state: &AppState, now: TimestampMs) -> Option<ProjectDocument> {
    let meta = state.project.meta.as_ref()?;
    let mut doc = ProjectDocument::new(meta.id.clone(), meta.name.clone(), meta.created_at);
    doc.modified_at = now;
    doc.thumb = meta.thumb.clone();
    doc.corners = state.project.corners.clone();
    doc.is_first_time = state.project.is_first_time;
    doc.set_reference_location(state.project.reference);
    doc.write_scene(&state.scene);
    if state.settings.save_lights {
        doc.write_lights(&state.lights);
    }
    Some(doc)
}
