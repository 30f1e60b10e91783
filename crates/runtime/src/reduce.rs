//! Pure state transitions.
//!
//! Each reducer takes a slice and an action and returns `Some(next)` when the
//! action changed the slice, `None` when the slice is unaffected. Actions a
//! reducer does not handle, and actions targeting absent ids, are `None`.

use scene::{LightState, SceneState, SceneTransform};

use crate::action::Action;
use crate::state::{AppState, DeviceState, ProjectState, Settings};

/// Result of applying one action to the whole state.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    /// Persisted project content changed.
    pub content_changed: bool,
}

pub fn reduce(state: &AppState, action: &Action) -> Option<AppState> {
    transition(state, action).map(|t| t.state)
}

pub fn transition(state: &AppState, action: &Action) -> Option<Transition> {
    let project = reduce_project(&state.project, action);
    let scene = reduce_scene(&state.scene, action);
    let lights = reduce_lights(&state.lights, action);
    let mut settings = reduce_settings(&state.settings, action);
    let device = reduce_device(&state.device, action);

    let slices_changed = project.is_some() || scene.is_some() || lights.is_some();
    let content_changed = slices_changed
        && (action.is_content_edit() || matches!(action, Action::LoadProject(_) | Action::Logout));
    if slices_changed && action.is_content_edit() {
        let current = settings.as_ref().unwrap_or(&state.settings);
        if !current.unsaved_changes {
            let mut marked = current.clone();
            marked.unsaved_changes = true;
            settings = Some(marked);
        }
    }

    if !slices_changed && settings.is_none() && device.is_none() {
        return None;
    }

    Some(Transition {
        content_changed,
        state: AppState {
            project: project.unwrap_or_else(|| state.project.clone()),
            scene: scene.unwrap_or_else(|| state.scene.clone()),
            lights: lights.unwrap_or_else(|| state.lights.clone()),
            settings: settings.unwrap_or_else(|| state.settings.clone()),
            device: device.unwrap_or(state.device),
        },
    })
}

pub fn reduce_scene(scene: &SceneState, action: &Action) -> Option<SceneState> {
    let mut next = scene.clone();
    let changed = match action {
        Action::SetTranslation(t) => next.set_translation(*t),
        Action::NudgeTranslation(delta) => next.nudge_translation(*delta),
        Action::SetOrientation(degrees) => next.set_orientation(*degrees),
        Action::RotateScene(delta) => next.rotate(*delta),
        Action::SetScale(scale) => next.set_scale(*scale),
        Action::ResetTransform => next.reset_transform(),
        Action::SetModels(models) => next.replace_models(models.iter().cloned()),
        Action::UpdateModel { id, changes } => next.update_model(id, changes),
        Action::SelectModel(id) => next.select_model(id),
        Action::ClearSelection => next.clear_selection(),
        Action::LoadProject(loaded) => {
            // Both parts are replaced; an invalid stored transform falls back to identity.
            let transform = if loaded.transform.is_valid() {
                loaded.transform
            } else {
                SceneTransform::identity()
            };
            let t = next.set_transform(transform);
            let m = next.replace_models(loaded.models.iter().cloned());
            t || m
        }
        Action::Logout => {
            next = SceneState::default();
            next != *scene
        }
        _ => return None,
    };
    changed.then_some(next)
}

pub fn reduce_lights(lights: &LightState, action: &Action) -> Option<LightState> {
    let mut next = lights.clone();
    let changed = match action {
        Action::AddAmbientLight(light) => next.add_ambient(light.clone()).is_some(),
        Action::UpdateAmbientLight { id, changes } => next.update_ambient(*id, changes),
        Action::RemoveAmbientLight(id) => next.remove_ambient(*id),
        Action::AddDirectionalLight(light) => next.add_directional(light.clone()).is_some(),
        Action::UpdateDirectionalLight { id, changes } => next.update_directional(*id, changes),
        Action::RemoveDirectionalLight(id) => next.remove_directional(*id),
        Action::AddSpotLight(light) => next.add_spot(light.clone()).is_some(),
        Action::UpdateSpotLight { id, changes } => next.update_spot(*id, changes),
        Action::RemoveSpotLight(id) => next.remove_spot(*id),
        Action::HideSpotLight(id) => next.hide_spot(*id),
        Action::SetLights(docs) => {
            next.replace_all(docs.iter().map(|doc| (doc.id, doc.light.clone())))
        }
        Action::LoadProject(loaded) => {
            next.replace_all(loaded.lights.iter().map(|doc| (doc.id, doc.light.clone())))
        }
        Action::Logout => {
            next = LightState::default();
            next != *lights
        }
        _ => return None,
    };
    changed.then_some(next)
}

pub fn reduce_settings(settings: &Settings, action: &Action) -> Option<Settings> {
    let mut next = settings.clone();
    match action {
        Action::SetAutoSave(on) => next.auto_save = *on,
        Action::SetSaveLights(on) => next.save_lights = *on,
        Action::SetUnsavedChanges(dirty) => next.unsaved_changes = *dirty,
        Action::SetStepSize(step) if step.is_finite() && *step > 0.0 => next.step_size = *step,
        Action::SetAngleStepSize(step) if step.is_finite() && *step > 0.0 => {
            next.angle_step_size = *step
        }
        // A freshly loaded project matches what is stored.
        Action::LoadProject(_) => next.unsaved_changes = false,
        Action::Logout => next = Settings::default(),
        _ => return None,
    }
    (next != *settings).then_some(next)
}

pub fn reduce_project(project: &ProjectState, action: &Action) -> Option<ProjectState> {
    let mut next = project.clone();
    match action {
        Action::LoadProject(loaded) => {
            next = ProjectState {
                meta: Some(loaded.meta.clone()),
                reference: loaded.reference,
                corners: loaded.corners.clone(),
                is_first_time: loaded.is_first_time,
            };
        }
        // The reference is captured once; later captures and invalid readings are ignored.
        Action::SetReferenceLocation(reference)
            if next.reference.is_none() && reference.is_valid() =>
        {
            next.reference = Some(*reference);
        }
        Action::SetCorners(corners) if corners.iter().all(|c| c.is_finite()) => {
            next.corners = corners.clone();
        }
        Action::SetProjectName(name) => {
            let meta = next.meta.as_mut()?;
            meta.name = name.clone();
        }
        Action::CompleteSetup => next.is_first_time = false,
        Action::Logout => next = ProjectState::default(),
        _ => return None,
    }
    (next != *project).then_some(next)
}

pub fn reduce_device(device: &DeviceState, action: &Action) -> Option<DeviceState> {
    let mut next = *device;
    match action {
        Action::SetDeviceFix(fix) if fix.is_valid() => next.fix = Some(*fix),
        Action::SetTrackingState(tracking) => next.tracking = *tracking,
        Action::Logout => next = DeviceState::default(),
        _ => return None,
    }
    (next != *device).then_some(next)
}
