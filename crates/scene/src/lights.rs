use std::collections::BTreeMap;

use foundation::ids::IdGenerator;

use crate::light::{
    AmbientLight, DirectionalLight, DirectionalLightPatch, Light, LightId, LightKind, LightPatch,
    SpotLight, SpotLightPatch,
};

/// Lights of a project, one collection per kind.
///
/// Ids come from a single generator shared by all kinds, so an id is never
/// handed out twice in a session, even after its light was removed.
///
/// Removal is a hard delete for every kind. Only spot lights additionally
/// support a soft hide.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightState {
    ambient: BTreeMap<LightId, AmbientLight>,
    directional: BTreeMap<LightId, DirectionalLight>,
    spot: BTreeMap<LightId, SpotLight>,
    ids: IdGenerator,
}

impl LightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ambient.len() + self.directional.len() + self.spot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ambient(&self) -> &BTreeMap<LightId, AmbientLight> {
        &self.ambient
    }

    pub fn directional(&self) -> &BTreeMap<LightId, DirectionalLight> {
        &self.directional
    }

    pub fn spot(&self) -> &BTreeMap<LightId, SpotLight> {
        &self.spot
    }

    /// Id the next added light will receive.
    pub fn next_id(&self) -> LightId {
        LightId(self.ids.peek())
    }

    pub fn kind_of(&self, id: LightId) -> Option<LightKind> {
        if self.ambient.contains_key(&id) {
            Some(LightKind::Ambient)
        } else if self.directional.contains_key(&id) {
            Some(LightKind::Directional)
        } else if self.spot.contains_key(&id) {
            Some(LightKind::Spot)
        } else {
            None
        }
    }

    /// Every light as a tagged value, ambient first, then directional, then spot.
    pub fn lights(&self) -> Vec<(LightId, Light)> {
        let ambient = self
            .ambient
            .iter()
            .map(|(id, l)| (*id, Light::Ambient(l.clone())));
        let directional = self
            .directional
            .iter()
            .map(|(id, l)| (*id, Light::Directional(l.clone())));
        let spot = self.spot.iter().map(|(id, l)| (*id, Light::Spot(l.clone())));
        ambient.chain(directional).chain(spot).collect()
    }

    fn allocate(&mut self) -> LightId {
        LightId(self.ids.next_id())
    }

    /// Adds a light under a fresh id. Lights with non-finite fields are
    /// rejected and consume no id.
    pub fn add_ambient(&mut self, light: AmbientLight) -> Option<LightId> {
        if !light.is_finite() {
            return None;
        }
        let id = self.allocate();
        self.ambient.insert(id, light);
        Some(id)
    }

    pub fn add_directional(&mut self, light: DirectionalLight) -> Option<LightId> {
        if !light.is_finite() {
            return None;
        }
        let id = self.allocate();
        self.directional.insert(id, light);
        Some(id)
    }

    pub fn add_spot(&mut self, light: SpotLight) -> Option<LightId> {
        if !light.is_finite() {
            return None;
        }
        let id = self.allocate();
        self.spot.insert(id, light);
        Some(id)
    }

    pub fn update_ambient(&mut self, id: LightId, patch: &LightPatch) -> bool {
        if !patch.is_finite() {
            return false;
        }
        let Some(light) = self.ambient.get_mut(&id) else {
            return false;
        };
        let before = light.clone();
        light.apply(patch);
        *light != before
    }

    pub fn update_directional(&mut self, id: LightId, patch: &DirectionalLightPatch) -> bool {
        if !patch.is_finite() {
            return false;
        }
        let Some(light) = self.directional.get_mut(&id) else {
            return false;
        };
        let before = light.clone();
        light.apply(patch);
        *light != before
    }

    pub fn update_spot(&mut self, id: LightId, patch: &SpotLightPatch) -> bool {
        if !patch.is_finite() {
            return false;
        }
        let Some(light) = self.spot.get_mut(&id) else {
            return false;
        };
        let before = light.clone();
        light.apply(patch);
        *light != before
    }

    pub fn remove_ambient(&mut self, id: LightId) -> bool {
        self.ambient.remove(&id).is_some()
    }

    pub fn remove_directional(&mut self, id: LightId) -> bool {
        self.directional.remove(&id).is_some()
    }

    pub fn remove_spot(&mut self, id: LightId) -> bool {
        self.spot.remove(&id).is_some()
    }

    /// Marks a spot light invisible without removing it.
    pub fn hide_spot(&mut self, id: LightId) -> bool {
        match self.spot.get_mut(&id) {
            Some(light) if light.common.is_visible => {
                light.common.is_visible = false;
                true
            }
            _ => false,
        }
    }

    /// Replaces every collection with `lights`, keeping their ids.
    ///
    /// An id already taken by an earlier entry, of any kind, is skipped; the
    /// first entry wins. Entries with non-finite fields are skipped too.
    /// The id generator only moves forward, past the highest loaded id.
    pub fn replace_all(&mut self, lights: impl IntoIterator<Item = (LightId, Light)>) -> bool {
        let mut next = LightState {
            ids: self.ids.clone(),
            ..LightState::default()
        };
        for (id, light) in lights {
            if let Some(kind) = next.kind_of(id) {
                tracing::warn!(%id, existing = ?kind, skipped = ?light.kind(), "duplicate light id");
                continue;
            }
            if !light.is_finite() {
                tracing::warn!(%id, "skipping light with non-finite fields");
                continue;
            }
            next.ids.advance_past(id.0);
            match light {
                Light::Ambient(l) => {
                    next.ambient.insert(id, l);
                }
                Light::Directional(l) => {
                    next.directional.insert(id, l);
                }
                Light::Spot(l) => {
                    next.spot.insert(id, l);
                }
            }
        }
        if next == *self {
            return false;
        }
        *self = next;
        true
    }
}
