use std::collections::BTreeSet;

use catalog::{CatalogError, ProjectStore};
use formats::{DocumentError, LightDocument, ModelObject, ProjectDocument};
use futures_util::future::try_join_all;
use scene::Model;

use crate::action::Action;
use crate::state::{LoadedProject, ProjectMeta};
use crate::store::SharedStore;

#[derive(Debug)]
pub enum LoadError {
    Catalog(CatalogError),
    Document(DocumentError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Catalog(e) => write!(f, "project load failed: {e}"),
            LoadError::Document(e) => write!(f, "stored project is invalid: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Catalog(e) => Some(e),
            LoadError::Document(e) => Some(e),
        }
    }
}

impl From<CatalogError> for LoadError {
    fn from(e: CatalogError) -> Self {
        LoadError::Catalog(e)
    }
}

impl From<DocumentError> for LoadError {
    fn from(e: DocumentError) -> Self {
        LoadError::Document(e)
    }
}

async fn resolve_model(catalog: &dyn ProjectStore, object: ModelObject) -> Result<Model, CatalogError> {
    let meta = catalog.fetch_model_metadata(&object.model_id).await?;
    let url = catalog.fetch_asset_url(&meta.path).await?;
    Ok(object.into_model(meta.name, url))
}

/// Keeps the first light stored under each id, whatever its kind.
fn unique_lights(lights: Vec<LightDocument>) -> Vec<LightDocument> {
    let mut seen = BTreeSet::new();
    lights
        .into_iter()
        .filter(|doc| {
            let first = seen.insert(doc.id);
            if !first {
                tracing::warn!(light = %doc.id, "skipping light with duplicate id");
            }
            first
        })
        .collect()
}

/// Turns a stored document into the `LOAD_PROJECT` payload, resolving every
/// object's metadata and asset url concurrently.
pub async fn resolve_project(
    catalog: &dyn ProjectStore,
    doc: ProjectDocument,
) -> Result<LoadedProject, LoadError> {
    let reference = doc.reference_location()?;
    let transform = doc.validated_scene()?;
    let lights = unique_lights(doc.lights);

    let mut objects = Vec::with_capacity(doc.objects.len());
    for object in doc.objects {
        if object.is_finite() {
            objects.push(object);
        } else {
            tracing::warn!(object = %object.id, "skipping object with non-finite placement");
        }
    }
    let models = try_join_all(objects.into_iter().map(|o| resolve_model(catalog, o))).await?;

    Ok(LoadedProject {
        meta: ProjectMeta {
            id: doc.id,
            name: doc.project_name,
            created_at: doc.created_at,
            thumb: doc.thumb,
        },
        reference,
        corners: doc.corners,
        is_first_time: doc.is_first_time,
        transform,
        models,
        lights,
    })
}

/// Fetches the user's project and replaces the session content with it.
pub async fn load_project(
    store: &SharedStore,
    catalog: &dyn ProjectStore,
    user_id: &str,
) -> Result<LoadedProject, LoadError> {
    let doc = catalog.fetch_project(user_id).await?;
    let loaded = resolve_project(catalog, doc).await?;
    tracing::info!(
        project = %loaded.meta.id,
        models = loaded.models.len(),
        lights = loaded.lights.len(),
        "project loaded"
    );
    store.lock().dispatch(Action::LoadProject(Box::new(loaded.clone())));
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::{LoadError, load_project};
    use crate::store::Store;
    use catalog::{CatalogError, InMemoryProjectStore};
    use foundation::math::Vec3;
    use foundation::time::TimestampMs;
    use formats::{LightDocument, ModelDocument, ModelObject, ProjectDocument};
    use scene::{AmbientLight, Light, LightId, ModelId, ModelScale, SpotLight};

    fn catalog_with_project() -> InMemoryProjectStore {
        let catalog = InMemoryProjectStore::new();
        catalog.insert_model(ModelDocument {
            id: "sofa".to_string(),
            name: "Sofa".to_string(),
            path: "sofa.glb".to_string(),
            thumb: None,
        });
        let mut doc = ProjectDocument::new("p1", "Home", TimestampMs(1));
        doc.latitude = Some(52.0);
        doc.longitude = Some(21.0);
        doc.orientation = Some(30.0);
        doc.objects.push(ModelObject {
            id: "o1".to_string(),
            model_id: "sofa".to_string(),
            position: Vec3::new(1.0, 0.0, 2.0),
            rotation: Vec3::ZERO,
            scale: ModelScale::Uniform(1.0),
            is_visible: true,
        });
        doc.lights.push(LightDocument {
            id: LightId(7),
            light: Light::Ambient(AmbientLight::new("Fill")),
        });
        catalog.insert_project("alice", doc);
        catalog
    }

    #[tokio::test]
    async fn load_resolves_models_and_replaces_state() {
        let catalog = catalog_with_project();
        let store = Store::new().into_shared();
        let loaded = load_project(&store, &catalog, "alice").await.expect("load");
        assert_eq!(loaded.models.len(), 1);

        let store = store.lock();
        let state = store.state();
        let model = state.scene.model(&ModelId::new("o1")).expect("model");
        assert_eq!(model.name, "Sofa");
        assert_eq!(model.url, "memory://assets/sofa.glb");
        assert_eq!(state.project.reference.map(|r| r.orientation), Some(30.0));
        assert!(state.lights.ambient().contains_key(&LightId(7)));
        assert!(state.lights.next_id() > LightId(7));
        assert!(!state.settings.unsaved_changes);
    }

    #[tokio::test]
    async fn missing_metadata_fails_without_touching_state() {
        let catalog = catalog_with_project();
        let mut doc = catalog.project("alice").expect("doc");
        doc.objects[0].model_id = "ghost".to_string();
        catalog.insert_project("alice", doc);

        let store = Store::new().into_shared();
        let err = load_project(&store, &catalog, "alice").await.expect_err("ghost model");
        assert!(matches!(err, LoadError::Catalog(CatalogError::NotFound(_))));
        assert!(store.lock().state().project.meta.is_none());
    }

    #[tokio::test]
    async fn partial_reference_is_rejected() {
        let catalog = catalog_with_project();
        let mut doc = catalog.project("alice").expect("doc");
        doc.longitude = None;
        catalog.insert_project("alice", doc);

        let store = Store::new().into_shared();
        assert!(matches!(
            load_project(&store, &catalog, "alice").await,
            Err(LoadError::Document(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_light_ids_keep_the_first_entry() {
        let catalog = catalog_with_project();
        let mut doc = catalog.project("alice").expect("doc");
        doc.lights.push(LightDocument {
            id: LightId(7),
            light: Light::Spot(SpotLight::new("Desk")),
        });
        catalog.insert_project("alice", doc);

        let store = Store::new().into_shared();
        let loaded = load_project(&store, &catalog, "alice").await.expect("load");
        assert_eq!(loaded.lights.len(), 1);
        let store = store.lock();
        let lights = &store.state().lights;
        assert_eq!(lights.len(), 1);
        assert!(lights.spot().is_empty());
        assert_eq!(lights.ambient()[&LightId(7)].common.name, "Fill");
    }
}
