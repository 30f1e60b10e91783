use std::collections::BTreeMap;

use formats::{ModelDocument, ProjectDocument};
use parking_lot::Mutex;

use crate::{BoxFuture, CatalogError, ProjectStore, SaveReceipt, check_id, check_project_id};

#[derive(Debug, Default)]
struct Inner {
    /// One project per user.
    projects: BTreeMap<String, ProjectDocument>,
    models: BTreeMap<String, ModelDocument>,
    fail_saves: bool,
    save_calls: u64,
    writes: u64,
}

/// Deterministic in-memory store, for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    inner: Mutex<Inner>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&self, user_id: impl Into<String>, project: ProjectDocument) {
        self.inner.lock().projects.insert(user_id.into(), project);
    }

    pub fn insert_model(&self, model: ModelDocument) {
        self.inner.lock().models.insert(model.id.clone(), model);
    }

    pub fn project(&self, user_id: &str) -> Option<ProjectDocument> {
        self.inner.lock().projects.get(user_id).cloned()
    }

    /// Makes every following `save_project` fail until reset.
    pub fn set_fail_saves(&self, fail: bool) {
        self.inner.lock().fail_saves = fail;
    }

    pub fn save_calls(&self) -> u64 {
        self.inner.lock().save_calls
    }

    /// Saves that actually changed the stored artifact.
    pub fn writes(&self) -> u64 {
        self.inner.lock().writes
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn fetch_project<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectDocument, CatalogError>> {
        Box::pin(async move {
            self.project(user_id)
                .ok_or_else(|| CatalogError::NotFound(format!("project of user {user_id}")))
        })
    }

    fn save_project<'a>(
        &'a self,
        user_id: &'a str,
        project_id: &'a str,
        project: &'a ProjectDocument,
    ) -> BoxFuture<'a, Result<SaveReceipt, CatalogError>> {
        Box::pin(async move {
            check_project_id(project, project_id)?;
            let mut inner = self.inner.lock();
            inner.save_calls += 1;
            if inner.fail_saves {
                return Err(CatalogError::StorageUnavailable(
                    "saves are disabled".to_string(),
                ));
            }

            let content_hash = project.content_hash();
            let unchanged = inner
                .projects
                .get(user_id)
                .is_some_and(|stored| stored.content_hash() == content_hash);
            if unchanged {
                return Ok(SaveReceipt {
                    content_hash,
                    written: false,
                });
            }

            inner.projects.insert(user_id.to_string(), project.clone());
            inner.writes += 1;
            Ok(SaveReceipt {
                content_hash,
                written: true,
            })
        })
    }

    fn fetch_model_metadata<'a>(
        &'a self,
        model_id: &'a str,
    ) -> BoxFuture<'a, Result<ModelDocument, CatalogError>> {
        Box::pin(async move {
            self.inner
                .lock()
                .models
                .get(model_id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound(format!("model {model_id}")))
        })
    }

    fn fetch_asset_url<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, CatalogError>> {
        Box::pin(async move {
            for segment in path.split('/') {
                check_id(segment)?;
            }
            Ok(format!("memory://assets/{path}"))
        })
    }
}
