use std::path::{Path, PathBuf};

use formats::{ModelDocument, ProjectDocument};
use tokio::sync::Mutex;

use crate::{BoxFuture, CatalogError, ProjectStore, SaveReceipt, check_id, check_project_id};

/// Directory-backed store.
///
/// Layout under `root`:
/// - `users/{user}/project.json`
/// - `models/{model}.json`
/// - `assets/{path}`
pub struct FileProjectStore {
    root: PathBuf,
    lock: Mutex<()>,
}

fn io_error(e: std::io::Error) -> CatalogError {
    CatalogError::Io(e.to_string())
}

impl FileProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn project_path(&self, user_id: &str) -> Result<PathBuf, CatalogError> {
        check_id(user_id)?;
        Ok(self.root.join("users").join(user_id).join("project.json"))
    }

    fn model_path(&self, model_id: &str) -> Result<PathBuf, CatalogError> {
        check_id(model_id)?;
        Ok(self.root.join("models").join(format!("{model_id}.json")))
    }

    fn asset_path(&self, path: &str) -> Result<PathBuf, CatalogError> {
        let mut out = self.root.join("assets");
        for segment in path.split('/') {
            check_id(segment)?;
            out.push(segment);
        }
        Ok(out)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
        what: impl FnOnce() -> String,
    ) -> Result<T, CatalogError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| CatalogError::Corrupt(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CatalogError::NotFound(what()))
            }
            Err(e) => Err(io_error(e)),
        }
    }

    async fn write_atomic(path: &Path, text: String) -> Result<(), CatalogError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await.map_err(io_error)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_error)?;
        Ok(())
    }

    /// Seeds or replaces asset metadata.
    pub async fn put_model_metadata(&self, model: &ModelDocument) -> Result<(), CatalogError> {
        let path = self.model_path(&model.id)?;
        let text = serde_json::to_string_pretty(model)
            .map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        let _g = self.lock.lock().await;
        Self::write_atomic(&path, text).await
    }

    /// Stores raw asset bytes under `assets/{path}`.
    pub async fn put_asset(&self, path: &str, bytes: &[u8]) -> Result<(), CatalogError> {
        let full = self.asset_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&full, bytes).await.map_err(io_error)
    }
}

impl ProjectStore for FileProjectStore {
    fn fetch_project<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectDocument, CatalogError>> {
        Box::pin(async move {
            let path = self.project_path(user_id)?;
            let _g = self.lock.lock().await;
            Self::read_json(&path, || format!("project of user {user_id}")).await
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
            let path = self.project_path(user_id)?;
            let content_hash = project.content_hash();
            let text = project
                .to_json_pretty()
                .map_err(|e| CatalogError::Corrupt(e.to_string()))?;

            let _g = self.lock.lock().await;
            let stored: Result<ProjectDocument, _> = Self::read_json(&path, String::new).await;
            match stored {
                Ok(stored) if stored.content_hash() == content_hash => {
                    tracing::debug!(user = user_id, project = project_id, "project unchanged");
                    return Ok(SaveReceipt {
                        content_hash,
                        written: false,
                    });
                }
                Ok(_) | Err(CatalogError::NotFound(_)) => {}
                // A corrupt file is overwritten by a good save.
                Err(CatalogError::Corrupt(msg)) => {
                    tracing::warn!(path = %path.display(), "replacing corrupt project: {msg}");
                }
                Err(e) => return Err(e),
            }

            Self::write_atomic(&path, text).await?;
            tracing::info!(user = user_id, project = project_id, "project saved");
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
            let path = self.model_path(model_id)?;
            Self::read_json(&path, || format!("model {model_id}")).await
        })
    }

    fn fetch_asset_url<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, CatalogError>> {
        Box::pin(async move {
            let full = self.asset_path(path)?;
            match tokio::fs::metadata(&full).await {
                Ok(meta) if meta.is_file() => Ok(format!("file://{}", full.display())),
                Ok(_) => Err(CatalogError::NotFound(format!("asset {path}"))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(CatalogError::NotFound(format!("asset {path}")))
                }
                Err(e) => Err(io_error(e)),
            }
        })
    }
}
