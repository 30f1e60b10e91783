//! Persistence collaborator for projects and furniture assets.
//!
//! The session core only knows the [`ProjectStore`] trait: every call is
//! asynchronous and may fail, and `save_project` may be called repeatedly
//! with the same content (upsert).

use std::future::Future;
use std::pin::Pin;

use formats::{ModelDocument, ProjectDocument};

pub mod file;
pub mod memory;

pub use file::FileProjectStore;
pub use memory::InMemoryProjectStore;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound(String),
    InvalidId(String),
    StorageUnavailable(String),
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(what) => write!(f, "not found: {what}"),
            CatalogError::InvalidId(id) => write!(f, "invalid id: {id:?}"),
            CatalogError::StorageUnavailable(msg) => write!(f, "storage unavailable: {msg}"),
            CatalogError::Corrupt(msg) => write!(f, "catalog storage corrupt: {msg}"),
            CatalogError::Io(msg) => write!(f, "catalog storage error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Outcome of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub content_hash: String,
    /// `false` when the stored artifact already had this content.
    pub written: bool,
}

/// Document store for projects, asset metadata and asset urls.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait ProjectStore: Send + Sync {
    /// The project owned by `user_id`.
    fn fetch_project<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<ProjectDocument, CatalogError>>;

    /// Idempotent upsert of `project` under `(user_id, project_id)`.
    fn save_project<'a>(
        &'a self,
        user_id: &'a str,
        project_id: &'a str,
        project: &'a ProjectDocument,
    ) -> BoxFuture<'a, Result<SaveReceipt, CatalogError>>;

    fn fetch_model_metadata<'a>(
        &'a self,
        model_id: &'a str,
    ) -> BoxFuture<'a, Result<ModelDocument, CatalogError>>;

    /// Resolves an asset storage path to a url the renderer can load.
    fn fetch_asset_url<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, CatalogError>>;
}

/// Ids become path segments; keep them to a safe alphabet.
pub(crate) fn check_id(id: &str) -> Result<(), CatalogError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !id.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(CatalogError::InvalidId(id.to_string()))
    }
}

pub(crate) fn check_project_id(project: &ProjectDocument, project_id: &str) -> Result<(), CatalogError> {
    if project.id != project_id {
        return Err(CatalogError::InvalidId(format!(
            "{project_id} (document id is {})",
            project.id
        )));
    }
    check_id(project_id)
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, check_id};

    #[test]
    fn ids_are_restricted_to_path_safe_characters() {
        assert!(check_id("user-1_a.b").is_ok());
        assert_eq!(check_id("../etc"), Err(CatalogError::InvalidId("../etc".to_string())));
        assert!(check_id("a/b").is_err());
        assert!(check_id("").is_err());
        assert!(check_id(".hidden").is_err());
    }
}
