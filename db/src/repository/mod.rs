mod blob_repo;
mod json_repo;
mod sqlite_repo;

pub use blob_repo::BlobLibraryRepository;
pub use json_repo::JsonLibraryRepository;
pub use sqlite_repo::SqliteLibraryRepository;

use std::path::{Path, PathBuf};
use uuid::Uuid;
use vectordb_types::Library;

use crate::errors::ServiceError;

/// Shared contract across every persistence encoding. `add`/`update` are both insert-or-replace
/// by id; `delete` on a missing id is a no-op, never an error.
pub trait LibraryRepository: Send + Sync {
    fn add(&self, library: &Library) -> Result<(), ServiceError>;
    fn get(&self, id: Uuid) -> Result<Option<Library>, ServiceError>;
    fn update(&self, library: &Library) -> Result<(), ServiceError>;
    fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
    fn list_all(&self) -> Result<Vec<Library>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct RepositoryPaths {
    pub json_path: PathBuf,
    pub blob_path: PathBuf,
    pub sqlite_path: PathBuf,
}

impl Default for RepositoryPaths {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from("data.json"),
            blob_path: PathBuf::from("data.pkl"),
            sqlite_path: PathBuf::from("data.db"),
        }
    }
}

/// Maps a backend tag to a concrete repository. `"sql"`/`"db"` are accepted aliases for
/// `"sqlite"`, matching the original service's env-driven selection.
pub fn create(tag: &str, paths: &RepositoryPaths) -> Result<Box<dyn LibraryRepository>, ServiceError> {
    match tag {
        "json" => create_at(tag, &paths.json_path),
        "pickle" | "blob" => create_at(tag, &paths.blob_path),
        "sqlite" | "sql" | "db" => create_at(tag, &paths.sqlite_path),
        other => Err(ServiceError::Validation(format!(
            "unsupported repository backend: {other}"
        ))),
    }
}

/// Builds a single repository of the given backend tag rooted at an arbitrary path — used for
/// follower repositories, which share the leader's backend but live at their own path.
pub fn create_at(tag: &str, path: &Path) -> Result<Box<dyn LibraryRepository>, ServiceError> {
    match tag {
        "json" => Ok(Box::new(JsonLibraryRepository::new(path)?)),
        "pickle" | "blob" => Ok(Box::new(BlobLibraryRepository::new(path)?)),
        "sqlite" | "sql" | "db" => Ok(Box::new(SqliteLibraryRepository::new(path)?)),
        other => Err(ServiceError::Validation(format!(
            "unsupported repository backend: {other}"
        ))),
    }
}

/// Writes `contents` to `path` via a `.tmp` companion file followed by an atomic rename, so a
/// crash mid-write never leaves a torn file in place.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), ServiceError> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, contents)
        .map_err(|e| ServiceError::Persistence(format!("writing {}: {e}", tmp_path.display())))?;
    std::fs::rename(&tmp_path, path)
        .map_err(|e| ServiceError::Persistence(format!("renaming {}: {e}", tmp_path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_unknown_backend_tag() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RepositoryPaths {
            json_path: dir.path().join("data.json"),
            blob_path: dir.path().join("data.pkl"),
            sqlite_path: dir.path().join("data.db"),
        };
        let err = create("yaml", &paths);
        assert!(matches!(err, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn create_and_create_at_agree_on_every_known_tag() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RepositoryPaths {
            json_path: dir.path().join("data.json"),
            blob_path: dir.path().join("data.pkl"),
            sqlite_path: dir.path().join("data.db"),
        };
        for tag in ["json", "pickle", "sqlite", "sql", "db"] {
            create(tag, &paths).unwrap();
        }
    }
}
