use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;
use vectordb_types::Library;

use super::{atomic_write, LibraryRepository};
use crate::errors::ServiceError;

/// Stores the entire `id -> library` map as one `bincode`-encoded blob. Not a portable format
/// across language runtimes; intended for same-process-family round trips only.
pub struct BlobLibraryRepository {
    path: PathBuf,
    state: Mutex<HashMap<Uuid, Library>>,
}

impl BlobLibraryRepository {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read(&path)
                .map_err(|e| ServiceError::Persistence(format!("reading {}: {e}", path.display())))?;
            bincode::deserialize(&contents)
                .map_err(|e| ServiceError::Persistence(format!("decoding {}: {e}", path.display())))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, state: &HashMap<Uuid, Library>) -> Result<(), ServiceError> {
        let encoded = bincode::serialize(state)
            .map_err(|e| ServiceError::Persistence(format!("encoding libraries: {e}")))?;
        atomic_write(&self.path, &encoded)
    }
}

impl LibraryRepository for BlobLibraryRepository {
    #[tracing::instrument(skip_all)]
    fn add(&self, library: &Library) -> Result<(), ServiceError> {
        let mut state = self.state.lock().expect("blob repository mutex poisoned");
        state.insert(library.id, library.clone());
        self.persist(&state)
    }

    #[tracing::instrument(skip_all)]
    fn get(&self, id: Uuid) -> Result<Option<Library>, ServiceError> {
        let state = self.state.lock().expect("blob repository mutex poisoned");
        Ok(state.get(&id).cloned())
    }

    #[tracing::instrument(skip_all)]
    fn update(&self, library: &Library) -> Result<(), ServiceError> {
        self.add(library)
    }

    #[tracing::instrument(skip_all)]
    fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let mut state = self.state.lock().expect("blob repository mutex poisoned");
        state.remove(&id);
        self.persist(&state)
    }

    #[tracing::instrument(skip_all)]
    fn list_all(&self) -> Result<Vec<Library>, ServiceError> {
        let state = self.state.lock().expect("blob repository mutex poisoned");
        Ok(state.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectordb_types::Metadata;

    #[test]
    fn round_trips_through_a_fresh_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.pkl");

        let library = Library::new("lib".to_string(), Metadata::new());
        {
            let repo = BlobLibraryRepository::new(&path).unwrap();
            repo.add(&library).unwrap();
        }

        let repo = BlobLibraryRepository::new(&path).unwrap();
        let loaded = repo.get(library.id).unwrap().unwrap();
        assert_eq!(loaded, library);
    }
}
