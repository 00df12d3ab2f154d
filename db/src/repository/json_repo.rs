use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;
use vectordb_types::Library;

use super::{atomic_write, LibraryRepository};
use crate::errors::ServiceError;

/// Stores every library as a single JSON array in one file. The in-memory map is the source
/// of truth between calls; every mutating call rewrites the whole file.
pub struct JsonLibraryRepository {
    path: PathBuf,
    state: Mutex<HashMap<Uuid, Library>>,
}

impl JsonLibraryRepository {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ServiceError::Persistence(format!("reading {}: {e}", path.display())))?;
            let libraries: Vec<Library> = serde_json::from_str(&contents)
                .map_err(|e| ServiceError::Persistence(format!("decoding {}: {e}", path.display())))?;
            libraries.into_iter().map(|lib| (lib.id, lib)).collect()
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, state: &HashMap<Uuid, Library>) -> Result<(), ServiceError> {
        let libraries: Vec<&Library> = state.values().collect();
        let encoded = serde_json::to_vec_pretty(&libraries)
            .map_err(|e| ServiceError::Persistence(format!("encoding libraries: {e}")))?;
        atomic_write(&self.path, &encoded)
    }
}

impl LibraryRepository for JsonLibraryRepository {
    #[tracing::instrument(skip_all)]
    fn add(&self, library: &Library) -> Result<(), ServiceError> {
        let mut state = self.state.lock().expect("json repository mutex poisoned");
        state.insert(library.id, library.clone());
        self.persist(&state)
    }

    #[tracing::instrument(skip_all)]
    fn get(&self, id: Uuid) -> Result<Option<Library>, ServiceError> {
        let state = self.state.lock().expect("json repository mutex poisoned");
        Ok(state.get(&id).cloned())
    }

    #[tracing::instrument(skip_all)]
    fn update(&self, library: &Library) -> Result<(), ServiceError> {
        self.add(library)
    }

    #[tracing::instrument(skip_all)]
    fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let mut state = self.state.lock().expect("json repository mutex poisoned");
        state.remove(&id);
        self.persist(&state)
    }

    #[tracing::instrument(skip_all)]
    fn list_all(&self) -> Result<Vec<Library>, ServiceError> {
        let state = self.state.lock().expect("json repository mutex poisoned");
        Ok(state.values().cloned().collect())
    }
}
