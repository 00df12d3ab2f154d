use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;
use vectordb_types::Library;

use super::LibraryRepository;
use crate::errors::ServiceError;

fn persistence_error(context: &str, err: rusqlite::Error) -> ServiceError {
    ServiceError::Persistence(format!("{context}: {err}"))
}

/// A single table, `libraries(id TEXT PRIMARY KEY, data TEXT NOT NULL)`, holding each
/// library's JSON encoding. WAL journaling lets readers and the single writer coexist on one
/// shared connection.
pub struct SqliteLibraryRepository {
    connection: Mutex<Connection>,
}

impl SqliteLibraryRepository {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let connection = Connection::open(path.as_ref())
            .map_err(|e| persistence_error("opening sqlite database", e))?;
        connection
            .pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| persistence_error("enabling WAL journaling", e))?;
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS libraries (id TEXT PRIMARY KEY, data TEXT NOT NULL)",
                [],
            )
            .map_err(|e| persistence_error("creating libraries table", e))?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

impl LibraryRepository for SqliteLibraryRepository {
    #[tracing::instrument(skip_all)]
    fn add(&self, library: &Library) -> Result<(), ServiceError> {
        let encoded = serde_json::to_string(library)
            .map_err(|e| ServiceError::Persistence(format!("encoding library: {e}")))?;
        let connection = self.connection.lock().expect("sqlite connection mutex poisoned");
        connection
            .execute(
                "INSERT OR REPLACE INTO libraries (id, data) VALUES (?1, ?2)",
                params![library.id.to_string(), encoded],
            )
            .map_err(|e| persistence_error("upserting library", e))?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    fn get(&self, id: Uuid) -> Result<Option<Library>, ServiceError> {
        let connection = self.connection.lock().expect("sqlite connection mutex poisoned");
        let data: Option<String> = connection
            .query_row(
                "SELECT data FROM libraries WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| persistence_error("selecting library", e))?;
        data.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| ServiceError::Persistence(format!("decoding library: {e}")))
        })
        .transpose()
    }

    #[tracing::instrument(skip_all)]
    fn update(&self, library: &Library) -> Result<(), ServiceError> {
        self.add(library)
    }

    #[tracing::instrument(skip_all)]
    fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let connection = self.connection.lock().expect("sqlite connection mutex poisoned");
        connection
            .execute("DELETE FROM libraries WHERE id = ?1", params![id.to_string()])
            .map_err(|e| persistence_error("deleting library", e))?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    fn list_all(&self) -> Result<Vec<Library>, ServiceError> {
        let connection = self.connection.lock().expect("sqlite connection mutex poisoned");
        let mut statement = connection
            .prepare("SELECT data FROM libraries")
            .map_err(|e| persistence_error("preparing list_all", e))?;
        let rows = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| persistence_error("querying libraries", e))?;
        let mut libraries = Vec::new();
        for row in rows {
            let json = row.map_err(|e| persistence_error("reading library row", e))?;
            let library = serde_json::from_str(&json)
                .map_err(|e| ServiceError::Persistence(format!("decoding library: {e}")))?;
            libraries.push(library);
        }
        Ok(libraries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectordb_types::Metadata;

    #[test]
    fn round_trips_through_a_fresh_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        let library = Library::new("lib".to_string(), Metadata::new());
        {
            let repo = SqliteLibraryRepository::new(&path).unwrap();
            repo.add(&library).unwrap();
        }

        let repo = SqliteLibraryRepository::new(&path).unwrap();
        let loaded = repo.get(library.id).unwrap().unwrap();
        assert_eq!(loaded, library);
    }

    #[test]
    fn get_on_missing_id_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteLibraryRepository::new(dir.path().join("data.db")).unwrap();
        assert!(repo.get(Uuid::new_v4()).unwrap().is_none());
    }
}
