use std::num::NonZeroUsize;

use ndarray::Array1;
use serde::Serialize;
use uuid::Uuid;
use vectordb_similarity::{distance::euclidean_distance, Index};
use vectordb_types::metadata;
use vectordb_types::{Chunk, Document, Library, Metadata};

use crate::errors::ServiceError;
use crate::pagination::paginate;
use crate::repository::LibraryRepository;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub distance: f32,
}

/// The single entry point for every aggregate mutation and query. Every operation loads the
/// library, mutates it in memory, and persists the whole aggregate back through the
/// repository — there is no independent lifetime for a document or chunk.
pub struct LibraryService {
    repository: Box<dyn LibraryRepository>,
}

impl LibraryService {
    pub fn new(repository: Box<dyn LibraryRepository>) -> Self {
        Self { repository }
    }

    #[tracing::instrument(skip(self, metadata))]
    pub fn create_library(&self, name: String, metadata: Metadata) -> Result<Library, ServiceError> {
        let library = Library::new(name, metadata);
        self.repository.add(&library)?;
        Ok(library)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_library(&self, id: Uuid) -> Result<Library, ServiceError> {
        self.repository
            .get(id)?
            .ok_or(ServiceError::LibraryNotFound(id))
    }

    #[tracing::instrument(skip(self, metadata))]
    pub fn update_library(
        &self,
        id: Uuid,
        name: String,
        metadata: Metadata,
    ) -> Result<Library, ServiceError> {
        let mut library = self.get_library(id)?;
        library.name = name;
        library.metadata = metadata;
        self.repository.update(&library)?;
        Ok(library)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_library(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_library(id)?;
        self.repository.delete(id)
    }

    #[tracing::instrument(skip(self, metadata))]
    pub fn create_document(
        &self,
        lib_id: Uuid,
        doc_id: Option<Uuid>,
        title: String,
        metadata: Metadata,
    ) -> Result<Document, ServiceError> {
        let mut library = self.get_library(lib_id)?;
        if let Some(doc_id) = doc_id {
            if library.documents.iter().any(|doc| doc.id == doc_id) {
                return Err(ServiceError::DocumentAlreadyExists(doc_id));
            }
        }
        let mut document = Document::new(title, metadata);
        if let Some(doc_id) = doc_id {
            document.id = doc_id;
        }
        library.documents.push(document.clone());
        self.repository.update(&library)?;
        Ok(document)
    }

    #[tracing::instrument(skip(self))]
    pub fn list_documents(&self, lib_id: Uuid) -> Result<Vec<Document>, ServiceError> {
        Ok(self.get_library(lib_id)?.documents)
    }

    #[tracing::instrument(skip(self, embedding, metadata))]
    pub fn add_chunk(
        &self,
        lib_id: Uuid,
        doc_id: Uuid,
        text: String,
        embedding: Vec<f32>,
        metadata: Metadata,
    ) -> Result<Chunk, ServiceError> {
        let mut library = self.get_library(lib_id)?;
        let document = library
            .documents
            .iter_mut()
            .find(|doc| doc.id == doc_id)
            .ok_or(ServiceError::DocumentNotFound(doc_id))?;
        let chunk = Chunk::new(text, embedding, metadata)?;
        document.chunks.push(chunk.clone());
        self.repository.update(&library)?;
        Ok(chunk)
    }

    #[tracing::instrument(skip(self))]
    pub fn list_chunks(
        &self,
        lib_id: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Chunk>, ServiceError> {
        let library = self.get_library(lib_id)?;
        let all: Vec<Chunk> = library.all_chunks().map(|(_, chunk)| chunk.clone()).collect();
        Ok(paginate(&all, offset, limit).to_vec())
    }

    #[tracing::instrument(skip(self, text, embedding, metadata))]
    pub fn update_chunk(
        &self,
        lib_id: Uuid,
        chunk_id: Uuid,
        text: Option<String>,
        embedding: Option<Vec<f32>>,
        metadata: Option<Metadata>,
    ) -> Result<Chunk, ServiceError> {
        if text.is_none() && embedding.is_none() && metadata.is_none() {
            return Err(ServiceError::Validation(
                "chunk update must supply at least one of text/embedding/metadata".to_string(),
            ));
        }
        if let Some(embedding) = &embedding {
            if embedding.is_empty() {
                return Err(ServiceError::Validation(
                    "embedding must not be empty".to_string(),
                ));
            }
        }

        let mut library = self.get_library(lib_id)?;
        let mut updated = None;
        'documents: for document in library.documents.iter_mut() {
            for chunk in document.chunks.iter_mut() {
                if chunk.id != chunk_id {
                    continue;
                }
                if let Some(text) = text {
                    chunk.text = text;
                }
                if let Some(embedding) = embedding {
                    chunk.embedding = embedding;
                }
                if let Some(metadata) = metadata {
                    chunk.metadata = metadata;
                }
                updated = Some(chunk.clone());
                break 'documents;
            }
        }

        let chunk = updated.ok_or(ServiceError::ChunkNotFound(chunk_id))?;
        self.repository.update(&library)?;
        Ok(chunk)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_chunk(&self, lib_id: Uuid, chunk_id: Uuid) -> Result<(), ServiceError> {
        let mut library = self.get_library(lib_id)?;
        let mut found = false;
        for document in library.documents.iter_mut() {
            let before = document.chunks.len();
            document.chunks.retain(|chunk| chunk.id != chunk_id);
            if document.chunks.len() != before {
                found = true;
                break;
            }
        }
        if !found {
            return Err(ServiceError::ChunkNotFound(chunk_id));
        }
        self.repository.update(&library)
    }

    /// Search orchestration: load, flatten, filter, validate shared dimension, build the
    /// chosen index over the survivors, query, and recompute distances from the raw vectors.
    #[tracing::instrument(skip(self, query, filter))]
    pub fn search(
        &self,
        lib_id: Uuid,
        query: &[f32],
        k: usize,
        algorithm: &str,
        filter: Option<&Metadata>,
    ) -> Result<Vec<SearchResult>, ServiceError> {
        if k == 0 {
            return Err(ServiceError::Validation("k must be greater than zero".to_string()));
        }

        let library = self.get_library(lib_id)?;
        let mut survivors: Vec<Chunk> = library.all_chunks().map(|(_, chunk)| chunk.clone()).collect();

        if let Some(filter) = filter {
            survivors.retain(|chunk| metadata::matches(&chunk.metadata, filter));
        }

        if survivors.is_empty() {
            return Ok(vec![]);
        }

        let dimension = survivors[0].embedding.len();
        if survivors.iter().any(|chunk| chunk.embedding.len() != dimension) {
            return Err(ServiceError::Validation(
                "survivors do not share a common embedding length".to_string(),
            ));
        }

        let dimension = NonZeroUsize::new(dimension).expect("chunk embeddings are never empty");
        let k = NonZeroUsize::new(k.min(survivors.len())).expect("survivors is non-empty");

        let points: Vec<Array1<f32>> = survivors
            .iter()
            .map(|chunk| Array1::from_vec(chunk.embedding.clone()))
            .collect();
        let index = Index::build(algorithm, points, dimension)?;
        let neighbours = index.nearest(query, k)?;

        Ok(neighbours
            .into_iter()
            .map(|(idx, _)| {
                let chunk = survivors[idx].clone();
                let distance = euclidean_distance(query, &chunk.embedding);
                SearchResult { chunk, distance }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::JsonLibraryRepository;
    use serde_json::json;

    fn service() -> (tempfile::TempDir, LibraryService) {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonLibraryRepository::new(dir.path().join("data.json")).unwrap();
        (dir, LibraryService::new(Box::new(repo)))
    }

    #[test]
    fn create_then_get_returns_same_entity() {
        let (_dir, svc) = service();
        let lib = svc.create_library("lib".to_string(), Metadata::new()).unwrap();
        let fetched = svc.get_library(lib.id).unwrap();
        assert_eq!(lib, fetched);
    }

    #[test]
    fn get_missing_library_is_not_found() {
        let (_dir, svc) = service();
        let err = svc.get_library(Uuid::new_v4());
        assert!(matches!(err, Err(ServiceError::LibraryNotFound(_))));
    }

    #[test]
    fn create_document_rejects_duplicate_id() {
        let (_dir, svc) = service();
        let lib = svc.create_library("lib".to_string(), Metadata::new()).unwrap();
        let doc_id = Uuid::new_v4();
        svc.create_document(lib.id, Some(doc_id), "doc".to_string(), Metadata::new())
            .unwrap();
        let err = svc.create_document(lib.id, Some(doc_id), "doc".to_string(), Metadata::new());
        assert!(matches!(err, Err(ServiceError::DocumentAlreadyExists(_))));
    }

    #[test]
    fn update_chunk_requires_at_least_one_field() {
        let (_dir, svc) = service();
        let lib = svc.create_library("lib".to_string(), Metadata::new()).unwrap();
        let doc = svc
            .create_document(lib.id, None, "doc".to_string(), Metadata::new())
            .unwrap();
        let chunk = svc
            .add_chunk(lib.id, doc.id, "a".to_string(), vec![1.0], Metadata::new())
            .unwrap();
        let err = svc.update_chunk(lib.id, chunk.id, None, None, None);
        assert!(matches!(err, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn self_match_search_has_zero_distance_on_every_algorithm() {
        for algorithm in ["kd", "ball", "linear"] {
            let (_dir, svc) = service();
            let lib = svc.create_library("lib".to_string(), Metadata::new()).unwrap();
            let doc = svc
                .create_document(lib.id, None, "doc".to_string(), Metadata::new())
                .unwrap();
            let embedding = vec![0.24475098, 0.33691406, 0.015457153, 0.12213135, -9.1552734e-05];
            svc.add_chunk(lib.id, doc.id, "a".to_string(), embedding.clone(), Metadata::new())
                .unwrap();

            let results = svc.search(lib.id, &embedding, 1, algorithm, None).unwrap();
            assert_eq!(results.len(), 1);
            assert!(results[0].distance < 1e-6);
        }
    }

    #[test]
    fn metadata_filter_excludes_non_matching_chunks() {
        let (_dir, svc) = service();
        let lib = svc.create_library("lib".to_string(), Metadata::new()).unwrap();
        let doc = svc
            .create_document(lib.id, None, "doc".to_string(), Metadata::new())
            .unwrap();
        let keep_meta: Metadata = [("tag".to_string(), json!("keep"))].into_iter().collect();
        let drop_meta: Metadata = [("tag".to_string(), json!("drop"))].into_iter().collect();
        let keep = svc
            .add_chunk(lib.id, doc.id, "a".to_string(), vec![0.0, 0.0, 0.0], keep_meta)
            .unwrap();
        svc.add_chunk(lib.id, doc.id, "b".to_string(), vec![0.0, 0.0, 0.0], drop_meta)
            .unwrap();

        let filter: Metadata = [("tag".to_string(), json!("keep"))].into_iter().collect();
        let results = svc
            .search(lib.id, &[0.0, 0.0, 0.0], 1, "linear", Some(&filter))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, keep.id);
    }

    #[test]
    fn k_larger_than_population_returns_everything() {
        let (_dir, svc) = service();
        let lib = svc.create_library("lib".to_string(), Metadata::new()).unwrap();
        let doc = svc
            .create_document(lib.id, None, "doc".to_string(), Metadata::new())
            .unwrap();
        svc.add_chunk(lib.id, doc.id, "a".to_string(), vec![0.0], Metadata::new())
            .unwrap();
        svc.add_chunk(lib.id, doc.id, "b".to_string(), vec![1.0], Metadata::new())
            .unwrap();

        let results = svc.search(lib.id, &[0.0], 5, "linear", None).unwrap();
        assert_eq!(results.len(), 2);
    }
}
