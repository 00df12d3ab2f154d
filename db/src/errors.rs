use thiserror::Error;
use uuid::Uuid;
use vectordb_similarity::Error as SimilarityError;
use vectordb_types::TypeError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("library {0} not found")]
    LibraryNotFound(Uuid),
    #[error("document {0} not found")]
    DocumentNotFound(Uuid),
    #[error("chunk {0} not found")]
    ChunkNotFound(Uuid),
    #[error("document {0} already exists")]
    DocumentAlreadyExists(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("replication failure: {0}")]
    Replication(String),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl ServiceError {
    /// Whether this error should surface as a 404 at the HTTP boundary, vs. a 400/422.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::LibraryNotFound(_)
                | ServiceError::DocumentNotFound(_)
                | ServiceError::ChunkNotFound(_)
        )
    }
}
