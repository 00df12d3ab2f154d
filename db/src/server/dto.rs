use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vectordb_types::Metadata;

use crate::errors::ServiceError;
use crate::service::SearchResult;

#[derive(Debug, Deserialize)]
pub struct CreateLibraryRequest {
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLibraryRequest {
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub struct AddChunkRequest {
    pub document_id: Uuid,
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub struct UpdateChunkRequest {
    pub text: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
pub struct ListChunksQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Vec<f32>,
    pub k: usize,
    pub algorithm: String,
    pub filter: Option<Metadata>,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.k == 0 {
            return Err(ServiceError::Validation("k must be greater than zero".to_string()));
        }
        if !vectordb_similarity::ALGORITHM_TAGS.contains(&self.algorithm.as_str()) {
            return Err(ServiceError::Validation(format!(
                "algorithm must be one of {:?}",
                vectordb_similarity::ALGORITHM_TAGS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}
