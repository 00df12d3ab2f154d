use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;
use crate::metadata::Metadata;

/// A text chunk carrying a dense embedding. Identity is immutable once assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: Uuid,
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(text: String, embedding: Vec<f32>, metadata: Metadata) -> Result<Self, TypeError> {
        if embedding.is_empty() {
            return Err(TypeError::EmptyEmbedding);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            text,
            embedding,
            metadata,
        })
    }
}

/// A named collection of chunks. Chunk ids are unique within a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(title: String, metadata: Metadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            chunks: Vec::new(),
            metadata,
        }
    }
}

/// The top-level aggregate. Exclusively owns its documents, which exclusively own their
/// chunks; persistence always serialises the library as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Library {
    pub fn new(name: String, metadata: Metadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            documents: Vec::new(),
            metadata,
        }
    }

    /// Every chunk across every document, paired with the id of its owning document.
    pub fn all_chunks(&self) -> impl Iterator<Item = (&Document, &Chunk)> {
        self.documents
            .iter()
            .flat_map(|doc| doc.chunks.iter().map(move |chunk| (doc, chunk)))
    }
}
