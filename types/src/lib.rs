pub mod error;
pub mod metadata;
pub mod model;

pub use error::TypeError;
pub use metadata::Metadata;
pub use model::{Chunk, Document, Library};
