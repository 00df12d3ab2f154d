use thiserror::Error;

/// Construction-time failures for the domain model itself, as distinct from the richer
/// `ServiceError` the `db` crate raises once a repository and index are involved.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum TypeError {
    #[error("embedding must not be empty")]
    EmptyEmbedding,
}
