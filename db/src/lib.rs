pub mod config;
pub mod errors;
pub mod pagination;
pub mod repository;
pub mod replication;
pub mod server;
pub mod service;

pub use config::Config;
pub use errors::ServiceError;
pub use service::{LibraryService, SearchResult};

use repository::LibraryRepository;
use replication::LeaderFollowerRepository;

/// Builds the repository stack described by `config`: a plain backend repository when no
/// followers are configured, or a leader-follower wrapper fanning writes out to every follower
/// path using the same backend encoding.
pub fn build_repository(config: &Config) -> Result<Box<dyn LibraryRepository>, ServiceError> {
    let leader = repository::create(&config.repo_type, &config.repository_paths())?;
    if config.follower_paths.is_empty() {
        return Ok(leader);
    }
    let followers = config
        .follower_paths
        .iter()
        .map(|path| repository::create_at(&config.repo_type, path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Box::new(LeaderFollowerRepository::new(leader, followers)))
}
