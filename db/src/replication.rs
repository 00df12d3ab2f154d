use uuid::Uuid;
use vectordb_types::Library;

use crate::errors::ServiceError;
use crate::repository::LibraryRepository;

/// Wraps one leader and any number of followers behind the same repository interface.
/// Writes hit the leader first; a leader failure aborts before any follower is touched. Reads
/// are leader-only, so followers never have to serve consistent data on their own. There is no
/// quorum and no rollback: a follower that fails during fan-out is a surfaced error, but the
/// leader's write already stands.
pub struct LeaderFollowerRepository {
    leader: Box<dyn LibraryRepository>,
    followers: Vec<Box<dyn LibraryRepository>>,
}

impl LeaderFollowerRepository {
    pub fn new(leader: Box<dyn LibraryRepository>, followers: Vec<Box<dyn LibraryRepository>>) -> Self {
        Self { leader, followers }
    }

    fn fan_out<F>(&self, mut op: F) -> Result<(), ServiceError>
    where
        F: FnMut(&dyn LibraryRepository) -> Result<(), ServiceError>,
    {
        op(self.leader.as_ref())?;
        for (index, follower) in self.followers.iter().enumerate() {
            if let Err(err) = op(follower.as_ref()) {
                tracing::error!(follower_index = index, error = %err, "follower failed during fan-out");
                return Err(ServiceError::Replication(format!(
                    "follower {index} failed: {err}"
                )));
            }
        }
        Ok(())
    }
}

impl LibraryRepository for LeaderFollowerRepository {
    #[tracing::instrument(skip_all)]
    fn add(&self, library: &Library) -> Result<(), ServiceError> {
        self.fan_out(|repo| repo.add(library))
    }

    #[tracing::instrument(skip_all)]
    fn get(&self, id: Uuid) -> Result<Option<Library>, ServiceError> {
        self.leader.get(id)
    }

    #[tracing::instrument(skip_all)]
    fn update(&self, library: &Library) -> Result<(), ServiceError> {
        self.fan_out(|repo| repo.update(library))
    }

    #[tracing::instrument(skip_all)]
    fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.fan_out(|repo| repo.delete(id))
    }

    #[tracing::instrument(skip_all)]
    fn list_all(&self) -> Result<Vec<Library>, ServiceError> {
        self.leader.list_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::JsonLibraryRepository;
    use vectordb_types::Metadata;

    fn repo_at(dir: &tempfile::TempDir, name: &str) -> Box<dyn LibraryRepository> {
        Box::new(JsonLibraryRepository::new(dir.path().join(name)).unwrap())
    }

    #[test]
    fn writes_reach_leader_and_every_follower() {
        let dir = tempfile::tempdir().unwrap();
        let leader = repo_at(&dir, "leader.json");
        let follower_a = repo_at(&dir, "follower_a.json");
        let follower_b = repo_at(&dir, "follower_b.json");
        let replicator = LeaderFollowerRepository::new(leader, vec![follower_a, follower_b]);

        let library = Library::new("lib".to_string(), Metadata::new());
        replicator.add(&library).unwrap();

        let leader_check = JsonLibraryRepository::new(dir.path().join("leader.json")).unwrap();
        let follower_a_check = JsonLibraryRepository::new(dir.path().join("follower_a.json")).unwrap();
        let follower_b_check = JsonLibraryRepository::new(dir.path().join("follower_b.json")).unwrap();

        assert_eq!(leader_check.get(library.id).unwrap().unwrap(), library);
        assert_eq!(follower_a_check.get(library.id).unwrap().unwrap(), library);
        assert_eq!(follower_b_check.get(library.id).unwrap().unwrap(), library);
    }

    #[test]
    fn reads_only_touch_the_leader() {
        let dir = tempfile::tempdir().unwrap();
        let leader = repo_at(&dir, "leader.json");
        let follower = repo_at(&dir, "follower.json");
        let library = Library::new("lib".to_string(), Metadata::new());
        leader.add(&library).unwrap();

        let replicator = LeaderFollowerRepository::new(leader, vec![follower]);
        assert_eq!(replicator.get(library.id).unwrap().unwrap(), library);
    }
}
