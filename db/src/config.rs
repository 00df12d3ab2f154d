use std::path::PathBuf;

use clap::Parser;

use crate::repository::RepositoryPaths;

/// Command-line and environment configuration for the server binary. Every field also reads
/// from an environment variable of the same name (upper-cased, `VECTORDB_` prefixed) so the
/// process can be wired purely through the environment in a container.
#[derive(Debug, Clone, Parser)]
#[command(name = "vectordb", about = "In-memory vector database with replicated persistence")]
pub struct Config {
    /// Backend encoding: json, pickle (alias for the binary blob), or sqlite (aliases sql, db).
    #[arg(long, env = "VECTORDB_REPO_TYPE", default_value = "json")]
    pub repo_type: String,

    #[arg(long, env = "VECTORDB_JSON_PATH", default_value = "data.json")]
    pub json_path: PathBuf,

    #[arg(long, env = "VECTORDB_PICKLE_PATH", default_value = "data.pkl")]
    pub pickle_path: PathBuf,

    #[arg(long, env = "VECTORDB_SQLITE_PATH", default_value = "data.db")]
    pub sqlite_path: PathBuf,

    /// Paths to additional follower repositories, same backend as `repo_type`, replicated
    /// best-effort on every write. Empty means no replication.
    #[arg(long, env = "VECTORDB_FOLLOWER_PATHS", value_delimiter = ',')]
    pub follower_paths: Vec<PathBuf>,

    #[arg(long, env = "VECTORDB_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "VECTORDB_PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "VECTORDB_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn repository_paths(&self) -> RepositoryPaths {
        RepositoryPaths {
            json_path: self.json_path.clone(),
            blob_path: self.pickle_path.clone(),
            sqlite_path: self.sqlite_path.clone(),
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_paths() {
        let config = Config::parse_from(["vectordb"]);
        assert_eq!(config.repo_type, "json");
        assert_eq!(config.json_path, PathBuf::from("data.json"));
        assert!(config.follower_paths.is_empty());
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn follower_paths_split_on_commas() {
        let config = Config::parse_from([
            "vectordb",
            "--follower-paths",
            "a.json,b.json,c.json",
        ]);
        assert_eq!(
            config.follower_paths,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json"), PathBuf::from("c.json")]
        );
    }
}
