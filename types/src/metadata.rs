use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A mapping from string keys to arbitrary JSON scalars or nested values, attached to a
/// library, document, or chunk.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Pure equality-AND predicate: a chunk matches when every key in `filter` is present in its
/// metadata with an equal value. An empty filter matches everything.
pub fn matches(metadata: &Metadata, filter: &Metadata) -> bool {
    filter
        .iter()
        .all(|(key, value)| metadata.get(key) == Some(value))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter(pub Metadata);

impl MetadataFilter {
    pub fn matches(&self, metadata: &Metadata) -> bool {
        matches(metadata, &self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(pairs: &[(&str, serde_json::Value)]) -> Metadata {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let metadata = meta(&[("tag", json!("keep"))]);
        assert!(matches(&metadata, &Metadata::new()));
    }

    #[test]
    fn filter_requires_all_keys_to_match() {
        let metadata = meta(&[("tag", json!("keep")), ("lang", json!("en"))]);
        let filter = meta(&[("tag", json!("keep"))]);
        assert!(matches(&metadata, &filter));

        let filter_miss = meta(&[("tag", json!("drop"))]);
        assert!(!matches(&metadata, &filter_miss));
    }

    #[test]
    fn missing_key_fails_match() {
        let metadata = meta(&[("tag", json!("keep"))]);
        let filter = meta(&[("lang", json!("en"))]);
        assert!(!matches(&metadata, &filter));
    }
}
