use ndarray::Array1;
use std::num::NonZeroUsize;

use crate::balltree::BallTree;
use crate::error::Error;
use crate::kdtree::KDTree;
use crate::linear::LinearIndex;

/// Algorithm tags accepted at the search boundary; anything else is a validation error.
pub const ALGORITHM_TAGS: [&str; 3] = ["kd", "ball", "linear"];

#[derive(Debug)]
pub enum Index {
    Kd(KDTree),
    Ball(BallTree),
    Linear(LinearIndex),
}

impl Index {
    /// Builds a fresh index over `points` for the given algorithm tag. Indices are never
    /// cached or reused across searches; each call pays the construction cost again.
    #[tracing::instrument(skip(points))]
    pub fn build(tag: &str, points: Vec<Array1<f32>>, dimension: NonZeroUsize) -> Result<Self, Error> {
        match tag {
            "kd" => Ok(Index::Kd(KDTree::new(points, dimension)?)),
            "ball" => Ok(Index::Ball(BallTree::new(points, dimension)?)),
            "linear" => Ok(Index::Linear(LinearIndex::new(points, dimension)?)),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn nearest(&self, target: &[f32], k: NonZeroUsize) -> Result<Vec<(usize, f32)>, Error> {
        match self {
            Index::Kd(tree) => tree.nearest(target, k),
            Index::Ball(tree) => tree.nearest(target, k),
            Index::Linear(index) => index.nearest(target, k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_algorithm_tag() {
        let err = Index::build("cosine", vec![], NonZeroUsize::new(3).unwrap());
        assert!(matches!(err, Err(Error::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn every_supported_tag_builds() {
        for tag in ALGORITHM_TAGS {
            let points = vec![Array1::from_vec(vec![0.0, 0.0, 0.0])];
            assert!(Index::build(tag, points, NonZeroUsize::new(3).unwrap()).is_ok());
        }
    }
}
