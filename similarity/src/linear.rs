use ndarray::Array1;
use std::num::NonZeroUsize;

use crate::distance::euclidean_distance;
use crate::error::Error;

/// Retains a reference-free copy of the input vectors and scans all of them on every query.
/// Construction is O(1); `nearest` is O(n log n) thanks to the final sort.
#[derive(Debug)]
pub struct LinearIndex {
    points: Vec<Array1<f32>>,
    dimension: usize,
}

impl LinearIndex {
    pub fn new(points: Vec<Array1<f32>>, dimension: NonZeroUsize) -> Result<Self, Error> {
        for point in &points {
            if point.len() != dimension.get() {
                return Err(Error::DimensionMismatch {
                    expected: dimension.get(),
                    found: point.len(),
                });
            }
        }
        Ok(Self {
            points,
            dimension: dimension.get(),
        })
    }

    #[tracing::instrument(skip_all)]
    pub fn nearest(&self, target: &[f32], k: NonZeroUsize) -> Result<Vec<(usize, f32)>, Error> {
        if target.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: target.len(),
            });
        }

        let mut distances: Vec<(usize, f32)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| {
                (
                    idx,
                    euclidean_distance(target, point.as_slice().expect("contiguous embedding")),
                )
            })
            .collect();

        distances.sort_by(|(idx_a, dist_a), (idx_b, dist_b)| {
            dist_a
                .partial_cmp(dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(idx_a.cmp(idx_b))
        });
        distances.truncate(k.get());
        Ok(distances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec1(values: &[f32]) -> Array1<f32> {
        Array1::from_vec(values.to_vec())
    }

    #[test]
    fn returns_k_nearest_in_ascending_order() {
        let points = vec![
            vec1(&[0.0, 0.0]),
            vec1(&[1.0, 0.0]),
            vec1(&[3.0, 0.0]),
            vec1(&[0.5, 0.0]),
        ];
        let index = LinearIndex::new(points, NonZeroUsize::new(2).unwrap()).unwrap();
        let result = index.nearest(&[0.0, 0.0], NonZeroUsize::new(2).unwrap()).unwrap();
        assert_eq!(result[0].0, 0);
        assert_eq!(result[1].0, 3);
    }

    #[test]
    fn returns_all_points_when_k_exceeds_count() {
        let points = vec![vec1(&[0.0, 0.0]), vec1(&[1.0, 0.0])];
        let index = LinearIndex::new(points, NonZeroUsize::new(2).unwrap()).unwrap();
        let result = index.nearest(&[0.0, 0.0], NonZeroUsize::new(5).unwrap()).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn rejects_mismatched_query_dimension() {
        let points = vec![vec1(&[0.0, 0.0])];
        let index = LinearIndex::new(points, NonZeroUsize::new(2).unwrap()).unwrap();
        let err = index.nearest(&[0.0, 0.0, 0.0], NonZeroUsize::new(1).unwrap());
        assert!(err.is_err());
    }
}
