//! Metric ball-tree: nodes bound a subtree by a centroid and radius, rebuilt fresh per query.
use ndarray::Array1;
use std::num::NonZeroUsize;

use crate::distance::euclidean_distance;
use crate::error::Error;
use crate::heap::BoundedMinHeap;

const DEFAULT_LEAF_SIZE: usize = 40;

#[derive(Debug)]
struct BallNode {
    center: Array1<f32>,
    radius: f32,
    /// Populated only at leaves; internal nodes exist purely for centroid/radius pruning.
    indices: Vec<usize>,
    left: Option<Box<BallNode>>,
    right: Option<Box<BallNode>>,
}

impl BallNode {
    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    distance: f32,
    index: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub struct BallTree {
    root: Option<Box<BallNode>>,
    points: Vec<Array1<f32>>,
    dimension: usize,
}

fn centroid(points: &[Array1<f32>], idxs: &[usize], dimension: usize) -> Array1<f32> {
    let mut center = Array1::<f32>::zeros(dimension);
    for &i in idxs {
        center += &points[i];
    }
    center /= idxs.len() as f32;
    center
}

fn max_radius(points: &[Array1<f32>], idxs: &[usize], center: &Array1<f32>) -> f32 {
    idxs.iter()
        .map(|&i| euclidean_distance(points[i].as_slice().expect("contiguous embedding"), center.as_slice().expect("contiguous embedding")))
        .fold(0.0_f32, f32::max)
}

impl BallTree {
    pub fn new(points: Vec<Array1<f32>>, dimension: NonZeroUsize) -> Result<Self, Error> {
        Self::with_leaf_size(points, dimension, DEFAULT_LEAF_SIZE)
    }

    pub fn with_leaf_size(
        points: Vec<Array1<f32>>,
        dimension: NonZeroUsize,
        leaf_size: usize,
    ) -> Result<Self, Error> {
        for point in &points {
            if point.len() != dimension.get() {
                return Err(Error::DimensionMismatch {
                    expected: dimension.get(),
                    found: point.len(),
                });
            }
        }
        let idxs: Vec<usize> = (0..points.len()).collect();
        let root = Self::build(&points, idxs, dimension.get(), leaf_size);
        Ok(Self {
            root,
            points,
            dimension: dimension.get(),
        })
    }

    fn select_axis(points: &[Array1<f32>], idxs: &[usize], dimension: usize) -> usize {
        let mut means = vec![0f32; dimension];
        for &i in idxs {
            for d in 0..dimension {
                means[d] += points[i][d];
            }
        }
        let count = idxs.len() as f32;
        for mean in means.iter_mut() {
            *mean /= count;
        }
        let mut variances = vec![0f32; dimension];
        for &i in idxs {
            for d in 0..dimension {
                let diff = points[i][d] - means[d];
                variances[d] += diff * diff;
            }
        }
        variances
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(axis, _)| axis)
            .unwrap_or(0)
    }

    fn build(
        points: &[Array1<f32>],
        idxs: Vec<usize>,
        dimension: usize,
        leaf_size: usize,
    ) -> Option<Box<BallNode>> {
        if idxs.is_empty() {
            return None;
        }
        let center = centroid(points, &idxs, dimension);
        let radius = max_radius(points, &idxs, &center);

        if idxs.len() <= leaf_size {
            return Some(Box::new(BallNode {
                center,
                radius,
                indices: idxs,
                left: None,
                right: None,
            }));
        }

        let axis = Self::select_axis(points, &idxs, dimension);
        let mut sorted = idxs;
        sorted.sort_by(|&a, &b| {
            points[a][axis]
                .partial_cmp(&points[b][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let median_pos = sorted.len() / 2;
        let right_idxs = sorted.split_off(median_pos);
        let left_idxs = sorted;

        let left = Self::build(points, left_idxs, dimension, leaf_size);
        let right = Self::build(points, right_idxs, dimension, leaf_size);
        Some(Box::new(BallNode {
            center,
            radius,
            indices: Vec::new(),
            left,
            right,
        }))
    }

    #[tracing::instrument(skip_all)]
    pub fn nearest(&self, target: &[f32], k: NonZeroUsize) -> Result<Vec<(usize, f32)>, Error> {
        if target.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: target.len(),
            });
        }
        let mut heap: BoundedMinHeap<Candidate> = BoundedMinHeap::new(k);
        Self::search(self.root.as_deref(), target, &self.points, &mut heap);

        let sorted = heap.into_sorted_vec();
        Ok(sorted.into_iter().map(|c| (c.index, c.distance)).collect())
    }

    fn search(
        node: Option<&BallNode>,
        target: &[f32],
        points: &[Array1<f32>],
        heap: &mut BoundedMinHeap<Candidate>,
    ) {
        let Some(node) = node else { return };

        let center_dist = euclidean_distance(target, node.center.as_slice().expect("contiguous embedding"));
        if heap.is_full() {
            let kth_distance = heap.peek().map(|c| c.distance).unwrap_or(f32::INFINITY);
            if center_dist - node.radius > kth_distance {
                return;
            }
        }

        if node.is_leaf() {
            for &idx in &node.indices {
                let distance =
                    euclidean_distance(target, points[idx].as_slice().expect("contiguous embedding"));
                heap.push(Candidate { distance, index: idx });
            }
            return;
        }

        let left_dist = node
            .left
            .as_ref()
            .map(|n| euclidean_distance(target, n.center.as_slice().expect("contiguous embedding")));
        let right_dist = node
            .right
            .as_ref()
            .map(|n| euclidean_distance(target, n.center.as_slice().expect("contiguous embedding")));

        let (first, second) = match (left_dist, right_dist) {
            (Some(l), Some(r)) if l <= r => (&node.left, &node.right),
            (Some(_), Some(_)) => (&node.right, &node.left),
            (Some(_), None) => (&node.left, &node.right),
            (None, Some(_)) => (&node.right, &node.left),
            (None, None) => (&node.left, &node.right),
        };

        Self::search(first.as_deref(), target, points, heap);
        Self::search(second.as_deref(), target, points, heap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn vec1(values: &[f32]) -> Array1<f32> {
        Array1::from_vec(values.to_vec())
    }

    #[test]
    fn finds_exact_match_at_distance_zero() {
        let points = vec![
            vec1(&[1.0, 2.0, 3.0]),
            vec1(&[4.0, 5.0, 6.0]),
            vec1(&[0.1, 0.2, 0.3]),
        ];
        let tree = BallTree::new(points.clone(), NonZeroUsize::new(3).unwrap()).unwrap();
        let result = tree
            .nearest(points[1].as_slice().unwrap(), NonZeroUsize::new(1).unwrap())
            .unwrap();
        assert_eq!(result[0].0, 1);
        assert!(result[0].1 < 1e-6);
    }

    #[test]
    fn agrees_with_linear_scan_on_random_data() {
        let mut rng = rand::thread_rng();
        let dimension = 5;
        let points: Vec<Array1<f32>> = (0..200)
            .map(|_| Array1::from_vec((0..dimension).map(|_| rng.gen_range(-10.0..10.0)).collect()))
            .collect();
        let target: Vec<f32> = (0..dimension).map(|_| rng.gen_range(-10.0..10.0)).collect();

        let tree = BallTree::new(points.clone(), NonZeroUsize::new(dimension).unwrap()).unwrap();
        let linear =
            crate::linear::LinearIndex::new(points, NonZeroUsize::new(dimension).unwrap()).unwrap();

        let k = NonZeroUsize::new(10).unwrap();
        let tree_result = tree.nearest(&target, k).unwrap();
        let linear_result = linear.nearest(&target, k).unwrap();

        let tree_distances: Vec<f32> = tree_result.iter().map(|(_, d)| *d).collect();
        let linear_distances: Vec<f32> = linear_result.iter().map(|(_, d)| *d).collect();
        for (a, b) in tree_distances.iter().zip(linear_distances.iter()) {
            assert!((a - b).abs() < 1e-3, "{} != {}", a, b);
        }
    }

    #[test]
    fn empty_tree_returns_empty_result() {
        let tree = BallTree::new(vec![], NonZeroUsize::new(3).unwrap()).unwrap();
        let result = tree
            .nearest(&[0.0, 0.0, 0.0], NonZeroUsize::new(1).unwrap())
            .unwrap();
        assert!(result.is_empty());
    }
}
