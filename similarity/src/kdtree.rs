//! K-dimensional tree over a fixed point set, rebuilt fresh for every query rather than
//! maintained incrementally: indices are throwaway structures scoped to one search call.
use ndarray::Array1;
use std::num::NonZeroUsize;

use crate::distance::euclidean_distance;
use crate::error::Error;
use crate::heap::BoundedMinHeap;

const DEFAULT_LEAF_SIZE: usize = 40;

#[derive(Debug)]
struct KDNode {
    /// A leaf holds every point assigned to it; an internal node holds exactly one pivot.
    indices: Vec<usize>,
    axis: usize,
    left: Option<Box<KDNode>>,
    right: Option<Box<KDNode>>,
}

impl KDNode {
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
pub struct KDTree {
    root: Option<Box<KDNode>>,
    points: Vec<Array1<f32>>,
    dimension: usize,
}

impl KDTree {
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
        let root = Self::build(&points, idxs, 0, dimension.get(), leaf_size);
        Ok(Self {
            root,
            points,
            dimension: dimension.get(),
        })
    }

    fn select_axis(points: &[Array1<f32>], idxs: &[usize], depth: usize, dimension: usize) -> usize {
        if idxs.len() < dimension * 4 {
            return depth % dimension;
        }
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
        mut idxs: Vec<usize>,
        depth: usize,
        dimension: usize,
        leaf_size: usize,
    ) -> Option<Box<KDNode>> {
        if idxs.is_empty() {
            return None;
        }
        if idxs.len() <= leaf_size {
            return Some(Box::new(KDNode {
                indices: idxs,
                axis: depth % dimension,
                left: None,
                right: None,
            }));
        }

        let axis = Self::select_axis(points, &idxs, depth, dimension);
        idxs.sort_by(|&a, &b| {
            points[a][axis]
                .partial_cmp(&points[b][axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let median_pos = idxs.len() / 2;
        let pivot = idxs[median_pos];
        let pivot_value = points[pivot][axis];

        let mut left_idxs = Vec::with_capacity(median_pos);
        let mut right_idxs = Vec::with_capacity(idxs.len() - median_pos);
        for i in idxs {
            if i == pivot {
                continue;
            }
            // strictly-less goes left; equal-to-median (and greater) goes right
            if points[i][axis] < pivot_value {
                left_idxs.push(i);
            } else {
                right_idxs.push(i);
            }
        }

        let left = Self::build(points, left_idxs, depth + 1, dimension, leaf_size);
        let right = Self::build(points, right_idxs, depth + 1, dimension, leaf_size);
        Some(Box::new(KDNode {
            indices: vec![pivot],
            axis,
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
        node: Option<&KDNode>,
        target: &[f32],
        points: &[Array1<f32>],
        heap: &mut BoundedMinHeap<Candidate>,
    ) {
        let Some(node) = node else { return };

        if node.is_leaf() {
            for &idx in &node.indices {
                let distance =
                    euclidean_distance(target, points[idx].as_slice().expect("contiguous embedding"));
                heap.push(Candidate { distance, index: idx });
            }
            return;
        }

        let pivot = node.indices[0];
        let pivot_point = points[pivot].as_slice().expect("contiguous embedding");
        let distance = euclidean_distance(target, pivot_point);
        heap.push(Candidate {
            distance,
            index: pivot,
        });

        let axis_dist = target[node.axis] - pivot_point[node.axis];
        let (near, far) = if axis_dist < 0.0 {
            (&node.left, &node.right)
        } else {
            (&node.right, &node.left)
        };

        Self::search(near.as_deref(), target, points, heap);

        let visit_far =
            !heap.is_full() || axis_dist.abs() < heap.peek().map(|c| c.distance).unwrap_or(f32::INFINITY);
        if visit_far {
            Self::search(far.as_deref(), target, points, heap);
        }
    }
}
