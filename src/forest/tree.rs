//! A CART regression tree. The tree is stored as a flat array of nodes where
//! the root is node zero and every child is stored after its parent.

use crate::forest::FeatureMatrix;
use crate::utils::number_encoding::{decode32, decode_f64, encode32, encode_f64};
use crate::utils::signatures::{match_signature, TREE_SIG};
use crate::{Persist, Regressor, TrainOptions};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Marks a leaf in the 'feature' field of a node.
const LEAF: u32 = u32::MAX;

/// Splits that improve the squared error by less than this are ignored.
const MIN_GAIN: f64 = 1e-12;

/// A node in the tree. Rows whose feature is less than or equal to the
/// threshold go to the left child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    feature: u32,
    threshold: f64,
    left: u32,
    right: u32,
    /// The mean target of the training rows that reached this node.
    value: f64,
}

impl Node {
    fn leaf(value: f64) -> Self {
        Self {
            feature: LEAF,
            threshold: 0.0,
            left: 0,
            right: 0,
            value,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature == LEAF
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    num_features: usize,
}

/// The best split that was found for a node.
struct Split {
    feature: usize,
    threshold: f64,
}

/// Grows a single tree over a set of sample indices.
struct TreeBuilder<'a> {
    data: &'a FeatureMatrix,
    targets: &'a [f64],
    opts: &'a TrainOptions,
    rng: StdRng,
    nodes: Vec<Node>,
    /// Scratch buffer of (feature value, target) pairs.
    column: Vec<(f64, f64)>,
}

impl<'a> TreeBuilder<'a> {
    fn mean_target(&self, samples: &[usize]) -> f64 {
        let sum: f64 = samples.iter().map(|s| self.targets[*s]).sum();
        sum / samples.len().max(1) as f64
    }

    fn push_leaf(&mut self, samples: &[usize]) -> usize {
        let value = self.mean_target(samples);
        self.nodes.push(Node::leaf(value));
        self.nodes.len() - 1
    }

    /// Grow the tree over 'samples'. The slice is reordered in place so that
    /// the samples of every node are contiguous.
    fn grow(mut self, samples: &mut [usize]) -> Vec<Node> {
        let root = self.push_leaf(samples);
        // The stack holds (node, start, end, depth).
        let mut stack = vec![(root, 0, samples.len(), 0)];

        while let Some((node, start, end, depth)) = stack.pop() {
            let part = &mut samples[start..end];
            let split = match self.find_split(part, depth) {
                Some(split) => split,
                None => continue,
            };

            let mid = partition(part, |s| {
                self.data.get(s, split.feature) <= split.threshold
            });
            debug_assert!(mid > 0 && mid < part.len());

            let left = self.push_leaf(&part[..mid]);
            let right = self.push_leaf(&part[mid..]);
            let n = &mut self.nodes[node];
            n.feature = split.feature as u32;
            n.threshold = split.threshold;
            n.left = left as u32;
            n.right = right as u32;

            stack.push((right, start + mid, end, depth + 1));
            stack.push((left, start, start + mid, depth + 1));
        }

        self.nodes
    }

    /// Find the split of 'samples' that minimizes the sum of squared errors
    /// of the two children, or None if the node should be a leaf.
    fn find_split(&mut self, samples: &[usize], depth: usize) -> Option<Split> {
        let n = samples.len();
        let min_leaf = self.opts.min_samples_leaf.max(1);
        if n < self.opts.min_samples_split.max(2) || n < 2 * min_leaf {
            return None;
        }
        if self.opts.max_depth.map_or(false, |max| depth >= max) {
            return None;
        }

        let total: f64 = samples.iter().map(|s| self.targets[*s]).sum();
        let first = self.targets[samples[0]];
        if samples.iter().all(|s| self.targets[*s] == first) {
            return None;
        }

        // Maximizing sum_l^2/n_l + sum_r^2/n_r is the same as minimizing the
        // squared error of the children.
        let parent_score = total * total / n as f64;
        let mut best_score = parent_score + MIN_GAIN * parent_score.abs().max(1.0);
        let mut best: Option<Split> = None;

        let mut features: Vec<usize> = (0..self.data.cols()).collect();
        features.shuffle(&mut self.rng);
        let limit = self.opts.max_features.unwrap_or(features.len());
        features.truncate(limit.clamp(1, features.len().max(1)));

        for feature in features {
            self.column.clear();
            for s in samples {
                self.column.push((self.data.get(*s, feature), self.targets[*s]));
            }
            self.column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for i in 1..n {
                let (prev, y) = self.column[i - 1];
                left_sum += y;
                let curr = self.column[i].0;
                if curr <= prev || i < min_leaf || n - i < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / i as f64
                    + right_sum * right_sum / (n - i) as f64;
                if score > best_score {
                    best_score = score;
                    let mut threshold = prev + (curr - prev) / 2.0;
                    // The midpoint can round up to 'curr'.
                    if threshold >= curr {
                        threshold = prev;
                    }
                    best = Some(Split { feature, threshold });
                }
            }
        }

        best
    }
}

/// Move the elements that satisfy 'pred' to the front of 'items', and return
/// the number of such elements.
fn partition<F: Fn(usize) -> bool>(items: &mut [usize], pred: F) -> usize {
    let mut mid = 0;
    for i in 0..items.len() {
        if pred(items[i]) {
            items.swap(mid, i);
            mid += 1;
        }
    }
    mid
}

impl RegressionTree {
    /// Fit a tree on the rows of 'data' listed in 'samples'. Rows may appear
    /// more than once, as in a bootstrap sample.
    pub fn fit(
        data: &FeatureMatrix,
        targets: &[f64],
        samples: &mut [usize],
        opts: &TrainOptions,
        rng: StdRng,
    ) -> Self {
        assert_eq!(data.rows(), targets.len(), "One target per row");
        assert!(!samples.is_empty(), "Can't fit a tree without samples");
        let builder = TreeBuilder {
            data,
            targets,
            opts,
            rng,
            nodes: Vec::new(),
            column: Vec::with_capacity(samples.len()),
        };
        let nodes = builder.grow(samples);
        Self {
            nodes,
            num_features: data.cols(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The longest path from the root to a leaf.
    pub fn depth(&self) -> usize {
        // Children are always stored after their parents.
        let mut depths = vec![0; self.nodes.len()];
        let mut max = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_leaf() {
                let d = depths[i] + 1;
                depths[node.left as usize] = d;
                depths[node.right as usize] = d;
                max = max.max(d);
            }
        }
        max
    }
}

impl Regressor for RegressionTree {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.num_features);
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.value;
            }
            let val = features.get(node.feature as usize).copied();
            idx = if val.map_or(true, |v| v <= node.threshold) {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }
}

impl Persist for RegressionTree {
    fn serialize(&self, stream: &mut Vec<u8>) -> usize {
        stream.extend(TREE_SIG);
        let mut written = TREE_SIG.len();
        written += encode32(self.num_features as u32, stream);
        written += encode32(self.nodes.len() as u32, stream);
        for node in &self.nodes {
            written += encode32(node.feature, stream);
            written += encode_f64(node.threshold, stream);
            written += encode32(node.left, stream);
            written += encode32(node.right, stream);
            written += encode_f64(node.value, stream);
        }
        written
    }

    fn deserialize(stream: &[u8]) -> Option<(Self, usize)> {
        if !match_signature(stream, &TREE_SIG) {
            return None;
        }
        let mut cursor = TREE_SIG.len();
        let (read, num_features) = decode32(stream.get(cursor..)?)?;
        cursor += read;
        let (read, len) = decode32(stream.get(cursor..)?)?;
        cursor += read;
        if len == 0 {
            return None;
        }

        let mut nodes = Vec::new();
        for i in 0..len {
            let (read, feature) = decode32(stream.get(cursor..)?)?;
            cursor += read;
            let (read, threshold) = decode_f64(stream.get(cursor..)?)?;
            cursor += read;
            let (read, left) = decode32(stream.get(cursor..)?)?;
            cursor += read;
            let (read, right) = decode32(stream.get(cursor..)?)?;
            cursor += read;
            let (read, value) = decode_f64(stream.get(cursor..)?)?;
            cursor += read;

            // Reject structures that could loop or index out of bounds.
            if feature != LEAF
                && (feature >= num_features
                    || left <= i
                    || right <= i
                    || left >= len
                    || right >= len)
            {
                return None;
            }
            nodes.push(Node {
                feature,
                threshold,
                left,
                right,
                value,
            });
        }

        let tree = RegressionTree {
            nodes,
            num_features: num_features as usize,
        };
        Some((tree, cursor))
    }
}
