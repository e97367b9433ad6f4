//! A random forest regressor. Every tree is grown on a bootstrap sample of the
//! training rows, and the forest predicts the mean of the tree predictions.

use super::tree::RegressionTree;
use super::FeatureMatrix;
use crate::error::{Error, Result};
use crate::utils::number_encoding::{decode32, encode32};
use crate::utils::signatures::{match_signature, MODEL_SIG};
use crate::utils::string_encoding;
use crate::{Persist, Regressor, TrainOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A fitted forest, together with the names of the features it was fitted on,
/// in training order.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    feature_names: Vec<String>,
}

impl RandomForest {
    /// Fit a forest on every row of 'data'. The column names of 'data' are
    /// given in 'feature_names'.
    pub fn fit(
        data: &FeatureMatrix,
        targets: &[f64],
        feature_names: &[String],
        opts: &TrainOptions,
    ) -> Result<Self> {
        if data.rows() == 0 {
            return Err(Error::EmptyDataset("no training rows".into()));
        }
        if data.rows() != targets.len() {
            return Err(Error::SchemaMismatch(format!(
                "{} rows but {} targets",
                data.rows(),
                targets.len()
            )));
        }
        if data.cols() != feature_names.len() {
            return Err(Error::SchemaMismatch(format!(
                "{} columns but {} feature names",
                data.cols(),
                feature_names.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(opts.seed);
        let num_trees = opts.trees.max(1);
        let n = data.rows();
        let mut trees = Vec::with_capacity(num_trees);
        let mut samples = Vec::with_capacity(n);

        for i in 0..num_trees {
            let tree_rng = StdRng::seed_from_u64(rng.gen());
            samples.clear();
            for _ in 0..n {
                samples.push(rng.gen_range(0..n));
            }
            let tree =
                RegressionTree::fit(data, targets, &mut samples, opts, tree_rng);
            log::debug!(
                "Tree {} has {} nodes and depth {}.",
                i,
                tree.num_nodes(),
                tree.depth()
            );
            trees.push(tree);
        }

        Ok(Self {
            trees,
            feature_names: feature_names.to_vec(),
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// The features the forest was fitted on, in the order predict expects.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Total number of nodes across all trees.
    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(RegressionTree::num_nodes).sum()
    }
}

impl Regressor for RandomForest {
    fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    fn predict(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        sum / self.trees.len() as f64
    }
}

impl Persist for RandomForest {
    fn serialize(&self, stream: &mut Vec<u8>) -> usize {
        stream.extend(MODEL_SIG);
        let mut written = MODEL_SIG.len();
        written += string_encoding::encode_array(&self.feature_names, stream);
        written += encode32(self.trees.len() as u32, stream);
        for tree in &self.trees {
            written += tree.serialize(stream);
        }
        written
    }

    fn deserialize(stream: &[u8]) -> Option<(Self, usize)> {
        if !match_signature(stream, &MODEL_SIG) {
            return None;
        }
        let mut cursor = MODEL_SIG.len();
        let mut feature_names = Vec::new();
        let names = stream.get(cursor..)?;
        cursor += string_encoding::decode_array(names, &mut feature_names)?;
        let (read, len) = decode32(stream.get(cursor..)?)?;
        cursor += read;
        if len == 0 {
            return None;
        }

        let mut trees = Vec::new();
        for _ in 0..len {
            let (tree, read) =
                RegressionTree::deserialize(stream.get(cursor..)?)?;
            if tree.num_features() != feature_names.len() {
                return None;
            }
            cursor += read;
            trees.push(tree);
        }

        let forest = RandomForest {
            trees,
            feature_names,
        };
        Some((forest, cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data(n: usize) -> (FeatureMatrix, Vec<f64>, Vec<String>) {
        let rows: Vec<Vec<f64>> =
            (0..n).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let targets = (0..n).map(|i| 2.0 * i as f64).collect();
        let names = vec!["x".to_string(), "noise".to_string()];
        (FeatureMatrix::from_rows(&rows).unwrap(), targets, names)
    }

    #[test]
    fn test_forest_fits_trend() {
        let (data, targets, names) = linear_data(50);
        let opts = TrainOptions::new(20, 42);
        let forest = RandomForest::fit(&data, &targets, &names, &opts).unwrap();
        assert_eq!(forest.num_trees(), 20);
        assert_eq!(forest.num_features(), 2);

        let low = forest.predict(&[2.0, 2.0]);
        let high = forest.predict(&[47.0, 2.0]);
        assert!(low < 20.0, "low prediction {}", low);
        assert!(high > 75.0, "high prediction {}", high);
    }

    #[test]
    fn test_forest_is_deterministic() {
        let (data, targets, names) = linear_data(40);
        let opts = TrainOptions::new(10, 7);
        let a = RandomForest::fit(&data, &targets, &names, &opts).unwrap();
        let b = RandomForest::fit(&data, &targets, &names, &opts).unwrap();
        assert_eq!(a, b);

        let other = TrainOptions::new(10, 8);
        let c = RandomForest::fit(&data, &targets, &names, &other).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_fit_errors() {
        let (data, targets, names) = linear_data(10);
        let opts = TrainOptions::new(2, 1);
        let res = RandomForest::fit(&data, &targets[1..], &names, &opts);
        assert!(matches!(res, Err(Error::SchemaMismatch(_))));
        let res = RandomForest::fit(&data, &targets, &names[..1], &opts);
        assert!(matches!(res, Err(Error::SchemaMismatch(_))));

        let empty = FeatureMatrix::from_rows(&[]).unwrap();
        let res = RandomForest::fit(&empty, &[], &[], &opts);
        assert!(matches!(res, Err(Error::EmptyDataset(_))));
    }

    #[test]
    fn test_serialize_round_trip() {
        let (data, targets, names) = linear_data(30);
        let opts = TrainOptions::new(5, 3);
        let forest = RandomForest::fit(&data, &targets, &names, &opts).unwrap();

        let mut stream = Vec::new();
        let written = forest.serialize(&mut stream);
        assert_eq!(written, stream.len());
        let (loaded, read) = RandomForest::deserialize(&stream).unwrap();
        assert_eq!(read, written);
        assert_eq!(loaded.feature_names(), &["x", "noise"]);
        assert_eq!(loaded.predict(&[12.0, 0.0]), forest.predict(&[12.0, 0.0]));

        assert!(RandomForest::deserialize(&stream[1..]).is_none());
        assert!(RandomForest::deserialize(&stream[..written / 2]).is_none());
    }
}
