pub mod align;
pub mod artifact;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod forest;
pub mod form;
pub mod label;
pub mod metrics;
pub mod pipeline;
pub mod split;
pub mod utils;

/// Stores the knobs that control training.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrainOptions {
    /// Specifies the number of trees in the forest.
    pub trees: usize,
    /// Seeds both the train/test split and the forest.
    pub seed: u64,
    /// The fraction of rows that are held out for testing.
    pub test_ratio: f64,
    /// Nodes with fewer rows than this are not split.
    pub min_samples_split: usize,
    /// Every leaf holds at least this many rows.
    pub min_samples_leaf: usize,
    /// Limits the depth of each tree. None grows the trees until the leaves
    /// are pure.
    pub max_depth: Option<usize>,
    /// The number of features that are considered at each split. None
    /// considers all of them.
    pub max_features: Option<usize>,
}

impl TrainOptions {
    pub fn new(trees: usize, seed: u64) -> Self {
        Self {
            trees,
            seed,
            ..Self::default()
        }
    }
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            trees: 100,
            seed: 42,
            test_ratio: 0.2,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_depth: None,
            max_features: None,
        }
    }
}

/// A trait that defines the interface of a fitted regression model.
pub trait Regressor {
    /// The number of features that each input row must have.
    fn num_features(&self) -> usize;

    /// Predict the target of a single row of features.
    #[must_use]
    fn predict(&self, features: &[f64]) -> f64;

    /// Predict the target of every row in 'rows'.
    #[must_use]
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}

/// A trait for artifacts that can be written to and loaded from a byte
/// stream.
pub trait Persist: Sized {
    /// Append the serialized object to 'stream' and return the number of bytes
    /// that were written.
    fn serialize(&self, stream: &mut Vec<u8>) -> usize;

    /// Try to load an object from the start of 'stream', and return it with
    /// the number of bytes that were consumed, or None if the input was
    /// invalid.
    #[must_use]
    fn deserialize(stream: &[u8]) -> Option<(Self, usize)>;
}
