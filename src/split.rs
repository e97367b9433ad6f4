//! Splits the rows of a dataset into a training and a testing partition.

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle the indices 0..'rows' with a generator seeded by 'seed'. The
/// first ceil('rows' * 'test_ratio') shuffled rows are the test partition and
/// the rest are the training partition.
pub fn train_test_split(
    rows: usize,
    test_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if rows == 0 {
        return Err(Error::EmptyDataset("nothing to split".into()));
    }
    let ratio = test_ratio.clamp(0.0, 1.0);
    let num_test = ((rows as f64) * ratio).ceil() as usize;
    if num_test >= rows {
        return Err(Error::EmptyDataset(format!(
            "{} rows leave no training rows at test ratio {}",
            rows, test_ratio
        )));
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(num_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

#[test]
fn test_split_sizes() {
    let split = train_test_split(10, 0.2, 42).unwrap();
    assert_eq!(split.test.len(), 2);
    assert_eq!(split.train.len(), 8);

    let split = train_test_split(11, 0.2, 42).unwrap();
    assert_eq!(split.test.len(), 3);

    let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
    all.sort();
    assert_eq!(all, (0..11).collect::<Vec<usize>>());
}

#[test]
fn test_split_is_seeded() {
    let a = train_test_split(100, 0.2, 42).unwrap();
    let b = train_test_split(100, 0.2, 42).unwrap();
    let c = train_test_split(100, 0.2, 43).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_split_errors() {
    assert!(train_test_split(0, 0.2, 42).is_err());
    assert!(train_test_split(1, 0.2, 42).is_err());
    assert!(train_test_split(2, 0.2, 42).is_ok());
}
