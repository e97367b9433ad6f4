#![no_main]

use libfuzzer_sys::fuzz_target;
use predictor::forest::RandomForest;
use predictor::{Persist, Regressor};

fuzz_target!(|data: &[u8]| {
    if let Some((forest, _)) = RandomForest::deserialize(data) {
        let row = vec![0.5; forest.num_features()];
        let _ = forest.predict(&row);
    }
});
