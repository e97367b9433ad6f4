#![no_main]

use libfuzzer_sys::fuzz_target;
use predictor::dataset::Table;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = Table::parse(text, ',');
    }
});
