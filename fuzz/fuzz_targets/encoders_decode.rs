#![no_main]

use libfuzzer_sys::fuzz_target;
use predictor::encoding::EncoderTable;
use predictor::Persist;

fuzz_target!(|data: &[u8]| {
    if let Some((table, read)) = EncoderTable::deserialize(data) {
        assert!(read <= data.len());
        let mut stream = Vec::new();
        assert_eq!(table.serialize(&mut stream), read);
    }
});
