use predictor::dataset::{Table, Value};
use predictor::encoding::{EncoderTable, LabelEncoder};
use predictor::error::Error;
use predictor::Persist;

fn survey() -> Table {
    let text = "Gender,Major,Hours\n\
                Male,Math,10\n\
                Female,Art,12\n\
                Female,Physics,8\n\
                Male,Art,3\n";
    Table::parse(text, ',').unwrap()
}

#[test]
fn test_encode_then_decode() {
    let values = ["Math", "Art", "Physics", "Art", "History"];
    let encoder = LabelEncoder::fit(&values);
    for val in values {
        let code = encoder.encode(val).unwrap();
        assert_eq!(encoder.decode(code), Some(val));
    }
    assert_eq!(encoder.encode("Law"), None);
}

#[test]
fn test_encoding_is_deterministic() {
    let a = EncoderTable::fit(&survey());
    let b = EncoderTable::fit(&survey());
    assert_eq!(a, b);

    let rows = a.transform_table(&survey()).unwrap();
    assert_eq!(rows, b.transform_table(&survey()).unwrap());
    // Female=0, Male=1; Art=0, Math=1, Physics=2.
    assert_eq!(rows[0], vec![1.0, 1.0, 10.0]);
    assert_eq!(rows[2], vec![0.0, 2.0, 8.0]);
}

#[test]
fn test_encoder_table() {
    let table = EncoderTable::fit(&survey());
    assert_eq!(table.len(), 2);
    assert_eq!(table.column_names().collect::<Vec<_>>(), ["Gender", "Major"]);
    assert!(table.get("Hours").is_none());

    let art = Value::Category("Art".into());
    assert_eq!(table.encode_value("Major", &art).unwrap(), 0.0);
    assert_eq!(table.encode_value("Hours", &Value::Number(4.0)).unwrap(), 4.0);

    let law = Value::Category("Law".into());
    assert!(matches!(
        table.encode_value("Major", &law),
        Err(Error::UnseenCategory { .. })
    ));
    assert!(matches!(
        table.encode_value("Hours", &law),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn test_encoder_table_persistence() {
    let table = EncoderTable::fit(&survey());
    let mut stream = Vec::new();
    let written = table.serialize(&mut stream);
    assert_eq!(written, stream.len());

    let (loaded, read) = EncoderTable::deserialize(&stream).unwrap();
    assert_eq!(read, written);
    assert_eq!(loaded, table);

    // Every truncation is rejected.
    for len in 0..stream.len() {
        assert!(EncoderTable::deserialize(&stream[..len]).is_none());
    }
}
