//! Label encoding of categorical columns. Every categorical feature column gets
//! its own encoder that maps the observed categories, in sorted order, to the
//! codes 0..N. The encoders are fitted once at training time and then frozen.

use crate::dataset::{ColumnData, Table, Value};
use crate::error::{Error, Result};
use crate::utils::number_encoding::{decode32, encode32};
use crate::utils::signatures::{match_signature, COLUMN_SIG, ENCODERS_SIG};
use crate::utils::string_encoding;
use crate::Persist;

/// Maps the categories of one column to integer codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    /// Sorted, distinct categories. The code of a category is its index.
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder over the observed 'values'.
    pub fn fit<S: AsRef<str>>(values: &[S]) -> Self {
        let mut classes: Vec<String> =
            values.iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns the code of 'category', or None if it was never observed.
    pub fn encode(&self, category: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
            .map(|idx| idx as u32)
    }

    /// Returns the category of 'code'.
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

impl Persist for LabelEncoder {
    fn serialize(&self, stream: &mut Vec<u8>) -> usize {
        string_encoding::encode_array(&self.classes, stream)
    }

    fn deserialize(stream: &[u8]) -> Option<(Self, usize)> {
        let mut classes = Vec::new();
        let read = string_encoding::decode_array(stream, &mut classes)?;
        // The lookup relies on the classes being sorted and unique.
        if classes.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }
        Some((LabelEncoder { classes }, read))
    }
}

/// The frozen encoders of every categorical column, keyed by column name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncoderTable {
    encoders: Vec<(String, LabelEncoder)>,
}

impl EncoderTable {
    /// Fit one encoder for every categorical column of 'table'.
    pub fn fit(table: &Table) -> Self {
        let encoders = table
            .columns()
            .iter()
            .filter_map(|col| match col.data() {
                ColumnData::Categorical(values) => {
                    let encoder = LabelEncoder::fit(values.as_slice());
                    log::debug!(
                        "Column {} has {} categories.",
                        col.name(),
                        encoder.classes().len()
                    );
                    Some((col.name().to_string(), encoder))
                }
                ColumnData::Numeric(_) => None,
            })
            .collect();
        Self { encoders }
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Returns the encoder of the column 'name'.
    pub fn get(&self, name: &str) -> Option<&LabelEncoder> {
        self.encoders
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, encoder)| encoder)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.encoders.iter().map(|(name, _)| name.as_str())
    }

    /// Encode the cell 'val' of the column 'column'. Columns without an
    /// encoder must hold numbers.
    pub fn encode_value(&self, column: &str, val: &Value) -> Result<f64> {
        match (self.get(column), val) {
            (Some(encoder), val) => {
                let category = val.as_category();
                match encoder.encode(&category) {
                    Some(code) => Ok(code as f64),
                    None => Err(Error::UnseenCategory {
                        column: column.to_string(),
                        value: category,
                    }),
                }
            }
            (None, Value::Number(num)) => Ok(*num),
            (None, Value::Category(label)) => Err(Error::InvalidValue {
                column: column.to_string(),
                value: label.clone(),
            }),
        }
    }

    /// Convert every row of 'table' into a row of numbers, in column order.
    pub fn transform_table(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        let width = table.columns().len();
        let mut rows = vec![Vec::with_capacity(width); table.rows()];
        for col in table.columns() {
            for (row, out) in rows.iter_mut().enumerate() {
                let val = col.value(row).ok_or_else(|| {
                    let msg = format!("short column {}", col.name());
                    Error::SchemaMismatch(msg)
                })?;
                out.push(self.encode_value(col.name(), &val)?);
            }
        }
        Ok(rows)
    }
}

impl Persist for EncoderTable {
    fn serialize(&self, stream: &mut Vec<u8>) -> usize {
        stream.extend(ENCODERS_SIG);
        let mut written = ENCODERS_SIG.len();
        written += encode32(self.encoders.len() as u32, stream);
        for (name, encoder) in &self.encoders {
            stream.extend(COLUMN_SIG);
            written += COLUMN_SIG.len();
            written += string_encoding::encode(name, stream);
            written += encoder.serialize(stream);
        }
        written
    }

    fn deserialize(stream: &[u8]) -> Option<(Self, usize)> {
        if !match_signature(stream, &ENCODERS_SIG) {
            return None;
        }
        let mut cursor = ENCODERS_SIG.len();
        let (read, len) = decode32(stream.get(cursor..)?)?;
        cursor += read;

        let mut encoders = Vec::new();
        for _ in 0..len {
            if !match_signature(stream.get(cursor..)?, &COLUMN_SIG) {
                return None;
            }
            cursor += COLUMN_SIG.len();
            let (read, name) = string_encoding::decode(stream.get(cursor..)?)?;
            cursor += read;
            let (encoder, read) =
                LabelEncoder::deserialize(stream.get(cursor..)?)?;
            cursor += read;
            encoders.push((name, encoder));
        }
        Some((EncoderTable { encoders }, cursor))
    }
}

#[test]
fn test_encoder_sorted_codes() {
    let encoder = LabelEncoder::fit(&["Male", "Female", "Male", "Other"]);
    assert_eq!(encoder.classes(), &["Female", "Male", "Other"]);
    assert_eq!(encoder.encode("Female"), Some(0));
    assert_eq!(encoder.encode("Other"), Some(2));
    assert_eq!(encoder.encode("Unknown"), None);
    assert_eq!(encoder.decode(1), Some("Male"));
    assert_eq!(encoder.decode(3), None);
}

#[test]
fn test_unsorted_classes_rejected() {
    let mut stream = Vec::new();
    let names = vec!["b".to_string(), "a".to_string()];
    string_encoding::encode_array(&names, &mut stream);
    assert!(LabelEncoder::deserialize(&stream).is_none());
}
