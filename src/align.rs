//! Aligns user records with the feature columns the model was trained on.
//!
//! A record may name any subset of the training features. Alignment fills the
//! missing features with the training mean (numeric columns) or the most
//! frequent category (categorical columns) and orders the values exactly as
//! the training columns were ordered.

use crate::dataset::{ColumnData, Table, Value};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// The kind of a feature column and the statistics observed in training.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureKind {
    Numeric { mean: f64, min: f64, max: f64 },
    Categorical { mode: String, choices: Vec<String> },
}

/// A feature column of the training table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    name: String,
    kind: FeatureKind,
}

impl FeatureColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }

    /// The value used when a record does not name this feature.
    pub fn default_value(&self) -> Value {
        match &self.kind {
            FeatureKind::Numeric { mean, .. } => Value::Number(*mean),
            FeatureKind::Categorical { mode, .. } => {
                Value::Category(mode.clone())
            }
        }
    }

    /// Convert 'val' to the type of this column. For a categorical column
    /// the entered 'text' is kept verbatim, and a bare number selects the
    /// choice with the same numeric value.
    fn coerce(&self, val: &Value, text: Option<&str>) -> Result<Value> {
        match (&self.kind, val) {
            (FeatureKind::Numeric { .. }, Value::Number(num)) => {
                Ok(Value::Number(*num))
            }
            (FeatureKind::Numeric { .. }, Value::Category(label)) => {
                Err(Error::InvalidValue {
                    column: self.name.clone(),
                    value: label.clone(),
                })
            }
            (FeatureKind::Categorical { choices, .. }, val) => {
                if let Some(text) = text {
                    if choices.iter().any(|c| c == text) {
                        return Ok(Value::Category(text.to_string()));
                    }
                }
                let same_number = |choice: &&String| match val {
                    Value::Number(num) => {
                        Value::parse(choice) == Value::Number(*num)
                    }
                    Value::Category(_) => false,
                };
                let label = match choices.iter().find(same_number) {
                    Some(choice) => choice.clone(),
                    None => match text {
                        Some(text) => text.to_string(),
                        None => val.as_category(),
                    },
                };
                Ok(Value::Category(label))
            }
        }
    }
}

/// The ordered feature columns of a training table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<FeatureColumn>,
}

impl FeatureSchema {
    /// Build the schema of 'features', a table that holds only the feature
    /// columns (the target and the excluded columns already dropped).
    pub fn from_table(features: &Table) -> Result<Self> {
        if features.rows() == 0 {
            let msg = "no rows to derive defaults";
            return Err(Error::EmptyDataset(msg.into()));
        }

        let mut columns = Vec::with_capacity(features.columns().len());
        for col in features.columns() {
            let kind = match col.data() {
                ColumnData::Numeric(_) => FeatureKind::Numeric {
                    mean: col.mean().unwrap_or_default(),
                    min: col.min().unwrap_or_default(),
                    max: col.max().unwrap_or_default(),
                },
                ColumnData::Categorical(_) => {
                    let mode = col.mode().map(|v| v.as_category());
                    let choices = col.distinct();
                    FeatureKind::Categorical {
                        mode: mode.unwrap_or_default(),
                        choices: choices.iter().map(Value::as_category).collect(),
                    }
                }
            };
            columns.push(FeatureColumn {
                name: col.name().to_string(),
                kind,
            });
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&FeatureColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the names of the categorical columns.
    pub fn categorical_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| matches!(c.kind, FeatureKind::Categorical { .. }))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Make a row with one value per training column, in training order.
    /// Features missing from 'record' get the column default. Features that
    /// the schema does not know are rejected.
    pub fn align(&self, record: &Record) -> Result<AlignedRow> {
        if let Some(name) = record.names().find(|n| self.column(n).is_none()) {
            return Err(Error::SchemaMismatch(format!(
                "unknown feature '{}'",
                name
            )));
        }

        let mut values = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let val = match record.get(&col.name) {
                Some(val) => col.coerce(val, record.text(&col.name))?,
                None => col.default_value(),
            };
            values.push(val);
        }
        Ok(AlignedRow {
            names: self.names(),
            values,
        })
    }
}

/// The raw values a user entered, keyed by feature name. Values inserted
/// as text also keep the text, so that a categorical answer such as "1.0"
/// is not confused with "1".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    values: BTreeMap<String, Value>,
    texts: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, val: Value) -> Self {
        self.insert(name, val);
        self
    }

    pub fn insert(&mut self, name: &str, val: Value) {
        self.texts.remove(name);
        self.values.insert(name.to_string(), val);
    }

    /// Insert the value parsed from 'text' and remember the text itself.
    pub fn insert_text(&mut self, name: &str, text: &str) {
        let text = text.trim();
        self.values.insert(name.to_string(), Value::parse(text));
        self.texts.insert(name.to_string(), text.to_string());
    }

    /// Parse and insert an assignment of the form NAME=VALUE.
    pub fn insert_assignment(&mut self, text: &str) -> Result<()> {
        match text.split_once('=') {
            Some((name, val)) if !name.trim().is_empty() => {
                self.insert_text(name.trim(), val);
                Ok(())
            }
            _ => Err(Error::InvalidValue {
                column: "<assignment>".to_string(),
                value: text.to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The text 'name' was entered as, if it was inserted as text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One record aligned with the training columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    names: Vec<String>,
    values: Vec<Value>,
}

impl AlignedRow {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(&self.values)
    }

    /// Returns the row as numbers. Every value must be numeric.
    pub fn to_numeric(&self) -> Result<Vec<f64>> {
        self.iter()
            .map(|(name, val)| match val {
                Value::Number(num) => Ok(*num),
                Value::Category(label) => Err(Error::InvalidValue {
                    column: name.to_string(),
                    value: label.clone(),
                }),
            })
            .collect()
    }
}
