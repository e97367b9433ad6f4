//! The exam score pipeline: numeric features, a target on the 0-100 scale,
//! and a persisted forest.

use super::{check_forest, check_width, fit_and_score};
use super::{PipelineConfig, TrainReport};
use crate::align::{FeatureSchema, Record};
use crate::artifact;
use crate::dataset::Table;
use crate::error::{Error, Result};
use crate::forest::RandomForest;
use crate::form::FormSpec;
use crate::label::Assessment;
use crate::{Regressor, TrainOptions};
use std::path::Path;

/// The column that holds the exam score.
pub const TARGET: &str = "ExamScore";

/// Columns of the dataset that are neither features nor the target.
pub const EXCLUDED: [&str; 1] = ["FinalGrade"];

/// The feature columns of the merged exam dataset.
pub const FEATURES: [&str; 14] = [
    "StudyHours",
    "Attendance",
    "AssignmentCompletion",
    "OnlineCourses",
    "Discussions",
    "Extracurricular",
    "Resources",
    "Internet",
    "EduTech",
    "StressLevel",
    "Gender",
    "Age",
    "LearningStyle",
    "Motivation",
];

/// The default model file name.
pub const MODEL_FILE: &str = "exam_model.rfm";

/// The merged exam dataset: every column of FEATURES must be present.
pub fn default_config() -> PipelineConfig {
    PipelineConfig::new(TARGET, &EXCLUDED).with_required(&FEATURES)
}

/// Fit a forest that predicts the target of 'config' from the remaining
/// numeric columns of 'table'.
pub fn train(
    table: &Table,
    config: &PipelineConfig,
    opts: &TrainOptions,
) -> Result<(RandomForest, TrainReport)> {
    let (features, targets) = config.features_and_targets(table)?;
    let rows = numeric_rows(&features)?;
    fit_and_score(&rows, &targets, &features.column_names(), opts)
}

/// Returns the rows of 'features'. Every column must be numeric.
fn numeric_rows(features: &Table) -> Result<Vec<Vec<f64>>> {
    let width = features.columns().len();
    let mut rows = vec![Vec::with_capacity(width); features.rows()];
    for col in features.columns() {
        let values = col.as_numeric().ok_or_else(|| {
            Error::SchemaMismatch(format!(
                "feature column '{}' is not numeric",
                col.name()
            ))
        })?;
        for (row, val) in rows.iter_mut().zip(values) {
            row.push(*val);
        }
    }
    Ok(rows)
}

/// A prediction of the exam pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExamPrediction {
    /// The unrounded output of the forest.
    pub raw: f64,
    pub assessment: Assessment,
}

/// Predicts exam scores from user records. Built once and shared by
/// reference.
#[derive(Debug)]
pub struct ExamPredictor {
    schema: FeatureSchema,
    form: FormSpec,
    forest: RandomForest,
}

impl ExamPredictor {
    /// Build a predictor from the training 'table' and a fitted 'forest'.
    pub fn new(
        table: &Table,
        config: &PipelineConfig,
        forest: RandomForest,
    ) -> Result<Self> {
        let (features, schema) = config.schema(table)?;
        check_forest(&forest, &schema)?;
        Ok(Self {
            form: FormSpec::from_table(&features),
            schema,
            forest,
        })
    }

    /// Load the dataset at 'data' and the model at 'model'.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        data: P,
        model: Q,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let table = Table::load_csv(data)?;
        let forest = artifact::load(model)?;
        Self::new(&table, config, forest)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn form(&self) -> &FormSpec {
        &self.form
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Predict the exam score of 'record'. Missing features are imputed.
    pub fn predict(&self, record: &Record) -> Result<ExamPrediction> {
        let row = self.schema.align(record)?.to_numeric()?;
        check_width(&self.forest, &row)?;
        let raw = self.forest.predict(&row);
        log::debug!("Predicted a raw exam score of {}.", raw);
        Ok(ExamPrediction {
            raw,
            assessment: Assessment::from_score(raw),
        })
    }
}
