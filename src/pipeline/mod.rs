//! The two training and prediction pipelines. They share the building blocks
//! in this module but keep separate data contracts: the exam pipeline works
//! on numeric features and a 0-100 target, and the CGPA pipeline encodes
//! categorical features and predicts on the 0-4.0 scale.

pub mod cgpa;
pub mod exam;

use crate::align::FeatureSchema;
use crate::dataset::Table;
use crate::error::{Error, Result};
use crate::forest::{FeatureMatrix, RandomForest};
use crate::metrics::r2_score;
use crate::split::train_test_split;
use crate::{Regressor, TrainOptions};
use std::fmt;

/// Names the target column, the columns that are not features, and the
/// feature columns the dataset must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub target: String,
    pub excluded: Vec<String>,
    pub required: Vec<String>,
}

impl PipelineConfig {
    pub fn new(target: &str, excluded: &[&str]) -> Self {
        Self {
            target: target.to_string(),
            excluded: excluded.iter().map(|s| s.to_string()).collect(),
            required: Vec::new(),
        }
    }

    /// Require the feature columns 'names'.
    pub fn with_required(mut self, names: &[&str]) -> Self {
        self.required = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Split 'table' into the feature columns and the target values. The
    /// target, every excluded column and every required feature must exist,
    /// and the target must be numeric.
    pub fn features_and_targets(
        &self,
        table: &Table,
    ) -> Result<(Table, Vec<f64>)> {
        if table.rows() == 0 {
            return Err(Error::EmptyDataset("the table has no rows".into()));
        }
        let target = table.column(&self.target)?;
        let targets = target.as_numeric().ok_or_else(|| {
            Error::SchemaMismatch(format!(
                "target column '{}' is not numeric",
                self.target
            ))
        })?;

        let mut dropped: Vec<&str> = vec![self.target.as_str()];
        dropped.extend(self.excluded.iter().map(String::as_str));
        let features = table.drop_columns(&dropped)?;
        for name in &self.required {
            features.column(name)?;
        }
        if features.columns().is_empty() {
            return Err(Error::SchemaMismatch("no feature columns left".into()));
        }
        Ok((features, targets.to_vec()))
    }

    /// Build the feature schema of 'table'.
    pub fn schema(&self, table: &Table) -> Result<(Table, FeatureSchema)> {
        let (features, _) = self.features_and_targets(table)?;
        let schema = FeatureSchema::from_table(&features)?;
        Ok((features, schema))
    }
}

/// The goodness of fit on both partitions of the split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    pub train_r2: f64,
    pub test_r2: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl TrainReport {
    pub fn log(&self) {
        log::info!(
            "Trained on {} rows, tested on {} rows.",
            self.train_rows,
            self.test_rows
        );
        for line in self.to_string().lines() {
            log::info!("{}", line);
        }
    }
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training R² Score: {:.4}", self.train_r2)?;
        write!(f, "Testing R² Score: {:.4}", self.test_r2)
    }
}

/// Split the encoded 'rows', fit a forest on the training partition and
/// score it on both partitions.
pub(crate) fn fit_and_score(
    rows: &[Vec<f64>],
    targets: &[f64],
    feature_names: &[String],
    opts: &TrainOptions,
) -> Result<(RandomForest, TrainReport)> {
    let split = train_test_split(rows.len(), opts.test_ratio, opts.seed)?;
    let take = |indices: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
        indices
            .iter()
            .map(|i| (rows[*i].clone(), targets[*i]))
            .unzip()
    };
    let (train_rows, train_targets) = take(&split.train);
    let (test_rows, test_targets) = take(&split.test);

    let data = FeatureMatrix::from_rows(&train_rows)?;
    log::info!(
        "Fitting {} trees on {} rows and {} features.",
        opts.trees,
        data.rows(),
        data.cols()
    );
    let forest = RandomForest::fit(&data, &train_targets, feature_names, opts)?;

    let report = TrainReport {
        train_r2: r2_score(&train_targets, &forest.predict_batch(&train_rows)),
        test_r2: r2_score(&test_targets, &forest.predict_batch(&test_rows)),
        train_rows: train_rows.len(),
        test_rows: test_rows.len(),
    };
    report.log();
    Ok((forest, report))
}

/// Check that 'forest' was fitted on the columns of 'schema', in order.
pub(crate) fn check_forest(
    forest: &RandomForest,
    schema: &FeatureSchema,
) -> Result<()> {
    let names = schema.names();
    if forest.feature_names() != names.as_slice() {
        return Err(Error::SchemaMismatch(format!(
            "the model was fitted on [{}] but the dataset has [{}]",
            forest.feature_names().join(", "),
            names.join(", ")
        )));
    }
    Ok(())
}

/// Check that 'row' has the width the forest expects.
pub(crate) fn check_width(forest: &RandomForest, row: &[f64]) -> Result<()> {
    if row.len() != forest.num_features() {
        return Err(Error::SchemaMismatch(format!(
            "row has {} features, the model expects {}",
            row.len(),
            forest.num_features()
        )));
    }
    Ok(())
}
