//! The CGPA pipeline: categorical features are label encoded with one frozen
//! encoder per column, and the forest predicts a CGPA on the 0-4.0 scale.

use super::{check_forest, check_width, fit_and_score};
use super::{PipelineConfig, TrainReport};
use crate::align::{FeatureSchema, Record};
use crate::artifact;
use crate::dataset::Table;
use crate::encoding::EncoderTable;
use crate::error::{Error, Result};
use crate::forest::RandomForest;
use crate::form::FormSpec;
use crate::label::{cgpa_to_percentage, Assessment};
use crate::{Regressor, TrainOptions};
use std::path::Path;

/// The column that holds the CGPA.
pub const TARGET: &str = "CGPA";

/// The default model file name.
pub const MODEL_FILE: &str = "cgpa_model.rfm";

/// The default encoder table file name.
pub const ENCODERS_FILE: &str = "cgpa_encoders.lenc";

pub fn default_config() -> PipelineConfig {
    PipelineConfig::new(TARGET, &[])
}

/// Fit the encoders on every row of 'table', then fit a forest on the
/// encoded training partition.
pub fn train(
    table: &Table,
    config: &PipelineConfig,
    opts: &TrainOptions,
) -> Result<(RandomForest, EncoderTable, TrainReport)> {
    let (features, targets) = config.features_and_targets(table)?;
    let encoders = EncoderTable::fit(&features);
    log::info!("Fitted {} label encoders.", encoders.len());
    let rows = encoders.transform_table(&features)?;
    let (forest, report) =
        fit_and_score(&rows, &targets, &features.column_names(), opts)?;
    Ok((forest, encoders, report))
}

/// A prediction of the CGPA pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CgpaPrediction {
    pub cgpa: f64,
    /// The CGPA as a percentage of the 4.0 scale.
    pub percentage: f64,
    /// The assessment of the percentage.
    pub assessment: Assessment,
}

/// Predicts the CGPA from user records.
#[derive(Debug)]
pub struct CgpaPredictor {
    schema: FeatureSchema,
    form: FormSpec,
    forest: RandomForest,
    encoders: EncoderTable,
}

impl CgpaPredictor {
    /// Build a predictor from the training 'table', a fitted 'forest' and
    /// the 'encoders' fitted with it. Every categorical feature must have an
    /// encoder.
    pub fn new(
        table: &Table,
        config: &PipelineConfig,
        forest: RandomForest,
        encoders: EncoderTable,
    ) -> Result<Self> {
        let (features, schema) = config.schema(table)?;
        check_forest(&forest, &schema)?;
        let names = schema.categorical_names();
        if let Some(name) = names.iter().find(|n| encoders.get(n).is_none()) {
            return Err(Error::SchemaMismatch(format!(
                "no encoder for the categorical column '{}'",
                name
            )));
        }
        Ok(Self {
            form: FormSpec::from_table(&features),
            schema,
            forest,
            encoders,
        })
    }

    /// Load the dataset, the model and the encoder table from disk.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        data: P,
        model: Q,
        encoders: R,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let table = Table::load_csv(data)?;
        let forest = artifact::load(model)?;
        let encoders = artifact::load(encoders)?;
        Self::new(&table, config, forest, encoders)
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

    pub fn encoders(&self) -> &EncoderTable {
        &self.encoders
    }

    /// Predict the CGPA of 'record'. Missing features are imputed before
    /// the categorical values are encoded.
    pub fn predict(&self, record: &Record) -> Result<CgpaPrediction> {
        let aligned = self.schema.align(record)?;
        let row = aligned
            .iter()
            .map(|(name, val)| self.encoders.encode_value(name, val))
            .collect::<Result<Vec<f64>>>()?;
        check_width(&self.forest, &row)?;

        let cgpa = self.forest.predict(&row);
        let percentage = cgpa_to_percentage(cgpa);
        log::debug!("Predicted a CGPA of {} ({}%).", cgpa, percentage);
        Ok(CgpaPrediction {
            cgpa,
            percentage,
            assessment: Assessment::from_score(percentage),
        })
    }
}
