//! Class rebalancing by oversampling.
//!
//! [`Rebalance`] pulls a numeric feature matrix and a target column out of a [`Table`], hands
//! them to an [`Oversampler`], and rebuilds a table from what comes back: the feature columns
//! (as `Float64`) followed by the target column. Original rows come first, in order; synthetic
//! rows are appended after them.
//!
//! Samplers bring every class up to the size of the largest one:
//!
//! - [`Smote`]: interpolates between a minority sample and one of its nearest same-class
//!   neighbours.
//! - [`RandomOverSampler`]: duplicates randomly chosen minority rows.

mod random;
mod smote;

pub use random::RandomOverSampler;
pub use smote::Smote;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{FeatureError, FeatureResult};
use crate::types::{DataType, Field, Schema, Table, Value};

/// Output of an [`Oversampler`]: the input rows followed by synthetic rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    /// Feature rows.
    pub features: Vec<Vec<f64>>,
    /// Class index per row.
    pub labels: Vec<usize>,
    /// Number of synthetic rows generated per class index.
    pub n_synthetic: Vec<usize>,
}

/// Why a sampler could not rebalance its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    #[error("found {found} class(es); at least 2 are required")]
    TooFewClasses { found: usize },

    #[error("class {class} has {count} sample(s); at least {required} are required to synthesize neighbours")]
    TooFewSamples {
        class: usize,
        count: usize,
        required: usize,
    },
}

/// A class-balancing oversampler.
///
/// `labels` are dense class indices (`0..n_classes`). Implementations must return the input rows
/// unchanged and in order, followed by any synthetic rows.
pub trait Oversampler {
    fn resample(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        rng: &mut StdRng,
    ) -> Result<Resampled, SamplingError>;
}

/// Row indices per class index.
pub fn class_indices(labels: &[usize]) -> Vec<Vec<usize>> {
    let n_classes = labels.iter().max().map_or(0, |m| m + 1);
    let mut out = vec![Vec::new(); n_classes];
    for (row, &label) in labels.iter().enumerate() {
        out[label].push(row);
    }
    out
}

/// How many rows each class must gain to match the majority class.
pub(crate) fn deficits(indices: &[Vec<usize>]) -> Result<Vec<usize>, SamplingError> {
    let found = indices.iter().filter(|rows| !rows.is_empty()).count();
    if found < 2 {
        return Err(SamplingError::TooFewClasses { found });
    }
    let majority = indices.iter().map(Vec::len).max().unwrap_or(0);
    Ok(indices.iter().map(|rows| majority - rows.len()).collect())
}

/// Which [`Oversampler`] a [`Rebalance`] stage uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplerKind {
    Smote {
        #[serde(default = "default_k_neighbors")]
        k_neighbors: usize,
    },
    Random,
}

fn default_k_neighbors() -> usize {
    smote::DEFAULT_K_NEIGHBORS
}

impl Default for SamplerKind {
    fn default() -> Self {
        SamplerKind::Smote {
            k_neighbors: default_k_neighbors(),
        }
    }
}

impl SamplerKind {
    /// Instantiate the sampler.
    pub fn build(&self) -> Box<dyn Oversampler> {
        match self {
            SamplerKind::Smote { k_neighbors } => Box::new(Smote::new().with_k_neighbors(*k_neighbors)),
            SamplerKind::Random => Box::new(RandomOverSampler),
        }
    }
}

/// Rebalance `target` over the listed feature columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebalance {
    /// Numeric feature columns, in output order.
    pub features: Vec<String>,
    /// Oversampler to use. Defaults to SMOTE with 5 neighbours.
    #[serde(default)]
    pub sampler: SamplerKind,
    /// Seed for the sampler. `None` seeds from system entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Rebalance {
    /// Rebalance over `features` with `sampler` and no fixed seed.
    pub fn new(features: Vec<String>, sampler: SamplerKind) -> Self {
        Self {
            features,
            sampler,
            seed: None,
        }
    }

    /// Fix the sampler seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Oversample `table` so every class of `target` matches the largest one.
    pub fn apply(&self, table: &Table, target: &str) -> FeatureResult<Table> {
        self.apply_with(table, target, self.sampler.build().as_ref())
    }

    /// Like [`Self::apply`], with a caller-supplied sampler instead of [`Self::sampler`].
    pub fn apply_with(
        &self,
        table: &Table,
        target: &str,
        sampler: &dyn Oversampler,
    ) -> FeatureResult<Table> {
        if self.features.is_empty() {
            return Err(FeatureError::InvalidConfig {
                message: "rebalance needs at least one feature column".to_string(),
            });
        }
        let feature_idx = self
            .features
            .iter()
            .map(|f| table.schema.require(f))
            .collect::<FeatureResult<Vec<_>>>()?;
        let target_idx = table.schema.require(target)?;

        let features = extract_features(table, &self.features, &feature_idx)?;
        let (labels, classes) = encode_target(table, target, target_idx)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let resampled = sampler
            .resample(&features, &labels, &mut rng)
            .map_err(|e| FeatureError::ClassImbalance {
                column: target.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            target_column = target,
            classes = classes.len(),
            input_rows = table.row_count(),
            output_rows = resampled.labels.len(),
            synthetic = ?resampled.n_synthetic,
            "rebalanced target"
        );

        let mut fields: Vec<Field> = self
            .features
            .iter()
            .map(|f| Field::new(f, DataType::Float64))
            .collect();
        fields.push(table.schema.fields[target_idx].clone());

        let rows = resampled
            .features
            .into_iter()
            .zip(resampled.labels)
            .map(|(x, label)| {
                let mut row: Vec<Value> = x.into_iter().map(Value::Float64).collect();
                row.push(classes[label].clone());
                row
            })
            .collect();

        Table::try_new(Schema::new(fields), rows)
    }
}

fn extract_features(
    table: &Table,
    names: &[String],
    indices: &[usize],
) -> FeatureResult<Vec<Vec<f64>>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            names
                .iter()
                .zip(indices)
                .map(|(name, &idx)| {
                    let value = &row[idx];
                    if value.is_missing() {
                        return Err(FeatureError::MissingValue {
                            row: row_idx,
                            column: name.clone(),
                        });
                    }
                    value.as_f64().ok_or_else(|| FeatureError::TypeCoercion {
                        row: row_idx,
                        column: name.clone(),
                        raw: value.to_string(),
                        message: "expected a numeric feature".to_string(),
                    })
                })
                .collect()
        })
        .collect()
}

/// Map target values to dense class indices in sorted label order.
///
/// Returns the per-row class index and one representative [`Value`] per class.
fn encode_target(
    table: &Table,
    target: &str,
    idx: usize,
) -> FeatureResult<(Vec<usize>, Vec<Value>)> {
    let mut by_label: BTreeMap<String, Value> = BTreeMap::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let value = &row[idx];
        if value.is_missing() {
            return Err(FeatureError::MissingValue {
                row: row_idx,
                column: target.to_string(),
            });
        }
        by_label
            .entry(value.to_string())
            .or_insert_with(|| value.clone());
    }

    let position: BTreeMap<&str, usize> = by_label
        .keys()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();
    let labels = table
        .rows
        .iter()
        .map(|row| position[row[idx].to_string().as_str()])
        .collect();
    let classes = by_label.values().cloned().collect();
    Ok((labels, classes))
}
