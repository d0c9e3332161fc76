//! Serializable pipeline description.
//!
//! ```json
//! {
//!   "target": "PERFIL",
//!   "stages": [
//!     { "op": "drop_columns", "columns": ["NOME"] },
//!     { "op": "fill_with", "column": "INGLES", "fill": { "value": 0 } },
//!     { "op": "grade_average" },
//!     { "op": "normalize_grade", "column": "NOTA_GO", "policy": "pass_fail" },
//!     { "op": "rebalance", "features": ["NOTA_GO", "INGLES"], "seed": 42 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};

use super::Stage;

/// Stage list plus the target column used by rebalancing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Target column read by rebalance stages.
    #[serde(default)]
    pub target: Option<String>,
    /// Stages in run order.
    pub stages: Vec<Stage>,
}

impl PipelineConfig {
    /// Parse and validate a JSON pipeline description.
    pub fn from_json_str(json: &str) -> FeatureResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON pipeline description from a file.
    pub fn from_path(path: impl AsRef<Path>) -> FeatureResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_string(&self) -> FeatureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that hold regardless of the input table.
    pub fn validate(&self) -> FeatureResult<()> {
        let rebalances = self
            .stages
            .iter()
            .filter(|s| matches!(s, Stage::Rebalance(_)))
            .count();
        if rebalances > 0 && self.target.is_none() {
            return Err(FeatureError::InvalidConfig {
                message: "a rebalance stage needs a target column".to_string(),
            });
        }
        if let Some(target) = &self.target {
            for stage in &self.stages {
                if let Stage::Rebalance(r) = stage {
                    if r.features.iter().any(|f| f == target) {
                        return Err(FeatureError::InvalidConfig {
                            message: format!("target '{target}' is also listed as a feature"),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;
    use crate::error::FeatureError;
    use crate::pipeline::Stage;
    use crate::processing::{EmptyGradePolicy, FillStrategy, MissingColumns};
    use crate::resample::SamplerKind;
    use crate::types::Value;

    const CONFIG: &str = r#"{
        "target": "PERFIL",
        "stages": [
            { "op": "drop_columns", "columns": ["NOME"] },
            { "op": "fill_with", "column": "INGLES", "fill": { "value": 0 } },
            { "op": "fill_with", "column": "NOTA_GO", "fill": "median" },
            { "op": "change_type", "column": "INGLES", "target": "float64" },
            { "op": "attendance_deficiency" },
            { "op": "grade_average" },
            { "op": "normalize_grade", "column": "NOTA_GO", "policy": "pass_fail" },
            { "op": "difficulty_flag" },
            { "op": "rebalance", "features": ["NOTA_GO", "INGLES"], "sampler": { "kind": "smote", "k_neighbors": 3 }, "seed": 42 }
        ]
    }"#;

    #[test]
    fn parses_every_stage_kind() {
        let config = PipelineConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.target.as_deref(), Some("PERFIL"));
        assert_eq!(config.stages.len(), 9);

        match &config.stages[0] {
            Stage::DropColumns(d) => assert_eq!(d.on_missing, MissingColumns::Fail),
            other => panic!("unexpected stage {other:?}"),
        }
        match &config.stages[1] {
            Stage::FillWith(f) => assert_eq!(f.fill, FillStrategy::Value(Value::Int64(0))),
            other => panic!("unexpected stage {other:?}"),
        }
        match &config.stages[6] {
            Stage::NormalizeGrade(n) => assert_eq!(n.policy, EmptyGradePolicy::PassFail),
            other => panic!("unexpected stage {other:?}"),
        }
        match &config.stages[8] {
            Stage::Rebalance(r) => {
                assert_eq!(r.sampler, SamplerKind::Smote { k_neighbors: 3 });
                assert_eq!(r.seed, Some(42));
            }
            other => panic!("unexpected stage {other:?}"),
        }
    }

    #[test]
    fn json_round_trips() {
        let config = PipelineConfig::from_json_str(CONFIG).unwrap();
        let json = config.to_json_string().unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rebalance_without_target_is_rejected() {
        let json = r#"{ "stages": [ { "op": "rebalance", "features": ["NOTA_GO"] } ] }"#;
        let err = PipelineConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidConfig { .. }));
    }

    #[test]
    fn target_listed_as_feature_is_rejected() {
        let json = r#"{ "target": "PERFIL", "stages": [ { "op": "rebalance", "features": ["PERFIL"] } ] }"#;
        let err = PipelineConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("also listed as a feature"));
    }

    #[test]
    fn unknown_op_is_a_json_error() {
        let json = r#"{ "stages": [ { "op": "train_model" } ] }"#;
        let err = PipelineConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, FeatureError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PipelineConfig::from_path("tests/fixtures/does_not_exist.json").unwrap_err();
        assert!(matches!(err, FeatureError::Io(_)));
    }
}
