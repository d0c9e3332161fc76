//! Column removal.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::types::Table;

use super::Transform;

/// What [`DropColumns`] does when asked to drop a column the table does not have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingColumns {
    /// Report a schema error.
    #[default]
    Fail,
    /// Skip names that are not present.
    Ignore,
}

/// Remove the named columns. Row count and row order are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumns {
    /// Columns to remove.
    pub columns: Vec<String>,
    /// What to do when a listed column is absent.
    #[serde(default)]
    pub on_missing: MissingColumns,
}

impl DropColumns {
    /// Drop `columns`, failing on any that are absent.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            on_missing: MissingColumns::Fail,
        }
    }

    /// Skip absent columns instead of failing.
    pub fn ignore_missing(mut self) -> Self {
        self.on_missing = MissingColumns::Ignore;
        self
    }
}

impl Transform for DropColumns {
    fn name(&self) -> &'static str {
        "drop_columns"
    }

    fn apply(&self, table: &Table) -> FeatureResult<Table> {
        let mut indices = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            match (table.schema.index_of(column), self.on_missing) {
                (Some(idx), _) => indices.push(idx),
                (None, MissingColumns::Ignore) => {}
                (None, MissingColumns::Fail) => {
                    return Err(FeatureError::Schema {
                        message: format!(
                            "cannot drop missing column '{column}'. columns={:?}",
                            table.schema.field_names().collect::<Vec<_>>()
                        ),
                    });
                }
            }
        }
        Ok(table.without_indices(&indices))
    }
}
