// Derived columns. Every derivation is a per-row function of existing
// columns, so it can run on train and test independently without leaking
// statistics across the split.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::schema::Schema;
use crate::table::{Column, Table};

pub const HOUR_COLUMN: &str = "Hour";

const SECONDS_PER_HOUR: f64 = 3600.0;
const HOURS_PER_DAY: f64 = 24.0;

pub fn interaction_name(base: &str, other: &str) -> String {
    format!("{base}_x_{other}")
}

pub fn power_name(column: &str, power: u32) -> String {
    format!("{column}^{power}")
}

// Adds `Hour` = floor(time / 3600) mod 24.
pub fn derive_time_features(table: &Table, time_column: &str) -> Result<Table> {
    let times = table.numeric(time_column)?;
    let hours = times
        .iter()
        .enumerate()
        .map(|(row, &t)| {
            if !t.is_finite() || t < 0.0 {
                return Err(AnalysisError::InvalidValue {
                    column: time_column.to_string(),
                    row,
                    value: t,
                });
            }
            Ok((t / SECONDS_PER_HOUR).floor() % HOURS_PER_DAY)
        })
        .collect::<Result<Vec<f64>>>()?;
    table.with_column(Column::numeric(HOUR_COLUMN, hours))
}

// Adds `base * other` for each of `others`. Any absent column is an error.
pub fn derive_interaction_features<S: AsRef<str>>(
    table: &Table,
    base: &str,
    others: &[S],
) -> Result<Table> {
    let base_values = table.numeric(base)?;
    let mut derived = Vec::with_capacity(others.len());
    for other in others {
        let other = other.as_ref();
        let values = table.numeric(other)?;
        let product = base_values.iter().zip(values).map(|(a, b)| a * b).collect();
        derived.push(Column::numeric(interaction_name(base, other), product));
    }

    derived.into_iter().try_fold(table.clone(), |acc, column| acc.with_column(column))
}

// Adds powers 2..=degree of `column`.
pub fn derive_polynomial_features(table: &Table, column: &str, degree: u32) -> Result<Table> {
    let values = table.numeric(column)?;
    (2..=degree).try_fold(table.clone(), |acc, power| {
        let powered = values.iter().map(|v| v.powi(power as i32)).collect();
        acc.with_column(Column::numeric(power_name(column, power), powered))
    })
}

// The configured set of derivations, applied in a fixed order:
// time, interactions, polynomial.
#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    time_column: Option<String>,
    base_column: String,
    interaction_columns: Vec<String>,
    polynomial_degree: u32,
}

impl FeatureEngineer {
    pub fn new(
        time_column: Option<String>,
        base_column: impl Into<String>,
        interaction_columns: Vec<String>,
        polynomial_degree: u32,
    ) -> Self {
        Self {
            time_column,
            base_column: base_column.into(),
            interaction_columns,
            polynomial_degree,
        }
    }

    // The time column is dropped from the plan when the input does not have it.
    pub fn from_config(config: &AnalysisConfig, table: &Table) -> Self {
        let time_column = config.time_column.clone().filter(|t| table.contains(t));
        Self::new(
            time_column,
            config.amount_column.clone(),
            config.interaction_columns.clone(),
            config.polynomial_degree,
        )
    }

    pub fn time_column(&self) -> Option<&str> {
        self.time_column.as_deref()
    }

    // The raw time axis is replaced by `Hour`, matching `engineer_schema`.
    pub fn engineer(&self, table: &Table) -> Result<Table> {
        let mut table = table.clone();
        if let Some(time) = &self.time_column {
            table = derive_time_features(&table, time)?.without_column(time)?;
        }
        let others = self.interaction_columns.as_slice();
        table = derive_interaction_features(&table, &self.base_column, others)?;
        table = derive_polynomial_features(&table, &self.base_column, self.polynomial_degree)?;
        debug!(columns = table.n_columns(), "engineered features");
        Ok(table)
    }

    // Schema after `engineer`: the raw time axis is replaced by `Hour` and
    // every derived column is numeric.
    pub fn engineer_schema(&self, schema: &Schema) -> Schema {
        let mut schema = schema.clone();
        if let Some(time) = &self.time_column {
            schema = schema.without(time).with_numeric(HOUR_COLUMN);
        }
        for other in &self.interaction_columns {
            schema = schema.with_numeric(interaction_name(&self.base_column, other));
        }
        for power in 2..=self.polynomial_degree {
            schema = schema.with_numeric(power_name(&self.base_column, power));
        }
        schema
    }
}
