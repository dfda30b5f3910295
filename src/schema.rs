// Column bookkeeping: which columns are features, of which kind, and which
// one is the target.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::table::{FeatureKind, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDescriptor {
    pub name: String,
    pub kind: FeatureKind,
}

// Feature columns split by kind. Updates return a new schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub target: String,
    features: Vec<FeatureDescriptor>,
}

impl Schema {
    pub fn features(&self) -> &[FeatureDescriptor] {
        &self.features
    }

    pub fn numeric(&self) -> Vec<String> {
        self.names_of(FeatureKind::Numeric)
    }

    pub fn categorical(&self) -> Vec<String> {
        self.names_of(FeatureKind::Categorical)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    // Drops `name` from the feature sets, e.g. a sequential time axis that
    // should not be scaled as a plain magnitude.
    pub fn without(&self, name: &str) -> Schema {
        Schema {
            target: self.target.clone(),
            features: self.features.iter().filter(|f| f.name != name).cloned().collect(),
        }
    }

    pub fn with_numeric(&self, name: impl Into<String>) -> Schema {
        let name = name.into();
        let mut features = self.features.clone();
        if !features.iter().any(|f| f.name == name) {
            features.push(FeatureDescriptor { name, kind: FeatureKind::Numeric });
        }
        Schema { target: self.target.clone(), features }
    }

    fn names_of(&self, kind: FeatureKind) -> Vec<String> {
        self.features
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.name.clone())
            .collect()
    }
}

// Classifies every non-target column by its loaded type.
pub fn inspect(table: &Table, target: &str) -> Result<Schema> {
    if !table.contains(target) {
        return Err(AnalysisError::TargetColumnMissing(target.to_string()));
    }
    let features = table
        .columns()
        .iter()
        .filter(|c| c.name != target)
        .map(|c| FeatureDescriptor { name: c.name.clone(), kind: c.kind() })
        .collect();
    Ok(Schema { target: target.to_string(), features })
}

// Rejects a malformed file before any stage runs on it.
pub fn validate_required(table: &Table, config: &AnalysisConfig) -> Result<()> {
    if !table.contains(&config.target_column) {
        return Err(AnalysisError::TargetColumnMissing(config.target_column.clone()));
    }
    if table.n_rows() == 0 {
        return Err(AnalysisError::EmptyDataset);
    }
    table.labels(&config.target_column)?;

    let required = std::iter::once(&config.amount_column).chain(config.interaction_columns.iter());
    for name in required {
        table.numeric(name)?;
    }

    if let Some(time) = &config.time_column {
        if table.contains(time) {
            table.numeric(time)?;
        }
    }

    debug!(rows = table.n_rows(), "required columns present");
    Ok(())
}
