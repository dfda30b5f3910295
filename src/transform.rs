// Column-wise preprocessing: an ordered list of (column selector, transform)
// steps whose outputs are concatenated left to right into one matrix.
//
// `Pipeline::fit` estimates every statistic from the table it is given and
// returns a `FittedPipeline`. Applying the fitted pipeline only reads those
// parameters, so fitting on train and applying to test never lets a test
// statistic into the model inputs.

use std::collections::{BTreeSet, HashSet};

use ndarray::{Array2, ArrayView1};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::table::Table;

// What one-hot encoding does with a category it did not see during fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategory {
    // Emit an all-zero indicator row.
    Ignore,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Standardize,
    OneHot { unknown: UnknownCategory },
}

// Handling of columns no step selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remainder {
    // Numeric leftovers are copied unchanged; a categorical leftover is an error.
    Passthrough,
    Drop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub columns: Vec<String>,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    steps: Vec<Step>,
    remainder: Remainder,
}

// Standardize `numeric`, one-hot `categorical`, and handle every other
// column according to `remainder`.
pub fn build_pipeline(
    numeric: &[String],
    categorical: &[String],
    unknown: UnknownCategory,
    remainder: Remainder,
) -> Pipeline {
    Pipeline::new(remainder)
        .with_step(numeric.to_vec(), Transform::Standardize)
        .with_step(categorical.to_vec(), Transform::OneHot { unknown })
}

impl Pipeline {
    pub fn new(remainder: Remainder) -> Self {
        Self { steps: Vec::new(), remainder }
    }

    pub fn with_step(mut self, columns: Vec<String>, transform: Transform) -> Self {
        self.steps.push(Step { columns, transform });
        self
    }

    pub fn fit(&self, table: &Table) -> Result<FittedPipeline> {
        let mut assigned: HashSet<String> = HashSet::new();
        let mut fitted = Vec::with_capacity(self.steps.len() + 1);

        for step in &self.steps {
            let columns = &step.columns;
            for name in columns {
                table.column(name)?;
                if !assigned.insert(name.clone()) {
                    return Err(AnalysisError::DuplicateColumn(name.clone()));
                }
            }
            let fitted_step = match &step.transform {
                Transform::Standardize => FittedStep::Standardize(
                    columns
                        .iter()
                        .map(|name| ScaleParams::fit(name, table.numeric(name)?))
                        .collect::<Result<_>>()?,
                ),
                Transform::OneHot { unknown } => FittedStep::OneHot {
                    vocabularies: columns
                        .iter()
                        .map(|name| Vocabulary::fit(name, table.column(name)?.as_categorical()?))
                        .collect::<Result<_>>()?,
                    unknown: *unknown,
                },
            };
            fitted.push(fitted_step);
        }

        if self.remainder == Remainder::Passthrough {
            let rest: Vec<String> = table
                .columns()
                .iter()
                .filter(|c| !assigned.contains(&c.name))
                .map(|c| c.as_numeric().map(|_| c.name.clone()))
                .collect::<Result<_>>()?;
            if !rest.is_empty() {
                fitted.push(FittedStep::Passthrough(rest));
            }
        }

        let pipeline = FittedPipeline { steps: fitted };
        debug!(
            rows = table.n_rows(),
            outputs = pipeline.n_outputs(),
            "fitted preprocessing pipeline"
        );
        Ok(pipeline)
    }
}

// Mean and scale of one standardized column.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleParams {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

impl ScaleParams {
    // Population statistics over the finite cells. A column without spread
    // keeps scale 1 so it is only centred.
    fn fit(column: &str, values: &[f64]) -> Result<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Ok(Self { column: column.to_string(), mean: 0.0, scale: 1.0 });
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let scale = if std_dev > 0.0 && std_dev.is_finite() { std_dev } else { 1.0 };
        Ok(Self { column: column.to_string(), mean, scale })
    }

    // Missing and infinite cells land on the fitted mean, i.e. 0.
    fn apply(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .map(|&v| if v.is_finite() { (v - self.mean) / self.scale } else { 0.0 })
            .collect()
    }
}

// Sorted categories observed for one column during fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    pub column: String,
    pub categories: Vec<String>,
}

impl Vocabulary {
    fn fit(column: &str, values: &[String]) -> Result<Self> {
        let categories: BTreeSet<&String> = values.iter().collect();
        Ok(Self {
            column: column.to_string(),
            categories: categories.into_iter().cloned().collect(),
        })
    }

    fn apply(&self, values: &[String], unknown: UnknownCategory) -> Result<Vec<Vec<f64>>> {
        let mut indicators = vec![vec![0.0; values.len()]; self.categories.len()];
        for (row, value) in values.iter().enumerate() {
            match self.categories.binary_search(value) {
                Ok(k) => indicators[k][row] = 1.0,
                Err(_) if unknown == UnknownCategory::Ignore => {}
                Err(_) => {
                    return Err(AnalysisError::UnknownCategory {
                        column: self.column.clone(),
                        value: value.clone(),
                    })
                }
            }
        }
        Ok(indicators)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FittedStep {
    Standardize(Vec<ScaleParams>),
    OneHot { vocabularies: Vec<Vocabulary>, unknown: UnknownCategory },
    Passthrough(Vec<String>),
}

impl FittedStep {
    fn output_names(&self) -> Vec<String> {
        match self {
            FittedStep::Standardize(params) => params.iter().map(|p| p.column.clone()).collect(),
            FittedStep::OneHot { vocabularies, .. } => vocabularies
                .iter()
                .flat_map(|v| v.categories.iter().map(move |c| format!("{}_{}", v.column, c)))
                .collect(),
            FittedStep::Passthrough(columns) => columns.clone(),
        }
    }

    fn apply(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        match self {
            FittedStep::Standardize(params) => params
                .iter()
                .map(|p| Ok(p.apply(table.numeric(&p.column)?)))
                .collect(),
            FittedStep::OneHot { vocabularies, unknown } => {
                let mut outputs = Vec::new();
                for vocabulary in vocabularies {
                    let values = table.column(&vocabulary.column)?.as_categorical()?;
                    outputs.extend(vocabulary.apply(values, *unknown)?);
                }
                Ok(outputs)
            }
            FittedStep::Passthrough(columns) => columns
                .iter()
                .map(|name| Ok(table.numeric(name)?.to_vec()))
                .collect(),
        }
    }
}

// Parameters estimated by `Pipeline::fit`. Read-only from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPipeline {
    steps: Vec<FittedStep>,
}

impl FittedPipeline {
    pub fn steps(&self) -> &[FittedStep] {
        &self.steps
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.steps.iter().flat_map(|s| s.output_names()).collect()
    }

    pub fn n_outputs(&self) -> usize {
        self.feature_names().len()
    }

    pub fn apply(&self, table: &Table) -> Result<Array2<f64>> {
        let mut outputs = Vec::new();
        for step in &self.steps {
            outputs.extend(step.apply(table)?);
        }

        let mut matrix = Array2::zeros((table.n_rows(), outputs.len()));
        for (j, column) in outputs.iter().enumerate() {
            matrix.column_mut(j).assign(&ArrayView1::from(column.as_slice()));
        }
        Ok(matrix)
    }
}
