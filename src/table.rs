// In-memory columnar table threaded through the analysis stages.
use std::collections::HashSet;
use std::fmt;

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Numeric => "numeric",
            FeatureKind::Categorical => "categorical",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    // Missing cells are NaN.
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            ColumnData::Numeric(_) => FeatureKind::Numeric,
            ColumnData::Categorical(_) => FeatureKind::Categorical,
        }
    }

    fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(indices.iter().map(|&i| values[i]).collect())
            }
            ColumnData::Categorical(values) => {
                ColumnData::Categorical(indices.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }

    // Cell rendered for previews.
    pub fn display_value(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(values) if values[row].is_nan() => "NaN".to_string(),
            ColumnData::Numeric(values) => format!("{}", values[row]),
            ColumnData::Categorical(values) => values[row].clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self { name: name.into(), data: ColumnData::Numeric(values) }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<String>) -> Self {
        Self { name: name.into(), data: ColumnData::Categorical(values) }
    }

    pub fn kind(&self) -> FeatureKind {
        self.data.kind()
    }

    pub fn as_numeric(&self) -> Result<&[f64]> {
        match &self.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Categorical(_) => Err(self.type_mismatch(FeatureKind::Numeric)),
        }
    }

    pub fn as_categorical(&self) -> Result<&[String]> {
        match &self.data {
            ColumnData::Categorical(values) => Ok(values),
            ColumnData::Numeric(_) => Err(self.type_mismatch(FeatureKind::Categorical)),
        }
    }

    fn type_mismatch(&self, expected: FeatureKind) -> AnalysisError {
        AnalysisError::TypeMismatch {
            column: self.name.clone(),
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }
}

// Ordered named columns of equal length. Stages never mutate a table;
// they return a new one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if column.data.len() != n_rows {
                return Err(AnalysisError::LengthMismatch {
                    expected: n_rows,
                    found: column.data.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(AnalysisError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        self.column(name)?.as_numeric()
    }

    // Returns a copy of the table with `column` appended.
    pub fn with_column(&self, column: Column) -> Result<Table> {
        if self.contains(&column.name) {
            return Err(AnalysisError::DuplicateColumn(column.name));
        }
        if !self.columns.is_empty() && column.data.len() != self.n_rows {
            return Err(AnalysisError::LengthMismatch {
                expected: self.n_rows,
                found: column.data.len(),
            });
        }
        let mut columns = self.columns.clone();
        columns.push(column);
        Table::new(columns)
    }

    pub fn without_column(&self, name: &str) -> Result<Table> {
        self.column(name)?;
        let columns = self.columns.iter().filter(|c| c.name != name).cloned().collect();
        Ok(Table { columns, n_rows: self.n_rows })
    }

    // Keeps the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| self.column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Ok(Table { columns, n_rows: self.n_rows });
        }
        Table::new(columns)
    }

    // Row subset in the order of `indices`.
    pub fn take(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column { name: c.name.clone(), data: c.data.take(indices) })
            .collect();
        Table { columns, n_rows: indices.len() }
    }

    // Binary labels of `target`, validated to be exactly 0 or 1.
    pub fn labels(&self, target: &str) -> Result<Vec<usize>> {
        let column = self
            .column(target)
            .map_err(|_| AnalysisError::TargetColumnMissing(target.to_string()))?;
        match &column.data {
            ColumnData::Numeric(values) => values
                .iter()
                .enumerate()
                .map(|(row, &v)| {
                    if v == 0.0 {
                        Ok(0)
                    } else if v == 1.0 {
                        Ok(1)
                    } else {
                        Err(AnalysisError::InvalidTarget {
                            column: target.to_string(),
                            row,
                            value: v.to_string(),
                        })
                    }
                })
                .collect(),
            ColumnData::Categorical(values) => {
                let row = values.iter().position(|v| v != "0" && v != "1").unwrap_or(0);
                Err(AnalysisError::InvalidTarget {
                    column: target.to_string(),
                    row,
                    value: values.get(row).cloned().unwrap_or_default(),
                })
            }
        }
    }
}
