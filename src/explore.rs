// Exploratory statistics of a loaded table: describe, missing values,
// class balance and Pearson correlations.

use ndarray::Array2;

use crate::error::Result;
use crate::table::{ColumnData, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    // Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    // Statistics over the non-missing cells; NaN where undefined.
    pub fn compute(column: &str, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        let mean = if count > 0 {
            sorted.iter().sum::<f64>() / count as f64
        } else {
            f64::NAN
        };
        let std = if count > 1 {
            let ss = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };
        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

// Linear interpolation between closest ranks of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// Pearson correlation over the rows where both columns are present.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn compute(table: &Table) -> Self {
        let numeric: Vec<(&str, &[f64])> = table
            .columns()
            .iter()
            .filter_map(|c| match &c.data {
                ColumnData::Numeric(values) => Some((c.name.as_str(), values.as_slice())),
                ColumnData::Categorical(_) => None,
            })
            .collect();
        let n = numeric.len();
        let mut values = Array2::from_elem((n, n), f64::NAN);
        for i in 0..n {
            for j in i..n {
                let r = if i == j { 1.0 } else { pearson(numeric[i].1, numeric[j].1) };
                values[[i, j]] = r;
                values[[j, i]] = r;
            }
        }
        Self { columns: numeric.iter().map(|(name, _)| name.to_string()).collect(), values }
    }

    // Correlation of every other column with `column`, strongest first.
    pub fn ranked_against(&self, column: &str) -> Vec<(String, f64)> {
        let Some(k) = self.columns.iter().position(|c| c == column) else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f64)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != k)
            .map(|(i, name)| (name.clone(), self.values[[k, i]]))
            .collect();
        ranked.sort_by(|a, b| {
            let a = if a.1.is_nan() { -1.0 } else { a.1.abs() };
            let b = if b.1.is_nan() { -1.0 } else { b.1.abs() };
            b.total_cmp(&a)
        });
        ranked
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exploration {
    pub n_rows: usize,
    pub n_columns: usize,
    pub missing: Vec<(String, usize)>,
    pub describe: Vec<ColumnStats>,
    // Rows per target label [0, 1].
    pub class_counts: [usize; 2],
    pub correlation: CorrelationMatrix,
}

impl Exploration {
    pub fn fraud_rate(&self) -> f64 {
        let total = self.class_counts[0] + self.class_counts[1];
        if total == 0 {
            0.0
        } else {
            self.class_counts[1] as f64 / total as f64
        }
    }
}

pub fn explore(table: &Table, target: &str) -> Result<Exploration> {
    let labels = table.labels(target)?;
    let mut class_counts = [0usize; 2];
    for label in labels {
        class_counts[label] += 1;
    }

    let missing = table
        .columns()
        .iter()
        .map(|c| {
            let n = match &c.data {
                ColumnData::Numeric(values) => values.iter().filter(|v| v.is_nan()).count(),
                ColumnData::Categorical(values) => values.iter().filter(|v| v.is_empty()).count(),
            };
            (c.name.clone(), n)
        })
        .collect();

    let describe = table
        .columns()
        .iter()
        .filter_map(|c| match &c.data {
            ColumnData::Numeric(values) => Some(ColumnStats::compute(&c.name, values)),
            ColumnData::Categorical(_) => None,
        })
        .collect();

    Ok(Exploration {
        n_rows: table.n_rows(),
        n_columns: table.n_columns(),
        missing,
        describe,
        class_counts,
        correlation: CorrelationMatrix::compute(table),
    })
}

// Equal-width bins over the finite values as (lower, upper, count).
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for v in finite {
        let k = (((v - min) / width) as usize).min(bins - 1);
        counts[k] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(k, n)| (min + k as f64 * width, min + (k + 1) as f64 * width, n))
        .collect()
}
