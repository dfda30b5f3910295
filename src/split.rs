use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{AnalysisError, Result};

// Disjoint train/test row indices, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl Split {
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    pub fn test(&self) -> &[usize] {
        &self.test
    }
}

// Shuffles each class separately and moves round(n * test_fraction) of its rows
// to the test side, keeping at least one row of each class on both sides.
pub fn stratified_split(labels: &[usize], test_fraction: f64, seed: u64) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AnalysisError::Config(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (row, &label) in labels.iter().enumerate() {
        match label {
            0 | 1 => by_class[label].push(row),
            other => {
                return Err(AnalysisError::InvalidTarget {
                    column: "labels".to_string(),
                    row,
                    value: other.to_string(),
                })
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (class, rows) in by_class.iter_mut().enumerate() {
        let n = rows.len();
        if n < 2 {
            return Err(AnalysisError::NotEnoughSamples(format!(
                "class {class} has {n} rows, a stratified split needs at least 2"
            )));
        }
        let n_test = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
        debug!(class, rows = n, test_rows = n_test, "stratified class");
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

// Share of label 1 among the given rows.
pub fn positive_rate(labels: &[usize], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().filter(|&&i| labels[i] == 1).count() as f64 / rows.len() as f64
}
