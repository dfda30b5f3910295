// Gaussian Naive Bayes behind a small fit/predict/predict_probability
// contract. The model plugs into linfa through `Fit` and `PredictInplace`,
// so it also works with `linfa::Dataset` and `Predict`.

use std::f64::consts::PI;

use linfa::DatasetBase;
use linfa::traits::{Fit, PredictInplace};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

use crate::error::{AnalysisError, Result};

const MIN_VARIANCE: f64 = 1e-12;

// A binary classifier that can be fitted on a feature matrix and labels in {0, 1}.
pub trait ProbabilisticClassifier {
    type Model: ProbabilisticModel;

    fn fit(&self, features: &Array2<f64>, labels: &[usize]) -> Result<Self::Model>;
}

pub trait ProbabilisticModel {
    fn predict(&self, features: &Array2<f64>) -> Vec<usize>;

    // Probability of label 1 for every row.
    fn predict_probability(&self, features: &Array2<f64>) -> Vec<f64>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianNbParams {
    var_smoothing: f64,
}

impl Default for GaussianNbParams {
    fn default() -> Self {
        Self { var_smoothing: 1e-9 }
    }
}

impl GaussianNbParams {
    // Share of the largest feature variance added to every variance.
    pub fn var_smoothing(mut self, var_smoothing: f64) -> Self {
        self.var_smoothing = var_smoothing;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianNb {
    // Indexed by class label.
    log_priors: Array1<f64>,
    means: Array2<f64>,
    variances: Array2<f64>,
}

impl GaussianNb {
    pub fn params() -> GaussianNbParams {
        GaussianNbParams::default()
    }

    pub fn priors(&self) -> Array1<f64> {
        self.log_priors.mapv(f64::exp)
    }

    pub fn means(&self) -> &Array2<f64> {
        &self.means
    }

    pub fn variances(&self) -> &Array2<f64> {
        &self.variances
    }

    fn joint_log_likelihood(&self, row: ArrayView1<f64>) -> [f64; 2] {
        let mut jll = [0.0; 2];
        for (class, value) in jll.iter_mut().enumerate() {
            let means = self.means.row(class);
            let variances = self.variances.row(class);
            let log_likelihood: f64 = row
                .iter()
                .zip(means.iter())
                .zip(variances.iter())
                .map(|((&x, &mean), &var)| {
                    -0.5 * ((2.0 * PI * var).ln() + (x - mean).powi(2) / var)
                })
                .sum();
            *value = self.log_priors[class] + log_likelihood;
        }
        jll
    }
}

impl Fit<Array2<f64>, Array1<usize>, AnalysisError> for GaussianNbParams {
    type Object = GaussianNb;

    fn fit(&self, dataset: &DatasetBase<Array2<f64>, Array1<usize>>) -> Result<GaussianNb> {
        let x = dataset.records();
        let y = dataset.targets();
        if x.nrows() != y.len() {
            return Err(AnalysisError::LengthMismatch { expected: x.nrows(), found: y.len() });
        }

        if let Some(((row, col), &value)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::InvalidValue {
                column: format!("feature {col}"),
                row,
                value,
            });
        }

        let mut members: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (row, &label) in y.iter().enumerate() {
            match label {
                0 | 1 => members[label].push(row),
                other => {
                    return Err(AnalysisError::InvalidTarget {
                        column: "labels".to_string(),
                        row,
                        value: other.to_string(),
                    })
                }
            }
        }
        if let Some(class) = members.iter().position(|m| m.is_empty()) {
            return Err(AnalysisError::NotEnoughSamples(format!(
                "no training rows of class {class}"
            )));
        }

        let n_features = x.ncols();
        let max_variance = x
            .var_axis(Axis(0), 0.0)
            .iter()
            .cloned()
            .fold(0.0, f64::max);
        let epsilon = (self.var_smoothing * max_variance).max(MIN_VARIANCE);

        let n_samples = x.nrows() as f64;
        let mut log_priors = Array1::zeros(2);
        let mut means = Array2::zeros((2, n_features));
        let mut variances = Array2::zeros((2, n_features));
        for (class, rows) in members.iter().enumerate() {
            let subset = x.select(Axis(0), rows);
            log_priors[class] = (rows.len() as f64 / n_samples).ln();
            if n_features > 0 {
                let class_means = subset
                    .mean_axis(Axis(0))
                    .unwrap_or_else(|| Array1::zeros(n_features));
                means.row_mut(class).assign(&class_means);
                variances
                    .row_mut(class)
                    .assign(&subset.var_axis(Axis(0), 0.0).mapv(|v| v + epsilon));
            }
            debug!(class, rows = rows.len(), "fitted class statistics");
        }

        Ok(GaussianNb { log_priors, means, variances })
    }
}

impl PredictInplace<Array2<f64>, Array1<usize>> for GaussianNb {
    fn predict_inplace<'a>(&'a self, x: &'a Array2<f64>, y: &mut Array1<usize>) {
        assert_eq!(x.nrows(), y.len(), "number of rows and targets must match");
        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            let jll = self.joint_log_likelihood(row);
            *target = usize::from(jll[1] > jll[0]);
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl ProbabilisticClassifier for GaussianNbParams {
    type Model = GaussianNb;

    fn fit(&self, features: &Array2<f64>, labels: &[usize]) -> Result<GaussianNb> {
        let dataset = DatasetBase::new(features.clone(), Array1::from(labels.to_vec()));
        Fit::fit(self, &dataset)
    }
}

impl ProbabilisticModel for GaussianNb {
    fn predict(&self, features: &Array2<f64>) -> Vec<usize> {
        let mut labels = self.default_target(features);
        self.predict_inplace(features, &mut labels);
        labels.to_vec()
    }

    fn predict_probability(&self, features: &Array2<f64>) -> Vec<f64> {
        features
            .rows()
            .into_iter()
            .map(|row| {
                let [a, b] = self.joint_log_likelihood(row);
                let max = a.max(b);
                let log_norm = max + ((a - max).exp() + (b - max).exp()).ln();
                (b - log_norm).exp()
            })
            .collect()
    }
}
