// Binary classification metrics: confusion matrix, per-class report, ROC/AUC.
use std::fmt;

use crate::error::{AnalysisError, Result};

// Rows are actual labels, columns predicted labels, both ordered [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>12} {:>12}", "", "pred 0", "pred 1")?;
        writeln!(f, "{:>12} {:>12} {:>12}", "actual 0", self.counts[0][0], self.counts[0][1])?;
        write!(f, "{:>12} {:>12} {:>12}", "actual 1", self.counts[1][0], self.counts[1][1])
    }
}

pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize]) -> Result<ConfusionMatrix> {
    check_lengths(y_true.len(), y_pred.len())?;
    let mut counts = [[0usize; 2]; 2];
    for (row, (&actual, &predicted)) in y_true.iter().zip(y_pred).enumerate() {
        let actual = binary(actual, row)?;
        let predicted = binary(predicted, row)?;
        counts[actual][predicted] += 1;
    }
    Ok(ConfusionMatrix { counts })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    // Indexed by class label.
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    // Zero denominators give 0 instead of NaN.
    pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
        let c = &matrix.counts;
        let class_metrics = |class: usize| {
            let other = 1 - class;
            let tp = c[class][class] as f64;
            let fp = c[other][class] as f64;
            let fn_ = c[class][other] as f64;
            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            ClassMetrics {
                precision,
                recall,
                f1: ratio(2.0 * precision * recall, precision + recall),
                support: c[class][0] + c[class][1],
            }
        };
        let classes = [class_metrics(0), class_metrics(1)];

        let total = matrix.total();
        let accuracy = ratio((c[0][0] + c[1][1]) as f64, total as f64);
        let average = |weight: &dyn Fn(&ClassMetrics) -> f64| {
            let norm: f64 = classes.iter().map(weight).sum();
            let avg = |metric: fn(&ClassMetrics) -> f64| {
                ratio(classes.iter().map(|m| metric(m) * weight(m)).sum(), norm)
            };
            ClassMetrics {
                precision: avg(|m| m.precision),
                recall: avg(|m| m.recall),
                f1: avg(|m| m.f1),
                support: total,
            }
        };

        Self {
            macro_avg: average(&|_: &ClassMetrics| 1.0),
            weighted_avg: average(&|m: &ClassMetrics| m.support as f64),
            classes,
            accuracy,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (label, m) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub false_positive_rate: Vec<f64>,
    pub true_positive_rate: Vec<f64>,
    // Descending; the first point uses +inf so the curve starts at (0, 0).
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    // Trapezoidal area under the curve.
    pub fn auc(&self) -> f64 {
        self.false_positive_rate
            .windows(2)
            .zip(self.true_positive_rate.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
            .sum()
    }
}

// One point per distinct score, sweeping the threshold from high to low.
pub fn roc_curve(y_true: &[usize], scores: &[f64]) -> Result<RocCurve> {
    check_lengths(y_true.len(), scores.len())?;
    for (row, &label) in y_true.iter().enumerate() {
        binary(label, row)?;
    }
    let positives = y_true.iter().filter(|&&y| y == 1).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(AnalysisError::UndefinedMetric(
            "ROC curve needs both classes in the true labels".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];
    let (mut tp, mut fp) = (0usize, 0usize);
    for (k, &i) in order.iter().enumerate() {
        if y_true[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_score = order.get(k + 1).map_or(true, |&next| scores[next] != scores[i]);
        if last_of_score {
            fpr.push(fp as f64 / negatives as f64);
            tpr.push(tp as f64 / positives as f64);
            thresholds.push(scores[i]);
        }
    }

    Ok(RocCurve { false_positive_rate: fpr, true_positive_rate: tpr, thresholds })
}

// Everything reported about one set of predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
    pub roc: RocCurve,
    pub auc: f64,
}

pub fn evaluate(y_true: &[usize], y_pred: &[usize], probabilities: &[f64]) -> Result<Evaluation> {
    let confusion = confusion_matrix(y_true, y_pred)?;
    let report = ClassificationReport::from_confusion(&confusion);
    let roc = roc_curve(y_true, probabilities)?;
    let auc = roc.auc();
    Ok(Evaluation { confusion, report, roc, auc })
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn check_lengths(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(AnalysisError::LengthMismatch { expected, found });
    }
    Ok(())
}

fn binary(label: usize, row: usize) -> Result<usize> {
    if label > 1 {
        return Err(AnalysisError::InvalidTarget {
            column: "labels".to_string(),
            row,
            value: label.to_string(),
        });
    }
    Ok(label)
}
