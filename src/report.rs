// Console output for each stage of the analysis.
use crate::explore::Exploration;
use crate::metrics::Evaluation;
use crate::schema::Schema;
use crate::transform::{FittedPipeline, FittedStep};
use crate::table::Table;

const TOP_CORRELATIONS: usize = 10;

// Prints shape, column kinds and the first rows of the loaded table
pub fn print_schema_summary(table: &Table, schema: &Schema, preview_rows: usize) {
    println!("\nDataset Summary:");
    println!("Rows: {}  Columns: {}", table.n_rows(), table.n_columns());
    println!("Target: {}", schema.target);

    println!("\nColumns:");
    for descriptor in schema.features() {
        println!("  {:<28} {}", descriptor.name, descriptor.kind);
    }

    let n = preview_rows.min(table.n_rows());
    if n == 0 {
        return;
    }
    println!("\nFirst {} rows:", n);
    println!("{}", table.column_names().join(" | "));
    for row in 0..n {
        let cells: Vec<String> =
            table.columns().iter().map(|c| c.data.display_value(row)).collect();
        println!("{}", cells.join(" | "));
    }
}

// Prints missing values, describe table, class balance and the features most
// correlated with the target
pub fn print_exploration(exploration: &Exploration, target: &str) {
    let missing: Vec<&(String, usize)> =
        exploration.missing.iter().filter(|(_, n)| *n > 0).collect();
    println!("\nMissing Values:");
    if missing.is_empty() {
        println!("  none");
    }
    for (column, n) in missing {
        println!("  {:<28} {}", column, n);
    }

    println!("\nNumeric Columns:");
    println!(
        "  {:<28} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for s in &exploration.describe {
        println!(
            "  {:<28} {:>8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            s.column, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
        );
    }

    println!("\nClass Distribution:");
    println!("  Legitimate (0): {}", exploration.class_counts[0]);
    println!("  Fraudulent (1): {}", exploration.class_counts[1]);
    println!("  Fraud Rate: {:.2}%", exploration.fraud_rate() * 100.0);

    println!("\nCorrelation with {}:", target);
    let ranked = exploration.correlation.ranked_against(target);
    for (column, r) in ranked.iter().take(TOP_CORRELATIONS) {
        println!("  {:<28} {:>8.4}", column, r);
    }
}

pub fn print_split_summary(train_rows: usize, test_rows: usize, train_rate: f64, test_rate: f64) {
    println!("\nTrain/Test Split:");
    println!("  Train: {} rows (fraud {:.2}%)", train_rows, train_rate * 100.0);
    println!("  Test:  {} rows (fraud {:.2}%)", test_rows, test_rate * 100.0);
}

// Prints the fitted preprocessing steps and the resulting model inputs
pub fn print_feature_summary(pipeline: &FittedPipeline) {
    println!("\nPreprocessing:");
    for step in pipeline.steps() {
        match step {
            FittedStep::Standardize(params) => {
                println!("  standardize  {} columns", params.len());
            }
            FittedStep::OneHot { vocabularies, .. } => {
                for v in vocabularies {
                    println!("  one-hot      {} ({} categories)", v.column, v.categories.len());
                }
            }
            FittedStep::Passthrough(columns) => {
                println!("  passthrough  {}", columns.join(", "));
            }
        }
    }

    let names = pipeline.feature_names();
    println!("\nModel Inputs ({} columns):", names.len());
    println!("  {}", names.join(", "));
}

pub fn print_evaluation(evaluation: &Evaluation) {
    println!("\nClassification Report:");
    print!("{}", evaluation.report);
    println!("\nConfusion Matrix:");
    println!("{}", evaluation.confusion);
    let c = &evaluation.confusion;
    println!(
        "  TN: {}  FP: {}  FN: {}  TP: {}",
        c.true_negatives(),
        c.false_positives(),
        c.false_negatives(),
        c.true_positives()
    );
    println!("\nROC AUC: {:.4}", evaluation.auc);
}
