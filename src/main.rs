// Main module for credit card fraud analysis. Loads the transactions, explores them,
// engineers features, trains a Gaussian Naive Bayes baseline and reports its metrics.
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use analysis::AnalysisPipeline;
use config::{AnalysisConfig, CONFIG_FILE_PATH};

//imports the analysis stage modules
mod analysis;
#[cfg(feature = "charts")]
mod charts;
mod config;
mod csv_reader;
mod error;
mod explore;
mod features;
mod metrics;
mod naive_bayes;
mod report;
mod schema;
mod split;
mod table;
mod transform;
//test module
#[cfg(test)]
mod tests;

fn init_tracing(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }
}

// Main entry point for the fraud analysis
// Key steps:
// 1. Load configuration (fraud_analysis.toml if present)
// 2. Run the staged analysis
// 3. Report fatal errors and exit non-zero
fn main() -> ExitCode {
    let config = match AnalysisConfig::load(CONFIG_FILE_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_level());

    let pipeline = AnalysisPipeline::new(config);
    info!(data = %pipeline.config().data_path.display(), "starting fraud analysis");
    match pipeline.run() {
        Ok(outcome) => {
            info!(
                rows = outcome.exploration.n_rows,
                columns = outcome.exploration.n_columns,
                fraud_rate = outcome.exploration.fraud_rate(),
                auc = outcome.evaluation.auc,
                features = outcome.feature_names.len(),
                charts = outcome.charts.len(),
                "analysis finished"
            );
            for path in &outcome.charts {
                println!("Chart: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "analysis failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
