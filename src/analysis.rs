// The analysis as an explicit sequence of named stages. Each stage takes the
// configuration and the previous stage's output and returns a new value;
// nothing is shared between stages except what is passed along.

use std::path::PathBuf;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::csv_reader::read_table;
use crate::error::Result;
use crate::explore::{explore, Exploration};
use crate::features::FeatureEngineer;
use crate::metrics::{evaluate, Evaluation};
use crate::naive_bayes::{GaussianNb, ProbabilisticClassifier, ProbabilisticModel};
use crate::report;
use crate::schema::{inspect, validate_required, Schema};
use crate::split::{positive_rate, stratified_split};
use crate::table::Table;
use crate::transform::{build_pipeline, FittedPipeline};

// Train and test partitions of the loaded table.
#[derive(Debug, Clone)]
pub struct Partitions {
    pub train: Table,
    pub test: Table,
    pub train_labels: Vec<usize>,
    pub test_labels: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Engineered {
    pub train: Table,
    pub test: Table,
    pub schema: Schema,
}

#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub pipeline: FittedPipeline,
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub exploration: Exploration,
    pub feature_names: Vec<String>,
    pub evaluation: Evaluation,
    pub charts: Vec<PathBuf>,
}

pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self) -> Result<AnalysisOutcome> {
        let table = load(&self.config)?;
        self.run_on(&table)
    }

    // Every stage after loading, on an already validated table.
    pub fn run_on(&self, table: &Table) -> Result<AnalysisOutcome> {
        let config = &self.config;
        let schema = describe(config, table)?;
        let partitions = split(config, table)?;
        let exploration = explore_table(config, table)?;
        let engineered = engineer(config, &partitions, &schema)?;
        let preprocessed = preprocess(config, &engineered)?;
        let model = train(config, &preprocessed.x_train, &partitions.train_labels)?;
        let evaluation = assess(&model, &preprocessed.x_test, &partitions.test_labels)?;
        let charts = visualize(config, table, &exploration, &evaluation)?;

        Ok(AnalysisOutcome {
            exploration,
            feature_names: preprocessed.pipeline.feature_names(),
            evaluation,
            charts,
        })
    }
}

pub fn load(config: &AnalysisConfig) -> Result<Table> {
    info!(path = %config.data_path.display(), "stage: load");
    let table = read_table(&config.data_path)?;
    validate_required(&table, config)?;
    Ok(table)
}

pub fn describe(config: &AnalysisConfig, table: &Table) -> Result<Schema> {
    info!("stage: describe");
    let schema = inspect(table, &config.target_column)?;
    report::print_schema_summary(table, &schema, config.preview_rows);
    Ok(schema)
}

pub fn split(config: &AnalysisConfig, table: &Table) -> Result<Partitions> {
    info!(test_fraction = config.test_fraction, seed = config.random_seed, "stage: split");
    let labels = table.labels(&config.target_column)?;
    let split = stratified_split(&labels, config.test_fraction, config.random_seed)?;

    report::print_split_summary(
        split.train().len(),
        split.test().len(),
        positive_rate(&labels, split.train()),
        positive_rate(&labels, split.test()),
    );

    Ok(Partitions {
        train: table.take(split.train()),
        test: table.take(split.test()),
        train_labels: split.train().iter().map(|&i| labels[i]).collect(),
        test_labels: split.test().iter().map(|&i| labels[i]).collect(),
    })
}

pub fn explore_table(config: &AnalysisConfig, table: &Table) -> Result<Exploration> {
    info!("stage: explore");
    let exploration = explore(table, &config.target_column)?;
    report::print_exploration(&exploration, &config.target_column);
    Ok(exploration)
}

pub fn engineer(
    config: &AnalysisConfig,
    partitions: &Partitions,
    schema: &Schema,
) -> Result<Engineered> {
    info!("stage: engineer features");
    let engineer = FeatureEngineer::from_config(config, &partitions.train);
    if let Some(time) = &config.time_column {
        if engineer.time_column().is_none() {
            warn!(column = %time, "time column absent, skipping hour derivation");
        }
    }
    Ok(Engineered {
        train: engineer.engineer(&partitions.train)?,
        test: engineer.engineer(&partitions.test)?,
        schema: engineer.engineer_schema(schema),
    })
}

// The pipeline only sees schema features, so the target and the raw time axis
// never reach the model.
pub fn preprocess(config: &AnalysisConfig, engineered: &Engineered) -> Result<Preprocessed> {
    info!("stage: preprocess");
    let features = engineered.schema.feature_names();
    let train = engineered.train.select(features.as_slice())?;
    let test = engineered.test.select(features.as_slice())?;

    let numeric = engineered.schema.numeric();
    let categorical = engineered.schema.categorical();
    let pipeline = build_pipeline(&numeric, &categorical, config.unknown_category, config.remainder)
        .fit(&train)?;
    let x_train = pipeline.apply(&train)?;
    let x_test = pipeline.apply(&test)?;
    report::print_feature_summary(&pipeline);

    Ok(Preprocessed { pipeline, x_train, x_test })
}

pub fn train(
    config: &AnalysisConfig,
    x_train: &Array2<f64>,
    y_train: &[usize],
) -> Result<GaussianNb> {
    info!(rows = x_train.nrows(), features = x_train.ncols(), "stage: train");
    let model = GaussianNb::params()
        .var_smoothing(config.var_smoothing)
        .fit(x_train, y_train)?;
    let priors = model.priors();
    debug!(
        prior_legitimate = priors[0],
        prior_fraud = priors[1],
        means = ?model.means().dim(),
        variances = ?model.variances().dim(),
        "fitted Gaussian Naive Bayes"
    );
    Ok(model)
}

pub fn assess<M: ProbabilisticModel>(
    model: &M,
    x_test: &Array2<f64>,
    y_test: &[usize],
) -> Result<Evaluation> {
    info!(rows = x_test.nrows(), "stage: evaluate");
    let predicted = model.predict(x_test);
    let probabilities = model.predict_probability(x_test);
    let evaluation = evaluate(y_test, &predicted, &probabilities)?;
    report::print_evaluation(&evaluation);
    Ok(evaluation)
}

#[cfg(feature = "charts")]
pub fn visualize(
    config: &AnalysisConfig,
    table: &Table,
    exploration: &Exploration,
    evaluation: &Evaluation,
) -> Result<Vec<PathBuf>> {
    info!(dir = %config.chart_dir.display(), "stage: visualize");
    crate::charts::render_all(
        &config.chart_dir,
        exploration.class_counts,
        table.numeric(&config.amount_column)?,
        &exploration.correlation,
        &evaluation.confusion,
        &evaluation.roc,
        evaluation.auc,
    )
}

#[cfg(not(feature = "charts"))]
pub fn visualize(
    _config: &AnalysisConfig,
    _table: &Table,
    _exploration: &Exploration,
    _evaluation: &Evaluation,
) -> Result<Vec<PathBuf>> {
    warn!("built without the `charts` feature, skipping charts");
    Ok(Vec::new())
}
