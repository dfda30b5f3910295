use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::table::{Column, Table};

#[cfg(test)]
fn numeric_table(columns: &[(&str, &[f64])]) -> Table {
    Table::new(
        columns
            .iter()
            .map(|(name, values)| Column::numeric(*name, values.to_vec()))
            .collect(),
    )
    .unwrap()
}

#[cfg(test)]
fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod table_tests {
    use super::*;

    #[test]
    fn test_with_column_rejects_duplicates_and_bad_lengths() {
        let table = numeric_table(&[("a", &[1.0, 2.0])]);
        assert!(matches!(
            table.with_column(Column::numeric("a", vec![0.0, 0.0])),
            Err(AnalysisError::DuplicateColumn(name)) if name == "a"
        ));
        assert!(matches!(
            table.with_column(Column::numeric("b", vec![0.0])),
            Err(AnalysisError::LengthMismatch { expected: 2, found: 1 })
        ));
        let extended = table.with_column(Column::numeric("b", vec![3.0, 4.0])).unwrap();
        assert_eq!(extended.column_names(), vec!["a", "b"]);
        assert_eq!(table.n_columns(), 1, "Original table must be left untouched");
    }

    #[test]
    fn test_take_and_select() {
        let table = numeric_table(&[("a", &[1.0, 2.0, 3.0]), ("b", &[4.0, 5.0, 6.0])]);
        let rows = table.take(&[2, 0]);
        assert_eq!(rows.numeric("a").unwrap(), &[3.0, 1.0]);
        let selected = table.select(&["b"]).unwrap();
        assert_eq!(selected.column_names(), vec!["b"]);
        assert!(matches!(table.select(&["zzz"]), Err(AnalysisError::ColumnNotFound(_))));
    }

    #[test]
    fn test_labels_must_be_binary() {
        let table = numeric_table(&[("Is Fraud", &[0.0, 1.0, 1.0])]);
        assert_eq!(table.labels("Is Fraud").unwrap(), vec![0, 1, 1]);

        let bad = numeric_table(&[("Is Fraud", &[0.0, 2.0])]);
        assert!(matches!(
            bad.labels("Is Fraud"),
            Err(AnalysisError::InvalidTarget { row: 1, .. })
        ));
        assert!(matches!(
            bad.labels("Class"),
            Err(AnalysisError::TargetColumnMissing(_))
        ));
    }
}

#[cfg(test)]
mod csv_reader_tests {
    use super::*;
    use crate::csv_reader::{read_table, read_table_from};
    use crate::table::FeatureKind;
    use std::io::Write;

    #[test]
    fn test_read_table_infers_column_kinds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Time,Transaction Amount,Merchant,Is Fraud").unwrap();
        writeln!(file, "0,12.5,grocery,0").unwrap();
        writeln!(file, "3700,,online,1").unwrap();

        let table = read_table(file.path()).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("Time").unwrap().kind(), FeatureKind::Numeric);
        assert_eq!(table.column("Merchant").unwrap().kind(), FeatureKind::Categorical);
        let amounts = table.numeric("Transaction Amount").unwrap();
        assert_eq!(amounts[0], 12.5);
        assert!(amounts[1].is_nan(), "Empty numeric cell should load as NaN");
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = read_table("definitely/not/here.csv");
        assert!(matches!(result, Err(AnalysisError::FileNotFound(_))));
    }

    #[test]
    fn test_mixed_column_is_categorical() {
        let table = read_table_from("code,x\n1,1\nA7,2\n".as_bytes()).unwrap();
        assert_eq!(table.column("code").unwrap().kind(), FeatureKind::Categorical);
        assert_eq!(table.column("x").unwrap().kind(), FeatureKind::Numeric);
    }
}

#[cfg(test)]
mod schema_tests {
    use super::*;
    use crate::schema::{inspect, validate_required};

    fn fraud_table() -> Table {
        numeric_table(&[
            ("Time", &[0.0, 10.0]),
            ("Transaction Amount", &[5.0, 7.0]),
            ("V1", &[0.1, 0.2]),
            ("V2", &[0.1, 0.2]),
            ("V3", &[0.1, 0.2]),
            ("V4", &[0.1, 0.2]),
            ("V5", &[0.1, 0.2]),
            ("Is Fraud", &[0.0, 1.0]),
        ])
        .with_column(Column::categorical("Merchant", strings(&["a", "b"])))
        .unwrap()
    }

    #[test]
    fn test_inspect_partitions_features() {
        let schema = inspect(&fraud_table(), "Is Fraud").unwrap();
        assert_eq!(schema.categorical(), vec!["Merchant"]);
        assert_eq!(schema.numeric().len(), 7);
        assert!(!schema.feature_names().contains(&"Is Fraud".to_string()));

        let updated = schema.without("Time").with_numeric("Hour");
        assert!(!updated.numeric().contains(&"Time".to_string()));
        assert_eq!(updated.numeric().last().map(String::as_str), Some("Hour"));
        assert_eq!(schema.numeric().len(), 7, "Schema updates return a new value");
    }

    #[test]
    fn test_inspect_requires_target() {
        assert!(matches!(
            inspect(&fraud_table(), "Class"),
            Err(AnalysisError::TargetColumnMissing(_))
        ));
    }

    #[test]
    fn test_validate_required_columns() {
        let config = AnalysisConfig::default();
        assert!(validate_required(&fraud_table(), &config).is_ok());

        let no_amount = fraud_table().without_column("Transaction Amount").unwrap();
        assert!(matches!(
            validate_required(&no_amount, &config),
            Err(AnalysisError::ColumnNotFound(name)) if name == "Transaction Amount"
        ));

        let no_time = fraud_table().without_column("Time").unwrap();
        assert!(validate_required(&no_time, &config).is_ok(), "Time column is optional");

        let mut categorical_v1 = config.clone();
        categorical_v1.interaction_columns = vec!["Merchant".to_string()];
        assert!(matches!(
            validate_required(&fraud_table(), &categorical_v1),
            Err(AnalysisError::TypeMismatch { .. })
        ));

        let empty = fraud_table().take(&[]);
        assert!(matches!(validate_required(&empty, &config), Err(AnalysisError::EmptyDataset)));
    }
}

#[cfg(test)]
mod split_tests {
    use super::*;
    use crate::split::{positive_rate, stratified_split};
    use proptest::prelude::*;

    fn labels(n0: usize, n1: usize) -> Vec<usize> {
        let mut labels = vec![0; n0];
        labels.extend(vec![1; n1]);
        labels
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let y = labels(90, 10);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.train().len() + split.test().len(), 100);
        assert!(split.train().iter().all(|i| !split.test().contains(i)));
        assert_eq!(split.test().len(), 20);
        assert_eq!(positive_rate(&y, split.test()), 0.1);
    }

    #[test]
    fn test_split_keeps_rate_within_one_percent() {
        let y = labels(9_830, 170);
        let split = stratified_split(&y, 0.2, 7).unwrap();
        let full = positive_rate(&y, &(0..y.len()).collect::<Vec<_>>());
        assert!((positive_rate(&y, split.train()) - full).abs() < 0.01);
        assert!((positive_rate(&y, split.test()) - full).abs() < 0.01);
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let y = labels(50, 50);
        assert_eq!(stratified_split(&y, 0.3, 1).unwrap(), stratified_split(&y, 0.3, 1).unwrap());
    }

    #[test]
    fn test_split_needs_two_rows_per_class() {
        let y = labels(10, 1);
        assert!(matches!(
            stratified_split(&y, 0.2, 0),
            Err(AnalysisError::NotEnoughSamples(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_split_preserves_class_proportion(
            n0 in 2usize..400,
            n1 in 2usize..400,
            fraction in 0.1f64..0.5,
            seed in any::<u64>(),
        ) {
            let y = labels(n0, n1);
            let split = stratified_split(&y, fraction, seed).unwrap();
            let full = n1 as f64 / (n0 + n1) as f64;
            let test_rate = positive_rate(&y, split.test());
            let train_rate = positive_rate(&y, split.train());
            prop_assert!((test_rate - full).abs() <= 3.0 / split.test().len() as f64);
            prop_assert!((train_rate - full).abs() <= 3.0 / split.train().len() as f64);
            prop_assert_eq!(split.train().len() + split.test().len(), n0 + n1);
        }
    }
}

#[cfg(test)]
mod features_tests {
    use super::*;
    use crate::features::{
        derive_interaction_features, derive_polynomial_features, derive_time_features,
        FeatureEngineer, HOUR_COLUMN,
    };
    use crate::schema::inspect;
    use proptest::prelude::*;

    #[test]
    fn test_hour_of_day() {
        let table = numeric_table(&[("Time", &[0.0, 3599.0, 3700.0, 86_399.0, 90_000.0])]);
        let out = derive_time_features(&table, "Time").unwrap();
        assert_eq!(out.numeric(HOUR_COLUMN).unwrap(), &[0.0, 0.0, 1.0, 23.0, 1.0]);
    }

    #[test]
    fn test_hour_rejects_negative_time() {
        let table = numeric_table(&[("Time", &[10.0, -1.0])]);
        assert!(matches!(
            derive_time_features(&table, "Time"),
            Err(AnalysisError::InvalidValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_polynomial_squares() {
        let table = numeric_table(&[("x", &[0.0, -3.0, 1.5])]);
        let out = derive_polynomial_features(&table, "x", 2).unwrap();
        assert_eq!(out.numeric("x^2").unwrap(), &[0.0, 9.0, 2.25]);
        assert_eq!(out.numeric("x").unwrap(), &[0.0, -3.0, 1.5], "Original column kept");

        let cubic = derive_polynomial_features(&table, "x", 3).unwrap();
        assert_eq!(cubic.numeric("x^3").unwrap(), &[0.0, -27.0, 3.375]);
    }

    #[test]
    fn test_derivations_fail_fast_on_missing_columns() {
        let table = numeric_table(&[("Amount", &[1.0])]);
        assert!(matches!(
            derive_interaction_features(&table, "Amount", &["V9"]),
            Err(AnalysisError::ColumnNotFound(name)) if name == "V9"
        ));
        assert!(matches!(
            derive_polynomial_features(&table, "Missing", 2),
            Err(AnalysisError::ColumnNotFound(_))
        ));
        assert!(matches!(
            derive_time_features(&table, "Time"),
            Err(AnalysisError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_derivations_reject_categorical_columns() {
        let table = numeric_table(&[("Amount", &[1.0, 2.0])])
            .with_column(Column::categorical("Merchant", strings(&["a", "b"])))
            .unwrap();
        assert!(matches!(
            derive_interaction_features(&table, "Amount", &["Merchant"]),
            Err(AnalysisError::TypeMismatch { .. })
        ));
        assert!(matches!(
            derive_polynomial_features(&table, "Merchant", 2),
            Err(AnalysisError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_end_to_end_engineering() {
        let table = numeric_table(&[
            ("Amount", &[100.0]),
            ("V1", &[2.0]),
            ("Time", &[3700.0]),
            ("Fraud", &[0.0]),
        ]);
        let engineer = FeatureEngineer::new(Some("Time".to_string()), "Amount", vec!["V1".to_string()], 2);
        let out = engineer.engineer(&table).unwrap();

        assert_eq!(out.numeric("Hour").unwrap(), &[1.0]);
        assert_eq!(out.numeric("Amount_x_V1").unwrap(), &[200.0]);
        assert_eq!(out.numeric("Amount^2").unwrap(), &[10_000.0]);
        assert!(!out.contains("Time"), "Hour replaces the raw time axis");

        let schema = engineer.engineer_schema(&inspect(&table, "Fraud").unwrap());
        assert_eq!(schema.numeric(), strings(&["Amount", "V1", "Hour", "Amount_x_V1", "Amount^2"]));
    }

    #[test]
    fn test_engineering_twice_is_a_duplicate() {
        let table = numeric_table(&[("Amount", &[1.0]), ("V1", &[2.0])]);
        let engineer = FeatureEngineer::new(None, "Amount", vec!["V1".to_string()], 2);
        let once = engineer.engineer(&table).unwrap();
        assert!(matches!(engineer.engineer(&once), Err(AnalysisError::DuplicateColumn(_))));
    }

    proptest! {
        #[test]
        fn prop_hour_in_range_and_daily_periodic(seconds in 0u32..2_000_000_000) {
            let t = seconds as f64;
            let table = numeric_table(&[("Time", &[t, t + 86_400.0])]);
            let out = derive_time_features(&table, "Time").unwrap();
            let hours = out.numeric(HOUR_COLUMN).unwrap();
            prop_assert!((0.0..=23.0).contains(&hours[0]));
            prop_assert_eq!(hours[0].fract(), 0.0);
            prop_assert_eq!(hours[0], hours[1]);
        }

        #[test]
        fn prop_square_matches_product(v in -1.0e6f64..1.0e6) {
            let table = numeric_table(&[("x", &[v])]);
            let out = derive_polynomial_features(&table, "x", 2).unwrap();
            prop_assert_eq!(out.numeric("x^2").unwrap()[0], v * v);
        }
    }
}

#[cfg(test)]
mod transform_tests {
    use super::*;
    use crate::csv_reader::read_table_from;
    use crate::transform::{
        build_pipeline, FittedStep, Pipeline, Remainder, Transform, UnknownCategory,
    };

    fn standard(numeric: &[&str], categorical: &[&str]) -> Pipeline {
        build_pipeline(
            &strings(numeric),
            &strings(categorical),
            UnknownCategory::Ignore,
            Remainder::Passthrough,
        )
    }

    fn mixed_table(amounts: &[f64], merchants: &[&str]) -> Table {
        numeric_table(&[("Amount", amounts)])
            .with_column(Column::categorical("Merchant", strings(merchants)))
            .unwrap()
    }

    #[test]
    fn test_standardized_train_has_zero_mean_unit_std() {
        let train = mixed_table(&[10.0, 20.0, 30.0, 45.0, 95.0], &["a", "b", "a", "c", "b"]);
        let fitted = standard(&["Amount"], &["Merchant"])
            .fit(&train)
            .unwrap();
        let x = fitted.apply(&train).unwrap();
        let column = x.column(0);
        let n = column.len() as f64;
        let mean = column.sum() / n;
        let std = (column.mapv(|v| (v - mean).powi(2)).sum() / n).sqrt();
        assert!(mean.abs() < 1e-12, "mean was {mean}");
        assert!((std - 1.0).abs() < 1e-12, "std was {std}");
    }

    #[test]
    fn test_one_hot_layout_and_unseen_categories() {
        let train = mixed_table(&[1.0, 2.0, 3.0], &["online", "grocery", "online"]);
        let test = mixed_table(&[1.0, 2.0], &["travel", "grocery"]);
        let fitted = standard(&["Amount"], &["Merchant"])
            .fit(&train)
            .unwrap();
        assert_eq!(
            fitted.feature_names(),
            strings(&["Amount", "Merchant_grocery", "Merchant_online"])
        );

        let x = fitted.apply(&test).unwrap();
        assert_eq!(x.row(0).to_vec()[1..], [0.0, 0.0], "Unseen category is all zeros");
        assert_eq!(x.row(1).to_vec()[1..], [1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_can_be_an_error() {
        let train = mixed_table(&[1.0], &["a"]);
        let test = mixed_table(&[1.0], &["b"]);
        let fitted = build_pipeline(
            &[],
            &strings(&["Merchant"]),
            UnknownCategory::Error,
            Remainder::Drop,
        )
        .fit(&train)
        .unwrap();
        assert_eq!(fitted.feature_names(), strings(&["Merchant_a"]));
        assert!(matches!(
            fitted.apply(&test),
            Err(AnalysisError::UnknownCategory { value, .. }) if value == "b"
        ));
    }

    #[test]
    fn test_apply_is_repeatable_and_read_only() {
        let train = mixed_table(&[1.0, 5.0, 9.0], &["a", "b", "a"]);
        let test = mixed_table(&[100.0, -4.0], &["b", "z"]);
        let fitted = standard(&["Amount"], &["Merchant"])
            .fit(&train)
            .unwrap();
        let before = fitted.clone();

        let first = fitted.apply(&test).unwrap();
        let second = fitted.apply(&test).unwrap();
        assert_eq!(first, second);
        assert_eq!(fitted, before);
    }

    #[test]
    fn test_statistics_come_from_fit_table_only() {
        let train = numeric_table(&[("Amount", &[0.0, 2.0])]);
        let test = numeric_table(&[("Amount", &[1000.0, 3000.0])]);
        let fitted = standard(&["Amount"], &[]).fit(&train).unwrap();

        match &fitted.steps()[0] {
            FittedStep::Standardize(params) => {
                assert_eq!(params[0].mean, 1.0);
                assert_eq!(params[0].scale, 1.0);
            }
            other => panic!("unexpected step {other:?}"),
        }
        let x = fitted.apply(&test).unwrap();
        assert_eq!(x.column(0).to_vec(), vec![999.0, 2999.0]);
    }

    #[test]
    fn test_zero_variance_column_is_only_centred() {
        let train = numeric_table(&[("flat", &[4.0, 4.0, 4.0])]);
        let fitted = standard(&["flat"], &[]).fit(&train).unwrap();
        let x = fitted.apply(&numeric_table(&[("flat", &[4.0, 6.0])])).unwrap();
        assert_eq!(x.column(0).to_vec(), vec![0.0, 2.0]);
    }

    #[test]
    fn test_missing_values_land_on_the_mean() {
        let train = numeric_table(&[("Amount", &[1.0, f64::NAN, 3.0])]);
        let fitted = standard(&["Amount"], &[]).fit(&train).unwrap();
        let x = fitted.apply(&train).unwrap();
        assert_eq!(x.column(0).to_vec(), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_remainder_passthrough_and_drop() {
        let table = numeric_table(&[("Amount", &[1.0, 3.0]), ("raw", &[7.0, 8.0])]);
        let fitted = standard(&["Amount"], &[]).fit(&table).unwrap();
        assert_eq!(fitted.feature_names(), strings(&["Amount", "raw"]));
        assert_eq!(fitted.apply(&table).unwrap().column(1).to_vec(), vec![7.0, 8.0]);

        let dropped = Pipeline::new(Remainder::Drop)
            .with_step(strings(&["Amount"]), Transform::Standardize)
            .fit(&table)
            .unwrap();
        assert_eq!(dropped.n_outputs(), 1);

        let with_text = mixed_table(&[1.0, 2.0], &["a", "b"]);
        assert!(matches!(
            standard(&["Amount"], &[]).fit(&with_text),
            Err(AnalysisError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_column_claimed_twice_is_rejected() {
        let table = numeric_table(&[("Amount", &[1.0, 3.0])]);
        let pipeline = Pipeline::new(Remainder::Drop)
            .with_step(strings(&["Amount"]), Transform::Standardize)
            .with_step(strings(&["Amount"]), Transform::Standardize);
        assert!(matches!(pipeline.fit(&table), Err(AnalysisError::DuplicateColumn(_))));

        let unknown = Pipeline::new(Remainder::Drop)
            .with_step(strings(&["Balance"]), Transform::Standardize);
        assert!(matches!(unknown.fit(&table), Err(AnalysisError::ColumnNotFound(_))));
    }

    #[test]
    fn test_infinite_cells_are_treated_as_missing() {
        let table =
            read_table_from("Transaction Amount,Is Fraud\n10,0\ninf,1\n30,0\n-inf,1\n".as_bytes())
                .unwrap();
        let amounts = table.select(&["Transaction Amount"]).unwrap();
        let fitted = standard(&["Transaction Amount"], &[]).fit(&amounts).unwrap();

        match &fitted.steps()[0] {
            FittedStep::Standardize(params) => {
                assert_eq!(params[0].mean, 20.0, "Fit statistics skip infinite cells");
                assert_eq!(params[0].scale, 10.0);
            }
            other => panic!("unexpected step {other:?}"),
        }
        let x = fitted.apply(&amounts).unwrap();
        assert!(x.iter().all(|v| v.is_finite()), "model inputs must be finite: {x:?}");
        assert_eq!(x.column(0).to_vec(), vec![-1.0, 0.0, 1.0, 0.0]);
    }
}

#[cfg(test)]
mod naive_bayes_tests {
    use super::*;
    use crate::naive_bayes::{GaussianNb, ProbabilisticClassifier, ProbabilisticModel};
    use ndarray::array;

    #[test]
    fn test_separable_classes() {
        let x = array![[0.0, 1.0], [0.2, 1.1], [0.1, 0.9], [5.0, -1.0], [5.2, -1.1], [4.9, -0.9]];
        let y = [0, 0, 0, 1, 1, 1];
        let model = GaussianNb::params().fit(&x, &y).unwrap();

        let queries = array![[0.1, 1.0], [5.1, -1.0]];
        assert_eq!(model.predict(&queries), vec![0, 1]);
        let probabilities = model.predict_probability(&queries);
        assert!(probabilities[0] < 0.01);
        assert!(probabilities[1] > 0.99);
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));

        let priors = model.priors();
        assert!((priors[0] - 0.5).abs() < 1e-12);
        assert_eq!(model.means().dim(), (2, 2));
        assert!(model.variances().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_fit_requires_both_classes() {
        let x = array![[0.0], [1.0]];
        assert!(matches!(
            GaussianNb::params().fit(&x, &[0, 0]),
            Err(AnalysisError::NotEnoughSamples(_))
        ));
        assert!(matches!(
            GaussianNb::params().fit(&x, &[0]),
            Err(AnalysisError::LengthMismatch { .. })
        ));
        assert!(matches!(
            GaussianNb::params().fit(&x, &[0, 3]),
            Err(AnalysisError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_fit_rejects_non_finite_features() {
        let x = array![[0.0], [f64::NAN], [1.0]];
        assert!(matches!(
            GaussianNb::params().fit(&x, &[0, 1, 1]),
            Err(AnalysisError::InvalidValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_constant_feature_does_not_break_fit() {
        let x = array![[1.0, 0.0], [1.0, 0.1], [1.0, 3.0], [1.0, 3.1]];
        let model = GaussianNb::params().var_smoothing(0.0).fit(&x, &[0, 0, 1, 1]).unwrap();
        let probabilities = model.predict_probability(&x);
        assert!(probabilities.iter().all(|p| p.is_finite()));
        assert_eq!(model.predict(&x), vec![0, 0, 1, 1]);
    }
}

#[cfg(test)]
mod linfa_integration_tests {
    use crate::naive_bayes::GaussianNb;
    use linfa::traits::{Fit, Predict};
    use linfa::DatasetBase;
    use ndarray::{array, Array1};

    #[test]
    fn test_model_through_linfa_traits() {
        let records = array![[0.0], [0.3], [4.0], [4.3]];
        let dataset = DatasetBase::new(records.clone(), array![0usize, 0, 1, 1]);
        let model = GaussianNb::params().fit(&dataset).unwrap();
        let predicted: Array1<usize> = model.predict(&records);
        assert_eq!(predicted, array![0, 0, 1, 1]);
    }
}

#[cfg(test)]
mod metrics_tests {
    use super::*;
    use crate::metrics::{confusion_matrix, evaluate, roc_curve, ClassificationReport};

    #[test]
    fn test_confusion_matrix_layout() {
        let matrix = confusion_matrix(&[0, 0, 1, 1], &[0, 1, 1, 1]).unwrap();
        assert_eq!(matrix.counts, [[1, 1], [0, 2]]);
        assert_eq!(matrix.true_negatives(), 1);
        assert_eq!(matrix.false_positives(), 1);
        assert_eq!(matrix.false_negatives(), 0);
        assert_eq!(matrix.true_positives(), 2);
        assert_eq!(matrix.total(), 4);
    }

    #[test]
    fn test_classification_report() {
        let matrix = confusion_matrix(&[0, 0, 1, 1], &[0, 1, 1, 1]).unwrap();
        let report = ClassificationReport::from_confusion(&matrix);
        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;

        assert!(close(report.classes[0].precision, 1.0));
        assert!(close(report.classes[0].recall, 0.5));
        assert!(close(report.classes[0].f1, 2.0 / 3.0));
        assert!(close(report.classes[1].precision, 2.0 / 3.0));
        assert!(close(report.classes[1].recall, 1.0));
        assert!(close(report.classes[1].f1, 0.8));
        assert!(close(report.accuracy, 0.75));
        assert!(close(report.macro_avg.precision, 5.0 / 6.0));
        assert_eq!(report.classes[1].support, 2);
        assert!(report.to_string().contains("weighted avg"));
    }

    #[test]
    fn test_report_with_no_predicted_positives() {
        let matrix = confusion_matrix(&[0, 1], &[0, 0]).unwrap();
        let report = ClassificationReport::from_confusion(&matrix);
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
    }

    #[test]
    fn test_roc_curve_and_auc() {
        let roc = roc_curve(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert_eq!(roc.false_positive_rate, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(roc.true_positive_rate, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(roc.thresholds[0], f64::INFINITY);
        assert!((roc.auc() - 0.75).abs() < 1e-12);

        let perfect = roc_curve(&[0, 1, 0, 1], &[0.1, 0.9, 0.2, 0.8]).unwrap();
        assert_eq!(perfect.auc(), 1.0);
    }

    #[test]
    fn test_roc_groups_tied_scores() {
        let roc = roc_curve(&[0, 1], &[0.5, 0.5]).unwrap();
        assert_eq!(roc.thresholds, vec![f64::INFINITY, 0.5]);
        assert_eq!(roc.auc(), 0.5);
    }

    #[test]
    fn test_metric_errors() {
        assert!(matches!(
            roc_curve(&[1, 1], &[0.2, 0.3]),
            Err(AnalysisError::UndefinedMetric(_))
        ));
        assert!(matches!(
            confusion_matrix(&[0, 1], &[0]),
            Err(AnalysisError::LengthMismatch { .. })
        ));
        assert!(matches!(
            confusion_matrix(&[0, 2], &[0, 1]),
            Err(AnalysisError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_evaluate_bundles_metrics() {
        let evaluation = evaluate(&[0, 0, 1, 1], &[0, 1, 1, 1], &[0.1, 0.6, 0.7, 0.9]).unwrap();
        assert_eq!(evaluation.confusion.counts, [[1, 1], [0, 2]]);
        assert_eq!(evaluation.auc, 1.0);
        assert_eq!(evaluation.auc, evaluation.roc.auc());
    }
}

#[cfg(test)]
mod explore_tests {
    use super::*;
    use crate::explore::{explore, histogram, pearson, quantile, ColumnStats};

    #[test]
    fn test_column_stats() {
        let stats = ColumnStats::compute("x", &[4.0, 1.0, f64::NAN, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!((stats.min, stats.max), (1.0, 4.0));
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_pearson() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, f64::NAN], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0], (0.0, 2.0, 2));
        assert_eq!(bins[1], (2.0, 4.0, 3));
    }

    #[test]
    fn test_explore_summary() {
        let table = numeric_table(&[
            ("Amount", &[10.0, f64::NAN, 30.0, 40.0]),
            ("Is Fraud", &[0.0, 0.0, 1.0, 1.0]),
        ]);
        let exploration = explore(&table, "Is Fraud").unwrap();
        assert_eq!(exploration.class_counts, [2, 2]);
        assert_eq!(exploration.fraud_rate(), 0.5);
        assert_eq!(exploration.missing[0], ("Amount".to_string(), 1));
        assert_eq!(exploration.describe.len(), 2);

        let ranked = exploration.correlation.ranked_against("Is Fraud");
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].1 > 0.8);
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.target_column, "Is Fraud");
        assert_eq!(config.interaction_columns, vec!["V1", "V2", "V3", "V4", "V5"]);
        assert_eq!(config.polynomial_degree, 2);
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml(
            r#"
            target_column = "Class"
            time_column = "Seconds"
            interaction_columns = ["V1"]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.target_column, "Class");
        assert_eq!(config.time_column.as_deref(), Some("Seconds"));
        assert_eq!(config.interaction_columns, vec!["V1"]);
        assert_eq!(config.amount_column, "Transaction Amount");
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml("test_fraction = 1.5"),
            Err(AnalysisError::Config(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("polynomial_degree = \"two\""),
            Err(AnalysisError::Config(_))
        ));
    }

    #[test]
    fn test_misspelled_keys_and_levels_are_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml("test_fracton = 0.3"),
            Err(AnalysisError::Config(message)) if message.contains("test_fracton")
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("log_level = \"verbose\""),
            Err(AnalysisError::Config(_))
        ));
    }

    #[test]
    fn test_preprocessing_policies_from_toml() {
        use crate::transform::{Remainder, UnknownCategory};

        let config =
            AnalysisConfig::from_toml("unknown_category = \"error\"\nremainder = \"drop\"").unwrap();
        assert_eq!(config.unknown_category, UnknownCategory::Error);
        assert_eq!(config.remainder, Remainder::Drop);
        assert_eq!(AnalysisConfig::default().remainder, Remainder::Passthrough);
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let config = AnalysisConfig::load("no/such/fraud_analysis.toml").unwrap();
        assert_eq!(config.test_fraction, 0.2);
    }
}

#[cfg(test)]
mod analysis_tests {
    use super::*;
    use crate::analysis::AnalysisPipeline;
    use crate::schema::validate_required;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // 300 transactions, every tenth fraudulent with a shifted V1.
    fn synthetic_transactions() -> Table {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 300;
        let fraud: Vec<f64> = (0..n).map(|i| if i % 10 == 0 { 1.0 } else { 0.0 }).collect();
        let time: Vec<f64> = (0..n).map(|i| i as f64 * 613.0).collect();
        let amount: Vec<f64> = (0..n).map(|_| rng.gen_range(5.0..150.0)).collect();
        let mut columns = vec![Column::numeric("Time", time)];
        for k in 1..=5 {
            let values = fraud
                .iter()
                .map(|&f| {
                    let noise = rng.gen_range(-1.0..1.0);
                    if k == 1 && f == 1.0 { 4.0 + noise * 0.5 } else { noise }
                })
                .collect();
            columns.push(Column::numeric(format!("V{k}"), values));
        }
        columns.push(Column::numeric("Transaction Amount", amount));
        let merchants = ["grocery", "online", "travel"];
        columns.push(Column::categorical(
            "Merchant",
            (0..n).map(|i| merchants[i % 3].to_string()).collect(),
        ));
        columns.push(Column::numeric("Is Fraud", fraud));
        Table::new(columns).unwrap()
    }

    #[test]
    fn test_full_analysis_on_synthetic_data() {
        let charts = tempfile::tempdir().unwrap();
        let config = AnalysisConfig { chart_dir: charts.path().to_path_buf(), ..AnalysisConfig::default() };
        let table = synthetic_transactions();
        validate_required(&table, &config).unwrap();

        let pipeline = AnalysisPipeline::new(config);
        assert_eq!(pipeline.config().polynomial_degree, 2);
        let outcome = pipeline.run_on(&table).unwrap();

        assert_eq!(outcome.exploration.class_counts, [270, 30]);
        assert_eq!(outcome.feature_names.len(), 16);
        assert!(outcome.feature_names.contains(&"Hour".to_string()));
        assert!(outcome.feature_names.contains(&"Merchant_online".to_string()));
        assert!(!outcome.feature_names.contains(&"Time".to_string()));
        assert!(!outcome.feature_names.contains(&"Is Fraud".to_string()));

        assert_eq!(outcome.evaluation.confusion.total(), 60);
        assert!(outcome.evaluation.auc > 0.9, "auc was {}", outcome.evaluation.auc);

        if cfg!(feature = "charts") {
            assert_eq!(outcome.charts.len(), 5);
            assert!(outcome.charts.iter().all(|p| p.exists()));
        }
    }

    #[test]
    fn test_missing_input_file_is_fatal() {
        let config = AnalysisConfig {
            data_path: "no/such/transactions.csv".into(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            AnalysisPipeline::new(config).run(),
            Err(AnalysisError::FileNotFound(_))
        ));
    }
}
