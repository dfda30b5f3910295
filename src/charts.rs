// SVG charts rendered with Plotters: class balance, amount distribution,
// correlation heatmap, confusion matrix and ROC curve.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::explore::{histogram, CorrelationMatrix};
use crate::metrics::{ConfusionMatrix, RocCurve};

const AMOUNT_BINS: usize = 30;

// Renders the fixed chart sequence into `dir` and returns the written files.
pub fn render_all(
    dir: &Path,
    class_counts: [usize; 2],
    amounts: &[f64],
    correlation: &CorrelationMatrix,
    confusion: &ConfusionMatrix,
    roc: &RocCurve,
    auc: f64,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let paths = [
        "class_distribution.svg",
        "amount_distribution.svg",
        "correlation_heatmap.svg",
        "confusion_matrix.svg",
        "roc_curve.svg",
    ]
    .map(|name| dir.join(name));

    class_distribution_chart(&paths[0], class_counts)?;
    amount_histogram_chart(&paths[1], amounts)?;
    correlation_heatmap_chart(&paths[2], correlation)?;
    confusion_matrix_chart(&paths[3], confusion)?;
    roc_curve_chart(&paths[4], roc, auc)?;

    for path in &paths {
        info!(path = %path.display(), "wrote chart");
    }
    Ok(paths.to_vec())
}

pub fn class_distribution_chart(path: &Path, counts: [usize; 2]) -> Result<()> {
    let root = SVGBackend::new(path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let max = counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption("Class Distribution", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..1.5f64, 0f64..max * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(3)
        .x_label_formatter(&|x: &f64| match x.round() as i64 {
            0 => "Legitimate (0)".to_string(),
            1 => "Fraud (1)".to_string(),
            _ => String::new(),
        })
        .x_desc("Class")
        .y_desc("Transactions")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(class, &n)| {
        let x = class as f64;
        let color = if class == 0 { BLUE.mix(0.6) } else { RED.mix(0.6) };
        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, n as f64)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

pub fn amount_histogram_chart(path: &Path, amounts: &[f64]) -> Result<()> {
    let root = SVGBackend::new(path, (800, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let bins = histogram(amounts, AMOUNT_BINS);
    let (lo, hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.0, last.1),
        _ => (0.0, 1.0),
    };
    let max = bins.iter().map(|b| b.2).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("Transaction Amount Distribution", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0f64..max * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Transaction Amount")
        .y_desc("Transactions")
        .draw()?;

    chart.draw_series(bins.iter().map(|&(start, end, n)| {
        Rectangle::new([(start, 0.0), (end, n as f64)], BLUE.mix(0.5).filled())
    }))?;

    root.present()?;
    Ok(())
}

pub fn correlation_heatmap_chart(path: &Path, matrix: &CorrelationMatrix) -> Result<()> {
    let n = matrix.columns.len();
    let root = SVGBackend::new(path, (900, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let names = &matrix.columns;
    let label = |v: &i32| names.get(*v as usize).cloned().unwrap_or_default();
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Matrix", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(140)
        .build_cartesian_2d(0i32..n.max(1) as i32, 0i32..n.max(1) as i32)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n.max(1))
        .y_labels(n.max(1))
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .label_style(("sans-serif", 10).into_font())
        .draw()?;

    chart.draw_series((0..n).flat_map(|i| (0..n).map(move |j| (i, j))).map(|(i, j)| {
        let (x, y) = (j as i32, i as i32);
        Rectangle::new([(x, y), (x + 1, y + 1)], diverging(matrix.values[[i, j]]).filled())
    }))?;

    root.present()?;
    Ok(())
}

pub fn confusion_matrix_chart(path: &Path, matrix: &ConfusionMatrix) -> Result<()> {
    let root = SVGBackend::new(path, (560, 520)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Confusion Matrix (rows actual, columns predicted)", ("sans-serif", 20).into_font())
        .margin(20)
        .build_cartesian_2d(0f64..2f64, 0f64..2f64)?;

    let max = matrix.counts.iter().flatten().copied().max().unwrap_or(0).max(1) as f64;
    let cells: Vec<(usize, usize, usize)> = (0..2)
        .flat_map(|actual| (0..2).map(move |predicted| (actual, predicted)))
        .map(|(actual, predicted)| (actual, predicted, matrix.counts[actual][predicted]))
        .collect();

    // Actual 0 is drawn as the top row.
    chart.draw_series(cells.iter().map(|&(actual, predicted, n)| {
        let (x, y) = (predicted as f64, 1.0 - actual as f64);
        let shade = 1.0 - 0.8 * (n as f64 / max);
        let color = RGBColor((255.0 * shade) as u8, (255.0 * shade) as u8, 255);
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], color.filled())
    }))?;
    chart.draw_series(cells.iter().map(|&(actual, predicted, n)| {
        let (x, y) = (predicted as f64, 1.0 - actual as f64);
        Text::new(
            format!("actual {actual} / predicted {predicted}: {n}"),
            (x + 0.05, y + 0.55),
            ("sans-serif", 14).into_font(),
        )
    }))?;

    root.present()?;
    Ok(())
}

pub fn roc_curve_chart(path: &Path, roc: &RocCurve, auc: f64) -> Result<()> {
    let root = SVGBackend::new(path, (640, 560)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("ROC Curve", ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, 0f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            roc.false_positive_rate
                .iter()
                .zip(&roc.true_positive_rate)
                .map(|(&x, &y)| (x, y)),
            &BLUE,
        ))?
        .label(format!("Gaussian NB (AUC = {auc:.3})"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &BLACK.mix(0.4)))?
        .label("Chance")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.mix(0.4)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;

    root.present()?;
    Ok(())
}

// Blue for negative, white at zero, red for positive; grey when undefined.
fn diverging(r: f64) -> RGBColor {
    if r.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let t = r.clamp(-1.0, 1.0);
    let fade = (255.0 * (1.0 - t.abs())) as u8;
    if t >= 0.0 {
        RGBColor(255, fade, fade)
    } else {
        RGBColor(fade, fade, 255)
    }
}
