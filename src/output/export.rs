// CSV export for single predictions and scored batches.
//
// Probabilities are written with three decimals; a review with no topic gets
// an empty "Predicted Topic" cell.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::pipeline::batch::BatchOutput;
use crate::pipeline::infer::Prediction;

/// Default file name for a single exported prediction.
pub const MANUAL_EXPORT_FILE: &str = "topic_prediction_manual.csv";

/// Default file name for an exported batch.
pub const BATCH_EXPORT_FILE: &str = "topic_prediction_batch.csv";

/// Placeholder name when the reviewer didn't give one.
pub const ANONYMOUS_NAME: &str = "(Anonymous)";

/// A single scored review, ready for display or export.
#[derive(Debug, Clone)]
pub struct PredictionRecord {
    pub name: String,
    pub review: String,
    pub prediction: Prediction,
    pub scored_at: DateTime<FixedOffset>,
}

impl PredictionRecord {
    pub fn new(
        name: Option<&str>,
        review: &str,
        prediction: Prediction,
        scored_at: DateTime<FixedOffset>,
    ) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_NAME);
        Self {
            name: name.to_string(),
            review: review.to_string(),
            prediction,
            scored_at,
        }
    }
}

fn format_probability(probability: f64) -> String {
    format!("{probability:.3}")
}

/// Write one prediction as a header + single-row CSV.
pub fn write_prediction_csv<W: Write>(record: &PredictionRecord, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([
        "Name".to_string(),
        "Review".to_string(),
        "Predicted Topic".to_string(),
        "Probability".to_string(),
        super::datetime_header(*record.scored_at.offset()),
    ])?;
    writer.write_record([
        record.name.clone(),
        record.review.clone(),
        record.prediction.topic_label(),
        format_probability(record.prediction.probability),
        super::format_timestamp(&record.scored_at),
    ])?;
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write a scored batch: every input column, then cleaned_review,
/// Predicted Topic and Probability.
pub fn write_batch_csv<W: Write>(output: &BatchOutput, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = output.headers.iter().map(String::as_str).collect();
    header.extend(["cleaned_review", "Predicted Topic", "Probability"]);
    writer.write_record(&header)?;

    for row in &output.rows {
        let mut record = row.fields.clone();
        record.push(row.cleaned_review.clone());
        record.push(row.prediction.topic_label());
        record.push(format_probability(row.prediction.probability));
        writer.write_record(&record)?;
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Create `path` and hand the file to a CSV writer function.
pub fn export_to_path<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write(file)?;
    info!(path = %path.display(), "Exported predictions");
    Ok(())
}
