// Batch scoring of a review table.
//
// Input is a CSV file with a header row that must include a `review` column.
// Each row is scored independently and the output keeps the input's row
// count and order: output row i is input row i with the prediction attached.
// A missing `review` column is a validation error raised before any scoring.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use thiserror::Error;
use tracing::info;

use super::infer::{InferenceContext, Prediction};
use crate::model::traits::TopicScorer;

/// Column that holds the review text.
pub const REVIEW_COLUMN: &str = "review";

/// Cell values read as missing data and replaced with an empty string.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_marker(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Column '{0}' not found in the table")]
    MissingColumn(String),

    #[error("Row {line} has {found} fields but the header has {expected}")]
    RaggedRow {
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl BatchError {
    /// True for problems with the table's shape (user-fixable input), as
    /// opposed to I/O or parse failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, BatchError::MissingColumn(_) | BatchError::RaggedRow { .. })
    }
}

/// A parsed review table with a located `review` column.
#[derive(Debug, Clone)]
pub struct ReviewTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    review_index: usize,
}

impl ReviewTable {
    /// Parse CSV from any reader. Short rows are padded with empty fields;
    /// rows longer than the header are rejected. Cells holding a missing-data
    /// marker such as `NA` or `null` become empty.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let review_index = headers
            .iter()
            .position(|h| h == REVIEW_COLUMN)
            .ok_or_else(|| BatchError::MissingColumn(REVIEW_COLUMN.to_string()))?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() > headers.len() {
                return Err(BatchError::RaggedRow {
                    line: record.position().map_or(0, |p| p.line()),
                    found: record.len(),
                    expected: headers.len(),
                });
            }
            let mut fields: Vec<String> = record
                .iter()
                .map(|cell| {
                    if is_missing_marker(cell) {
                        String::new()
                    } else {
                        cell.to_string()
                    }
                })
                .collect();
            fields.resize(headers.len(), String::new());
            rows.push(fields);
        }

        Ok(Self {
            headers,
            rows,
            review_index,
        })
    }

    /// Open and parse a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, BatchError> {
        let file = File::open(path).map_err(|source| BatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Review text of every row, in input order. Empty cells are "".
    pub fn reviews(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row[self.review_index].as_str())
    }
}

/// One scored input row.
#[derive(Debug, Clone)]
pub struct BatchRow {
    /// The input row's fields, unchanged
    pub fields: Vec<String>,
    pub cleaned_review: String,
    pub prediction: Prediction,
}

/// Scored table, rows in input order.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub headers: Vec<String>,
    pub rows: Vec<BatchRow>,
    review_index: usize,
}

impl BatchOutput {
    /// Original review text of a row.
    pub fn review<'a>(&self, row: &'a BatchRow) -> &'a str {
        &row.fields[self.review_index]
    }

    /// Number of rows assigned to each topic (None = no topic).
    pub fn topic_counts(&self) -> BTreeMap<Option<usize>, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.prediction.topic).or_insert(0) += 1;
        }
        counts
    }
}

/// Score every row of the table in order.
pub fn run<S: TopicScorer>(
    ctx: &InferenceContext<S>,
    table: ReviewTable,
    progress: &ProgressBar,
) -> BatchOutput {
    let ReviewTable {
        headers,
        rows,
        review_index,
    } = table;

    let mut scored = Vec::with_capacity(rows.len());
    for fields in rows {
        let cleaned_review = ctx.normalizer().clean_text(&fields[review_index]);
        let prediction = ctx.infer_cleaned(&cleaned_review);
        scored.push(BatchRow {
            fields,
            cleaned_review,
            prediction,
        });
        progress.inc(1);
    }

    let unmatched = scored.iter().filter(|r| r.prediction.topic.is_none()).count();
    info!(
        rows = scored.len(),
        unmatched, "Batch scoring complete"
    );

    BatchOutput {
        headers,
        rows: scored,
        review_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_review_column() {
        let csv = "name,text\nana,great app\n";
        let err = ReviewTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, BatchError::MissingColumn(ref c) if c == "review"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "name,review,rating\nana,great app,5\nbudi\n";
        let table = ReviewTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.reviews().collect::<Vec<_>>(), vec!["great app", ""]);
    }

    #[test]
    fn test_long_rows_rejected() {
        let csv = "review\nfine\ntoo,many\n";
        let err = ReviewTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, BatchError::RaggedRow { found: 2, expected: 1, .. }));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let table = ReviewTable::from_reader("id,review\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers(), &["id".to_string(), "review".to_string()]);
    }

    #[test]
    fn test_missing_markers_become_empty() {
        let csv = "id,review\nNA,N/A\n2,null\n3,nan\n4,Not available\n5, NA\n";
        let table = ReviewTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            table.reviews().collect::<Vec<_>>(),
            vec!["", "", "", "Not available", " NA"]
        );
        assert_eq!(table.rows[0][0], "");
    }

    #[test]
    fn test_row_review_outlives_output() {
        let table = ReviewTable::from_reader("id,review\n1,great chords\n".as_bytes()).unwrap();
        let output = BatchOutput {
            headers: table.headers.clone(),
            rows: vec![BatchRow {
                fields: table.rows[0].clone(),
                cleaned_review: "great chords".to_string(),
                prediction: Prediction::NONE,
            }],
            review_index: table.review_index,
        };
        let row = output.rows[0].clone();
        let review = output.review(&row);
        drop(output);
        assert_eq!(review, "great chords");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("reviewlens-test-missing.csv");
        let err = ReviewTable::from_path(&path).unwrap_err();
        assert!(matches!(err, BatchError::Io { .. }));
        assert!(!err.is_validation());
    }
}
