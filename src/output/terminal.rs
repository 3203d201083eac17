// Colored terminal output for predictions, batch results and topics.
//
// This module handles all terminal-specific formatting: colors, tables and
// summaries. main.rs delegates here after scoring.

use colored::Colorize;

use super::export::PredictionRecord;
use crate::model::lda::LdaModel;
use crate::model::traits::TopicScorer;
use crate::model::vocabulary::Vocabulary;
use crate::pipeline::batch::BatchOutput;
use crate::pipeline::infer::Prediction;

/// How many batch rows to show before summarizing.
const PREVIEW_ROWS: usize = 20;

/// Display a single scored review as a one-row table.
pub fn display_prediction(record: &PredictionRecord) {
    println!("\n{}", "Topic detected.".green().bold());
    println!();
    println!(
        "  {:<20} {:<50} {:>6}  {:>6}  {}",
        "Name".dimmed(),
        "Review".dimmed(),
        "Topic".dimmed(),
        "Prob".dimmed(),
        super::datetime_header(*record.scored_at.offset()).dimmed(),
    );
    println!("  {}", "-".repeat(110).dimmed());
    println!(
        "  {:<20} {:<50} {:>6}  {:>6.3}  {}",
        super::truncate_chars(&record.name, 18),
        super::truncate_chars(&record.review, 46),
        colorize_topic(&record.prediction),
        record.prediction.probability,
        super::format_timestamp(&record.scored_at),
    );

    if record.prediction.topic.is_none() {
        println!(
            "\n  {}",
            "No words in this review are in the model's vocabulary.".yellow()
        );
    }
}

/// Display the first rows of a scored batch plus a per-topic summary.
pub fn display_batch(output: &BatchOutput) {
    println!(
        "\n{}",
        format!("=== Batch Predictions ({} reviews) ===", output.rows.len()).bold()
    );
    println!();

    println!(
        "  {:>5}  {:<70} {:>6}  {:>6}",
        "Row".dimmed(),
        "Review".dimmed(),
        "Topic".dimmed(),
        "Prob".dimmed(),
    );
    println!("  {}", "-".repeat(94).dimmed());

    for (i, row) in output.rows.iter().take(PREVIEW_ROWS).enumerate() {
        println!(
            "  {:>5}  {:<70} {:>6}  {:>6.3}",
            i + 1,
            super::truncate_chars(output.review(row), 66),
            colorize_topic(&row.prediction),
            row.prediction.probability,
        );
    }
    if output.rows.len() > PREVIEW_ROWS {
        println!(
            "  {}",
            format!("... {} more rows in the export", output.rows.len() - PREVIEW_ROWS).dimmed()
        );
    }

    println!("\n{}", "Topic distribution:".bold());
    let total = output.rows.len().max(1);
    for (topic, count) in output.topic_counts() {
        let label = match topic {
            Some(t) => format!("Topic {t}"),
            None => "No topic".to_string(),
        };
        let share = count as f64 / total as f64;
        let filled = (share * 20.0).round() as usize;
        println!(
            "  {:<10} [{}{}] {:>5} ({:.0}%)",
            label,
            "=".repeat(filled).bright_green(),
            " ".repeat(20usize.saturating_sub(filled)),
            count,
            share * 100.0
        );
    }
}

/// Display each topic's most probable terms.
pub fn display_topics(model: &LdaModel, vocabulary: &Vocabulary, top_n: usize) {
    println!(
        "\n{}",
        format!("=== Topics ({} total, top {} terms) ===", model.num_topics(), top_n).bold()
    );
    println!();

    for topic in 0..model.num_topics() {
        let terms: Vec<String> = model
            .top_terms(topic, top_n)
            .into_iter()
            .map(|(id, weight)| {
                let term = vocabulary.term(id).unwrap_or("?");
                format!("{term} ({weight:.3})")
            })
            .collect();
        println!("  {:>3}. {}", topic, terms.join(", "));
    }
}

fn colorize_topic(prediction: &Prediction) -> colored::ColoredString {
    match prediction.topic {
        Some(t) => t.to_string().bright_cyan().bold(),
        None => "-".dimmed(),
    }
}
