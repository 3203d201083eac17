use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use reviewlens::config::Config;
use reviewlens::model::artifacts::Artifacts;
use reviewlens::output::export::{self, PredictionRecord, BATCH_EXPORT_FILE, MANUAL_EXPORT_FILE};
use reviewlens::output::terminal;
use reviewlens::pipeline::batch::{self, BatchError, ReviewTable};
use reviewlens::pipeline::infer::InferenceContext;

/// reviewlens: dominant-topic detection for product reviews.
///
/// Scores reviews against a pre-trained LDA topic model, one at a time or in
/// bulk from a CSV file with a `review` column.
#[derive(Parser)]
#[command(name = "reviewlens", version, about)]
struct Cli {
    /// LDA model file (overrides REVIEWLENS_MODEL_FILE)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Vocabulary file paired with the model (overrides REVIEWLENS_VOCAB_FILE)
    #[arg(long, global = true)]
    vocab: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the topic of a single review
    Predict {
        /// Review text (read from stdin when omitted)
        review: Option<String>,

        /// Reviewer name shown in the result
        #[arg(long)]
        name: Option<String>,

        /// Also save the result as CSV (default file: topic_prediction_manual.csv)
        #[arg(long, num_args = 0..=1, default_missing_value = MANUAL_EXPORT_FILE)]
        export: Option<PathBuf>,
    },

    /// Detect topics for every row of a CSV file with a `review` column
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Where to write the scored CSV
        #[arg(long, short, default_value = BATCH_EXPORT_FILE)]
        output: PathBuf,
    },

    /// List each topic's most probable terms
    Topics {
        /// Terms to show per topic (default: 10)
        #[arg(long, default_value = "10")]
        top_n: usize,
    },

    /// Show artifact paths and whether they load
    Status,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reviewlens=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if let Some(vocab) = cli.vocab {
        config.vocab_path = vocab;
    }

    match cli.command {
        Commands::Predict {
            review,
            name,
            export: export_path,
        } => {
            let review = match review {
                Some(text) => text,
                None => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("Failed to read review from stdin")?;
                    // Drop the line ending the terminal adds
                    text.truncate(text.trim_end_matches(['\n', '\r']).len());
                    text
                }
            };

            if review.trim().is_empty() {
                println!("{}", "Review must not be empty.".yellow());
                return Ok(());
            }

            let ctx = load_context(&config)?;
            let prediction = ctx.infer(&review);
            let record = PredictionRecord::new(
                name.as_deref(),
                &review,
                prediction,
                reviewlens::output::now_at(config.utc_offset),
            );

            terminal::display_prediction(&record);

            if let Some(path) = export_path {
                export::export_to_path(&path, |file| export::write_prediction_csv(&record, file))?;
                println!("\n{}", format!("Result saved to: {}", path.display()).bold());
            }
        }

        Commands::Batch { input, output } => {
            // Validate the table before loading anything else
            let table = match ReviewTable::from_path(&input) {
                Ok(table) => table,
                Err(e) if e.is_validation() => {
                    eprintln!("{} {e}", "Invalid input:".red().bold());
                    if matches!(e, BatchError::MissingColumn(_)) {
                        eprintln!("The CSV file needs a header row with a 'review' column.");
                    }
                    std::process::exit(2);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Could not read {}", input.display()));
                }
            };

            let ctx = load_context(&config)?;

            println!("Scoring {} reviews from {}...", table.len(), input.display());

            let progress = ProgressBar::new(table.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("  [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            let scored = batch::run(&ctx, table, &progress);
            progress.finish_and_clear();

            terminal::display_batch(&scored);

            export::export_to_path(&output, |file| export::write_batch_csv(&scored, file))?;
            println!(
                "\n{}",
                format!("Predictions saved to: {}", output.display()).bold()
            );
        }

        Commands::Topics { top_n } => {
            let ctx = load_context(&config)?;
            terminal::display_topics(ctx.scorer(), ctx.vocabulary(), top_n);
        }

        Commands::Status => {
            reviewlens::status::show(
                &config.model_path,
                &config.vocab_path,
                config.minimum_probability,
            )?;
        }
    }

    Ok(())
}

/// Load the model artifacts into an inference context, or bail with a helpful message.
fn load_context(config: &Config) -> Result<InferenceContext> {
    config.require_artifacts()?;
    let artifacts = Artifacts::load(
        &config.model_path,
        &config.vocab_path,
        config.minimum_probability,
    )
    .context("Failed to load model artifacts")?;
    info!(topics = artifacts.num_topics(), "Model ready");
    Ok(InferenceContext::from_artifacts(artifacts))
}
