// Artifact status display: paths, file sizes, and whether the pair loads.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::model::artifacts::Artifacts;

/// Display artifact status to the terminal.
///
/// Load failures are reported, not returned: this is the command to run
/// when the others refuse to start.
pub fn show(model_path: &Path, vocab_path: &Path, minimum_probability: Option<f64>) -> Result<()> {
    println!("Model:      {} ({})", model_path.display(), file_size(model_path));
    println!("Vocabulary: {} ({})", vocab_path.display(), file_size(vocab_path));

    match Artifacts::load(model_path, vocab_path, minimum_probability) {
        Ok(artifacts) => {
            let params = artifacts.model.params();
            println!("Topics:     {}", artifacts.num_topics());
            println!(
                "Terms:      {} in vocabulary, {} in model",
                artifacts.vocabulary.len(),
                artifacts.model.num_terms()
            );
            println!(
                "Inference:  {} iterations max, gamma threshold {}, minimum probability {}",
                params.iterations, params.gamma_threshold, params.minimum_probability
            );
            println!("\n{}", "Artifacts load successfully.".green());
        }
        Err(e) => {
            println!("\n{} {e}", "Cannot load artifacts:".red().bold());
        }
    }

    Ok(())
}

fn file_size(path: &Path) -> String {
    std::fs::metadata(path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "missing".to_string())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_missing_file_size() {
        let path = std::env::temp_dir().join("reviewlens-status-missing.json");
        assert_eq!(file_size(&path), "missing");
    }
}
