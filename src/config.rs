use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::FixedOffset;

use crate::model::artifacts::{self, MODEL_FILE, VOCAB_FILE};

/// Default display offset: Western Indonesia Time (WIB), UTC+7.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override the artifact paths after loading.
pub struct Config {
    /// Directory holding the model artifacts
    pub model_dir: PathBuf,
    /// Serialized LDA model (JSON)
    pub model_path: PathBuf,
    /// Vocabulary paired with the model
    pub vocab_path: PathBuf,
    /// Overrides the model file's minimum reported topic probability
    pub minimum_probability: Option<f64>,
    /// Offset used for timestamps in previews and exports
    pub utc_offset: FixedOffset,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; only malformed values are errors.
    pub fn load() -> Result<Self> {
        let model_dir = env::var("REVIEWLENS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| artifacts::default_model_dir());

        let model_path = env::var("REVIEWLENS_MODEL_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| model_dir.join(MODEL_FILE));
        let vocab_path = env::var("REVIEWLENS_VOCAB_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| model_dir.join(VOCAB_FILE));

        let minimum_probability = match env::var("REVIEWLENS_MIN_PROBABILITY") {
            Ok(raw) => Some(parse_probability(&raw)?),
            Err(_) => None,
        };

        let offset_hours = match env::var("REVIEWLENS_UTC_OFFSET_HOURS") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .with_context(|| format!("REVIEWLENS_UTC_OFFSET_HOURS is not an integer: {raw}"))?,
            Err(_) => DEFAULT_UTC_OFFSET_HOURS,
        };

        Ok(Self {
            model_dir,
            model_path,
            vocab_path,
            minimum_probability,
            utc_offset: utc_offset(offset_hours)?,
        })
    }

    /// Check that both artifact files exist.
    /// Call this before any operation that loads the model.
    pub fn require_artifacts(&self) -> Result<()> {
        if !artifacts::artifact_files_present(&self.model_path, &self.vocab_path) {
            anyhow::bail!(
                "Model artifacts not found.\n  Model:      {}\n  Vocabulary: {}\n\
                 Copy the exported model into {} or set REVIEWLENS_MODEL_FILE and\n\
                 REVIEWLENS_VOCAB_FILE (or pass --model / --vocab).",
                self.model_path.display(),
                self.vocab_path.display(),
                self.model_dir.display()
            );
        }
        Ok(())
    }
}

fn parse_probability(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("REVIEWLENS_MIN_PROBABILITY is not a number: {raw}"))?;
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("REVIEWLENS_MIN_PROBABILITY must be within [0, 1], got {value}");
    }
    Ok(value)
}

fn utc_offset(hours: i32) -> Result<FixedOffset> {
    if !(-12..=14).contains(&hours) {
        anyhow::bail!("REVIEWLENS_UTC_OFFSET_HOURS must be within -12..=14, got {hours}");
    }
    FixedOffset::east_opt(hours * 3600)
        .with_context(|| format!("Invalid UTC offset: {hours} hours"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probability_bounds() {
        assert_eq!(parse_probability("0.05").unwrap(), 0.05);
        assert!(parse_probability("1.5").is_err());
        assert!(parse_probability("lots").is_err());
    }

    #[test]
    fn test_utc_offset_range() {
        assert_eq!(utc_offset(7).unwrap().local_minus_utc(), 7 * 3600);
        assert_eq!(utc_offset(-5).unwrap().local_minus_utc(), -5 * 3600);
        assert!(utc_offset(20).is_err());
    }
}
