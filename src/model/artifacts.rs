// Model artifact locations and paired loading.
//
// The model and its vocabulary are exported together by the training job and
// must share one id space. By default both live in a platform-appropriate
// directory (~/.local/share/reviewlens/models/ on Linux) so they can be
// dropped in once and reused across runs.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::LoadError;
use super::lda::LdaModel;
use super::traits::TopicScorer;
use super::vocabulary::Vocabulary;

/// Default model file name inside the model directory.
pub const MODEL_FILE: &str = "lda_model.json";

/// Default vocabulary file name inside the model directory.
pub const VOCAB_FILE: &str = "vocabulary.txt";

/// Returns the default directory for storing model artifacts.
/// Uses the platform data directory: ~/.local/share/reviewlens/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reviewlens")
        .join("models")
}

/// Check whether both artifact files exist.
pub fn artifact_files_present(model_path: &Path, vocab_path: &Path) -> bool {
    model_path.exists() && vocab_path.exists()
}

/// A vocabulary and topic model known to share an id space.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub vocabulary: Vocabulary,
    pub model: LdaModel,
}

impl Artifacts {
    /// Pair an already-loaded vocabulary and model, checking that every
    /// vocabulary id indexes a term the model knows about.
    pub fn pair(vocabulary: Vocabulary, model: LdaModel) -> Result<Self, LoadError> {
        let vocab_size = vocabulary.len();
        let model_terms = model.num_terms();

        if vocab_size > model_terms {
            return Err(LoadError::Mismatch {
                vocab_size,
                model_terms,
            });
        }
        if vocab_size < model_terms {
            // Terms the vocabulary can't produce are simply never scored
            warn!(
                vocab_size,
                model_terms, "Vocabulary is smaller than the model's term space"
            );
        }

        Ok(Self { vocabulary, model })
    }

    /// Load both artifacts from disk. Any failure is fatal for the caller.
    ///
    /// `minimum_probability` overrides the value stored in the model file.
    pub fn load(
        model_path: &Path,
        vocab_path: &Path,
        minimum_probability: Option<f64>,
    ) -> Result<Self, LoadError> {
        let vocabulary = Vocabulary::load(vocab_path)?;
        let mut model = LdaModel::load(model_path)?;
        if let Some(p) = minimum_probability {
            model = model.with_minimum_probability(p)?;
        }
        Self::pair(vocabulary, model)
    }

    pub fn num_topics(&self) -> usize {
        self.model.num_topics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lda::{Alpha, InferenceParams};

    fn model_with_terms(n: usize) -> LdaModel {
        LdaModel::new(
            Alpha::Symmetric(0.1),
            vec![vec![1.0; n], vec![2.0; n]],
            InferenceParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_model_dir_is_under_reviewlens() {
        let dir = default_model_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("reviewlens") && path_str.contains("models"),
            "Expected path containing reviewlens/models, got: {path_str}"
        );
    }

    #[test]
    fn test_artifact_files_present_false_when_missing() {
        let dir = std::env::temp_dir().join("reviewlens-test-nonexistent");
        assert!(!artifact_files_present(
            &dir.join(MODEL_FILE),
            &dir.join(VOCAB_FILE)
        ));
    }

    #[test]
    fn test_pair_rejects_larger_vocabulary() {
        let vocab = Vocabulary::from_terms(["a", "b", "c"]).unwrap();
        let result = Artifacts::pair(vocab, model_with_terms(2));
        assert!(matches!(
            result,
            Err(LoadError::Mismatch {
                vocab_size: 3,
                model_terms: 2
            })
        ));
    }

    #[test]
    fn test_pair_accepts_matching_sizes() {
        let vocab = Vocabulary::from_terms(["a", "b"]).unwrap();
        let artifacts = Artifacts::pair(vocab, model_with_terms(2)).unwrap();
        assert_eq!(artifacts.num_topics(), 2);
    }

    #[test]
    fn test_load_missing_files_is_fatal() {
        let dir = std::env::temp_dir().join("reviewlens-test-nonexistent");
        let result = Artifacts::load(&dir.join(MODEL_FILE), &dir.join(VOCAB_FILE), None);
        assert!(matches!(result, Err(LoadError::Missing(_))));
    }
}
