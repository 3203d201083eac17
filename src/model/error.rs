// Load-time failures for model artifacts.
//
// These are fatal: without a vocabulary and a model nothing can be scored.
// Per-document scoring has no error type at all.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Artifact not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid vocabulary: {0}")]
    Vocabulary(String),

    #[error("Invalid topic model: {0}")]
    Model(String),

    #[error(
        "Vocabulary and model do not share an id space: vocabulary has {vocab_size} terms, model covers {model_terms}"
    )]
    Mismatch {
        vocab_size: usize,
        model_terms: usize,
    },
}
