// Text-to-topic inference: normalize -> doc2bow -> document topics -> arg-max.
//
// The context is built once from the loaded artifacts and passed by reference
// into every call. Nothing here mutates it, so scoring is a pure function of
// (text, vocabulary, model).

use serde::Serialize;
use tracing::debug;

use crate::model::artifacts::Artifacts;
use crate::model::lda::LdaModel;
use crate::model::traits::TopicScorer;
use crate::model::vocabulary::Vocabulary;
use crate::text::normalize::TextNormalizer;

/// Dominant topic for one review.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Winning topic index, or None when nothing in the text was scoreable
    pub topic: Option<usize>,
    /// Posterior probability of the winning topic, rounded to 3 decimals
    pub probability: f64,
}

impl Prediction {
    /// Result for text with no vocabulary overlap.
    pub const NONE: Prediction = Prediction {
        topic: None,
        probability: 0.0,
    };

    /// Topic index as display text; empty when there is no topic.
    pub fn topic_label(&self) -> String {
        self.topic.map(|t| t.to_string()).unwrap_or_default()
    }
}

/// Round to 3 decimal places, half away from zero.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Pick the highest-weight topic with a single linear scan.
///
/// Ties go to the lowest topic index, whatever order the pairs arrive in.
pub fn dominant_topic(weights: &[(usize, f64)]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for &(topic, weight) in weights {
        if weight.is_nan() {
            continue;
        }
        best = match best {
            Some((best_topic, best_weight))
                if weight < best_weight || (weight == best_weight && topic > best_topic) =>
            {
                Some((best_topic, best_weight))
            }
            _ => Some((topic, weight)),
        };
    }
    best
}

/// Score an already-normalized token sequence.
pub fn score<S, T>(tokens: &[T], vocabulary: &Vocabulary, scorer: &S) -> Prediction
where
    S: TopicScorer + ?Sized,
    T: AsRef<str>,
{
    let bow = vocabulary.doc2bow(tokens);
    if bow.is_empty() {
        return Prediction::NONE;
    }

    let weights = scorer.document_topics(&bow);
    match dominant_topic(&weights) {
        Some((topic, weight)) => Prediction {
            topic: Some(topic),
            probability: round3(weight.clamp(0.0, 1.0)),
        },
        None => Prediction::NONE,
    }
}

/// Immutable inference state: normalizer, vocabulary and topic scorer.
pub struct InferenceContext<S = LdaModel> {
    normalizer: TextNormalizer,
    vocabulary: Vocabulary,
    scorer: S,
}

impl InferenceContext<LdaModel> {
    /// Build the context from a validated artifact pair.
    pub fn from_artifacts(artifacts: Artifacts) -> Self {
        Self::new(artifacts.vocabulary, artifacts.model)
    }
}

impl<S: TopicScorer> InferenceContext<S> {
    pub fn new(vocabulary: Vocabulary, scorer: S) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            vocabulary,
            scorer,
        }
    }

    /// Dominant topic for a raw review. Never fails: empty or unmatched
    /// text gives `Prediction::NONE`.
    pub fn infer(&self, raw_text: &str) -> Prediction {
        let tokens = self.normalizer.normalize(raw_text);
        let prediction = score(&tokens, &self.vocabulary, &self.scorer);
        debug!(
            tokens = tokens.len(),
            topic = ?prediction.topic,
            probability = prediction.probability,
            "Scored review"
        );
        prediction
    }

    /// Score text that has already been through `clean_text`.
    pub fn infer_cleaned(&self, cleaned: &str) -> Prediction {
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        score(&tokens, &self.vocabulary, &self.scorer)
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }
}
