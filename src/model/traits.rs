// Topic scorer trait: the seam between the inference pipeline and the model.
//
// The pipeline only needs "given a bag of words, which topics and how much".
// LdaModel is the real implementation; tests plug in fixed-output scorers to
// pin down arg-max behavior independently of the model math.

use super::vocabulary::BagOfWords;

/// A source of per-document topic weights.
pub trait TopicScorer {
    /// Number of topics the scorer can report.
    fn num_topics(&self) -> usize;

    /// Sparse (topic index, weight) pairs for a non-empty bag of words.
    /// Only topics with non-negligible weight are included; weights need not
    /// sum to 1 over the reported topics.
    fn document_topics(&self, bow: &BagOfWords) -> Vec<(usize, f64)>;
}
