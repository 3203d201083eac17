// LDA topic model: per-document posterior inference against fixed parameters.
//
// The exported model holds the variational topic-term parameters (lambda,
// K x V) and the document-topic Dirichlet prior (alpha). Scoring a document is
// the variational E-step for that one document:
//
//   expElogbeta[k][w] = exp(psi(lambda[k][w]) - psi(sum_w lambda[k][w]))
//   repeat:
//     phinorm[w] = sum_k expElogtheta[k] * expElogbeta[k][w]
//     gamma[k]   = alpha[k] + expElogtheta[k] * sum_w cts[w] * expElogbeta[k][w] / phinorm[w]
//     expElogtheta = exp(psi(gamma) - psi(sum gamma))
//   until mean |delta gamma| < gamma_threshold
//
// and the topic distribution is gamma normalized to sum to 1. gamma starts at
// 1.0 for every topic so the same text always gets the same answer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::LoadError;
use super::traits::TopicScorer;
use super::vocabulary::{BagOfWords, TermId};

/// Added to phinorm to keep the division finite.
const PHINORM_EPSILON: f64 = 1e-100;

/// Floor applied to the minimum reported topic probability.
const MIN_PROBABILITY_FLOOR: f64 = 1e-8;

/// Document-topic prior: one value for every topic, or one per topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alpha {
    Symmetric(f64),
    Asymmetric(Vec<f64>),
}

/// Settings for per-document inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    /// Maximum E-step iterations per document (default 50)
    pub iterations: usize,
    /// Convergence threshold on mean absolute gamma change (default 0.001)
    pub gamma_threshold: f64,
    /// Topics below this posterior probability are not reported (default 0.01)
    pub minimum_probability: f64,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            iterations: 50,
            gamma_threshold: 0.001,
            minimum_probability: 0.01,
        }
    }
}

/// On-disk JSON layout of an exported model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdaModelFile {
    pub num_topics: usize,
    pub alpha: Alpha,
    pub lambda: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_probability: Option<f64>,
}

/// A loaded, validated LDA model. Immutable after construction.
#[derive(Debug, Clone)]
pub struct LdaModel {
    alpha: Vec<f64>,
    lambda: Vec<Vec<f64>>,
    exp_elog_beta: Vec<Vec<f64>>,
    params: InferenceParams,
}

impl LdaModel {
    /// Validate parameters and precompute expElogbeta.
    pub fn new(
        alpha: Alpha,
        lambda: Vec<Vec<f64>>,
        params: InferenceParams,
    ) -> Result<Self, LoadError> {
        let num_topics = lambda.len();
        if num_topics == 0 {
            return Err(LoadError::Model("model has no topics".to_string()));
        }

        let num_terms = lambda[0].len();
        if num_terms == 0 {
            return Err(LoadError::Model("topics have no terms".to_string()));
        }
        for (k, row) in lambda.iter().enumerate() {
            if row.len() != num_terms {
                return Err(LoadError::Model(format!(
                    "topic {k} has {} terms, expected {num_terms}",
                    row.len()
                )));
            }
            if let Some(bad) = row.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(LoadError::Model(format!(
                    "topic {k} has non-positive or non-finite weight {bad}"
                )));
            }
        }

        let alpha = match alpha {
            Alpha::Symmetric(a) => vec![a; num_topics],
            Alpha::Asymmetric(values) => values,
        };
        if alpha.len() != num_topics {
            return Err(LoadError::Model(format!(
                "alpha has {} values for {num_topics} topics",
                alpha.len()
            )));
        }
        if let Some(bad) = alpha.iter().find(|a| !a.is_finite() || **a <= 0.0) {
            return Err(LoadError::Model(format!("alpha must be positive, got {bad}")));
        }

        validate_params(&params)?;

        let exp_elog_beta: Vec<Vec<f64>> = lambda
            .iter()
            .map(|row| dirichlet_expectation(row).into_iter().map(f64::exp).collect())
            .collect();

        Ok(Self {
            alpha,
            lambda,
            exp_elog_beta,
            params,
        })
    }

    /// Build a model from its deserialized file layout.
    pub fn from_file(file: LdaModelFile) -> Result<Self, LoadError> {
        if file.lambda.len() != file.num_topics {
            return Err(LoadError::Model(format!(
                "num_topics is {} but lambda has {} rows",
                file.num_topics,
                file.lambda.len()
            )));
        }

        let defaults = InferenceParams::default();
        let params = InferenceParams {
            iterations: file.iterations.unwrap_or(defaults.iterations),
            gamma_threshold: file.gamma_threshold.unwrap_or(defaults.gamma_threshold),
            minimum_probability: file
                .minimum_probability
                .unwrap_or(defaults.minimum_probability),
        };

        Self::new(file.alpha, file.lambda, params)
    }

    /// Load and validate a JSON model file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: LdaModelFile =
            serde_json::from_str(&content).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let model = Self::from_file(file)?;
        info!(
            topics = model.num_topics(),
            terms = model.num_terms(),
            path = %path.display(),
            "Loaded LDA model"
        );
        Ok(model)
    }

    /// Replace the minimum reported topic probability.
    pub fn with_minimum_probability(mut self, minimum_probability: f64) -> Result<Self, LoadError> {
        self.params.minimum_probability = minimum_probability;
        validate_params(&self.params)?;
        Ok(self)
    }

    /// Size of the term space the topics are defined over.
    pub fn num_terms(&self) -> usize {
        self.lambda[0].len()
    }

    pub fn params(&self) -> &InferenceParams {
        &self.params
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Full posterior topic distribution for a document (sums to 1).
    ///
    /// Term ids outside the model's term space are ignored. Returns an empty
    /// vector when nothing in the document is scoreable.
    pub fn topic_distribution(&self, bow: &BagOfWords) -> Vec<f64> {
        let words: Vec<(TermId, f64)> = bow
            .iter()
            .filter(|(id, count)| *id < self.num_terms() && *count > 0)
            .map(|&(id, count)| (id, count as f64))
            .collect();

        if words.is_empty() {
            return Vec::new();
        }

        let gamma = self.infer_gamma(&words);
        let total: f64 = gamma.iter().sum();
        gamma.into_iter().map(|g| g / total).collect()
    }

    /// Variational E-step for one document; returns the converged gamma.
    fn infer_gamma(&self, words: &[(TermId, f64)]) -> Vec<f64> {
        // expElogbeta restricted to the document's terms: K x n
        let beta_d: Vec<Vec<f64>> = self
            .exp_elog_beta
            .iter()
            .map(|row| words.iter().map(|&(id, _)| row[id]).collect())
            .collect();

        let mut gamma = vec![1.0; self.num_topics()];
        let mut exp_elog_theta: Vec<f64> = dirichlet_expectation(&gamma)
            .into_iter()
            .map(f64::exp)
            .collect();
        let mut phinorm = phi_norm(&exp_elog_theta, &beta_d);

        let mut iterations_run = 0;
        for _ in 0..self.params.iterations {
            iterations_run += 1;
            let last_gamma = gamma.clone();

            for (k, g) in gamma.iter_mut().enumerate() {
                let weighted: f64 = words
                    .iter()
                    .enumerate()
                    .map(|(w, &(_, count))| count / phinorm[w] * beta_d[k][w])
                    .sum();
                *g = self.alpha[k] + exp_elog_theta[k] * weighted;
            }

            exp_elog_theta = dirichlet_expectation(&gamma)
                .into_iter()
                .map(f64::exp)
                .collect();
            phinorm = phi_norm(&exp_elog_theta, &beta_d);

            let mean_change = gamma
                .iter()
                .zip(&last_gamma)
                .map(|(a, b)| (a - b).abs())
                .sum::<f64>()
                / gamma.len() as f64;
            if mean_change < self.params.gamma_threshold {
                break;
            }
        }

        debug!(
            terms = words.len(),
            iterations = iterations_run,
            "Document inference finished"
        );
        gamma
    }

    /// The `n` most probable terms of a topic, highest first.
    /// Returns an empty list for an out-of-range topic.
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<(TermId, f64)> {
        let Some(row) = self.lambda.get(topic) else {
            return Vec::new();
        };
        let total: f64 = row.iter().sum();

        let mut terms: Vec<(TermId, f64)> = row
            .iter()
            .enumerate()
            .map(|(id, weight)| (id, weight / total))
            .collect();
        // Stable sort keeps lower ids first on equal weight
        terms.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        terms.truncate(n);
        terms
    }
}

impl TopicScorer for LdaModel {
    fn num_topics(&self) -> usize {
        self.lambda.len()
    }

    fn document_topics(&self, bow: &BagOfWords) -> Vec<(usize, f64)> {
        let threshold = self.params.minimum_probability.max(MIN_PROBABILITY_FLOOR);
        self.topic_distribution(bow)
            .into_iter()
            .enumerate()
            .filter(|(_, p)| *p >= threshold)
            .collect()
    }
}

fn validate_params(params: &InferenceParams) -> Result<(), LoadError> {
    if params.iterations == 0 {
        return Err(LoadError::Model("iterations must be at least 1".to_string()));
    }
    if !params.gamma_threshold.is_finite() || params.gamma_threshold < 0.0 {
        return Err(LoadError::Model(format!(
            "gamma_threshold must be a non-negative number, got {}",
            params.gamma_threshold
        )));
    }
    if !(0.0..=1.0).contains(&params.minimum_probability) {
        return Err(LoadError::Model(format!(
            "minimum_probability must be within [0, 1], got {}",
            params.minimum_probability
        )));
    }
    Ok(())
}

/// phinorm[w] = sum_k theta[k] * beta_d[k][w] + epsilon
fn phi_norm(exp_elog_theta: &[f64], beta_d: &[Vec<f64>]) -> Vec<f64> {
    let n = beta_d.first().map_or(0, Vec::len);
    (0..n)
        .map(|w| {
            exp_elog_theta
                .iter()
                .zip(beta_d)
                .map(|(theta, row)| theta * row[w])
                .sum::<f64>()
                + PHINORM_EPSILON
        })
        .collect()
}

/// E[log X] for X ~ Dirichlet(params): psi(params[i]) - psi(sum(params)).
fn dirichlet_expectation(params: &[f64]) -> Vec<f64> {
    let psi_total = digamma(params.iter().sum());
    params.iter().map(|&p| digamma(p) - psi_total).collect()
}

/// Digamma function for x > 0: shift x above 6 with the recurrence
/// psi(x) = psi(x + 1) - 1/x, then use the asymptotic series.
fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let f = 1.0 / (x * x);
    result + x.ln()
        - 0.5 / x
        - f * (1.0 / 12.0 - f * (1.0 / 120.0 - f * (1.0 / 252.0 - f * (1.0 / 240.0 - f / 132.0))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_topic_model() -> LdaModel {
        // Topic 0 favors terms 0-1, topic 1 favors terms 2-3
        LdaModel::new(
            Alpha::Symmetric(0.5),
            vec![vec![40.0, 30.0, 1.0, 1.0], vec![1.0, 1.0, 35.0, 25.0]],
            InferenceParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_digamma_known_values() {
        assert!((digamma(1.0) + 0.577_215_664_9).abs() < 1e-9);
        assert!((digamma(0.5) + 1.963_510_026_0).abs() < 1e-9);
        assert!((digamma(10.0) - 2.251_752_589_1).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let model = two_topic_model();
        let dist = model.topic_distribution(&vec![(0, 2), (3, 1)]);
        assert_eq!(dist.len(), 2);
        let sum: f64 = dist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "Distribution sums to {sum}");
    }

    #[test]
    fn test_document_follows_its_terms() {
        let model = two_topic_model();
        let dist = model.topic_distribution(&vec![(0, 3), (1, 2)]);
        assert!(dist[0] > 0.8, "Expected topic 0 to dominate, got {dist:?}");

        let dist = model.topic_distribution(&vec![(2, 2), (3, 2)]);
        assert!(dist[1] > 0.8, "Expected topic 1 to dominate, got {dist:?}");
    }

    #[test]
    fn test_inference_is_deterministic() {
        let model = two_topic_model();
        let bow = vec![(0, 1), (2, 1)];
        assert_eq!(model.topic_distribution(&bow), model.topic_distribution(&bow));
    }

    #[test]
    fn test_out_of_range_ids_ignored() {
        let model = two_topic_model();
        assert!(model.topic_distribution(&vec![(99, 4)]).is_empty());
        assert!(model.document_topics(&vec![(99, 4)]).is_empty());
    }

    #[test]
    fn test_document_topics_filters_small_weights() {
        let model = two_topic_model().with_minimum_probability(0.5).unwrap();
        let topics = model.document_topics(&vec![(0, 5), (1, 5)]);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].0, 0);
    }

    #[test]
    fn test_top_terms_ordering() {
        let model = two_topic_model();
        let top = model.top_terms(1, 2);
        assert_eq!(top.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![2, 3]);
        assert!((top[0].1 - 35.0 / 62.0).abs() < 1e-9);
        assert!(model.top_terms(7, 3).is_empty());
    }

    #[test]
    fn test_rejects_ragged_lambda() {
        let result = LdaModel::new(
            Alpha::Symmetric(0.1),
            vec![vec![1.0, 2.0], vec![1.0]],
            InferenceParams::default(),
        );
        assert!(matches!(result, Err(LoadError::Model(_))));
    }

    #[test]
    fn test_rejects_non_positive_lambda() {
        let result = LdaModel::new(
            Alpha::Symmetric(0.1),
            vec![vec![1.0, 0.0]],
            InferenceParams::default(),
        );
        assert!(matches!(result, Err(LoadError::Model(_))));
    }

    #[test]
    fn test_rejects_alpha_length_mismatch() {
        let result = LdaModel::new(
            Alpha::Asymmetric(vec![0.1, 0.2, 0.3]),
            vec![vec![1.0], vec![2.0]],
            InferenceParams::default(),
        );
        assert!(matches!(result, Err(LoadError::Model(_))));
    }

    #[test]
    fn test_from_file_checks_topic_count() {
        let file = LdaModelFile {
            num_topics: 3,
            alpha: Alpha::Symmetric(0.1),
            lambda: vec![vec![1.0], vec![2.0]],
            iterations: None,
            gamma_threshold: None,
            minimum_probability: None,
        };
        assert!(matches!(LdaModel::from_file(file), Err(LoadError::Model(_))));
    }

    #[test]
    fn test_rejects_bad_minimum_probability() {
        let result = two_topic_model().with_minimum_probability(1.5);
        assert!(matches!(result, Err(LoadError::Model(_))));
    }
}
