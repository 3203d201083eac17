// Vocabulary: the fixed term <-> id mapping the topic model was trained on.
//
// Two on-disk formats are accepted:
//   - JSON: {"token2id": {"ukulele": 0, "chord": 1, ...}}
//   - Plain-text dictionary export: an optional first line holding only the
//     training document count, then one "id<TAB>term<TAB>docfreq" line per term.
//
// Ids must be dense (0..len) so they index straight into the model's
// topic-term rows.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::error::LoadError;

/// Integer id of a vocabulary term.
pub type TermId = usize;

/// Sparse term-frequency vector: (term id, count), sorted by term id,
/// one entry per distinct term.
pub type BagOfWords = Vec<(TermId, u32)>;

#[derive(Deserialize)]
struct VocabularyFile {
    token2id: HashMap<String, TermId>,
}

/// Immutable bidirectional term/id mapping.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    id2token: Vec<String>,
    token2id: HashMap<String, TermId>,
}

impl Vocabulary {
    /// Build a vocabulary where each term's id is its position.
    pub fn from_terms<I, S>(terms: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pairs = terms
            .into_iter()
            .enumerate()
            .map(|(id, term)| (term.into(), id))
            .collect();
        Self::from_pairs(pairs)
    }

    /// Build a vocabulary from an explicit term -> id map.
    pub fn from_token2id(token2id: HashMap<String, TermId>) -> Result<Self, LoadError> {
        Self::from_pairs(token2id.into_iter().collect())
    }

    fn from_pairs(pairs: Vec<(String, TermId)>) -> Result<Self, LoadError> {
        let n = pairs.len();
        let mut slots: Vec<Option<String>> = vec![None; n];
        let mut token2id = HashMap::with_capacity(n);

        for (term, id) in pairs {
            if term.is_empty() {
                return Err(LoadError::Vocabulary(format!("empty term for id {id}")));
            }
            if id >= n {
                return Err(LoadError::Vocabulary(format!(
                    "id {id} for term '{term}' is outside 0..{n} (ids must be dense)"
                )));
            }
            if let Some(existing) = &slots[id] {
                return Err(LoadError::Vocabulary(format!(
                    "id {id} assigned to both '{existing}' and '{term}'"
                )));
            }
            if token2id.insert(term.clone(), id).is_some() {
                return Err(LoadError::Vocabulary(format!("term '{term}' appears twice")));
            }
            slots[id] = Some(term);
        }

        // Every slot is filled: n distinct ids, all < n
        let id2token = slots.into_iter().flatten().collect();

        Ok(Self { id2token, token2id })
    }

    /// Load a vocabulary file. `.json` files use the token2id format; anything
    /// else is parsed as the plain-text dictionary export.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let vocab = if is_json {
            let file: VocabularyFile =
                serde_json::from_str(&content).map_err(|source| LoadError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            Self::from_token2id(file.token2id)?
        } else {
            Self::parse_text(&content)?
        };

        if vocab.is_empty() {
            return Err(LoadError::Vocabulary(format!(
                "{} contains no terms",
                path.display()
            )));
        }

        info!(terms = vocab.len(), path = %path.display(), "Loaded vocabulary");
        Ok(vocab)
    }

    /// Parse the plain-text dictionary export.
    pub fn parse_text(content: &str) -> Result<Self, LoadError> {
        let mut pairs = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            // Leading document-count header
            if line_no == 0 && !line.contains('\t') && line.trim().parse::<u64>().is_ok() {
                continue;
            }

            let mut parts = line.split('\t');
            let id_str = parts.next().unwrap_or_default();
            let term = parts.next().ok_or_else(|| {
                LoadError::Vocabulary(format!(
                    "line {}: expected id<TAB>term, got '{line}'",
                    line_no + 1
                ))
            })?;
            let id: TermId = id_str.trim().parse().map_err(|_| {
                LoadError::Vocabulary(format!("line {}: bad term id '{id_str}'", line_no + 1))
            })?;

            pairs.push((term.to_string(), id));
        }

        Self::from_pairs(pairs)
    }

    pub fn len(&self) -> usize {
        self.id2token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2token.is_empty()
    }

    /// Id of a term, if it is in the vocabulary.
    pub fn id(&self, term: &str) -> Option<TermId> {
        self.token2id.get(term).copied()
    }

    /// Term for an id, if the id is in range.
    pub fn term(&self, id: TermId) -> Option<&str> {
        self.id2token.get(id).map(String::as_str)
    }

    /// Convert tokens into a sparse count vector. Out-of-vocabulary tokens
    /// are dropped.
    pub fn doc2bow<S: AsRef<str>>(&self, tokens: &[S]) -> BagOfWords {
        let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(id) = self.id(token.as_ref()) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }
}
