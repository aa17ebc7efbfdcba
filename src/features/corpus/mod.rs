use std::collections::HashSet;
use std::hash::Hash;

use crate::features::config::TopBy;
use crate::utils::datastruct::vocab::Vocabulary;
use crate::utils::sort::top_n_by_value;

/// keep the vocabulary index and per-token aggregates of a document set
///
/// `counts`, `document_counts` and `postings` are indexed by vocabulary id
/// and always have the same length as `vocab`.
#[derive(Debug, Clone)]
pub struct Corpus<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// token <-> id table
    vocab: Vocabulary<T>,
    /// total occurrences per id
    counts: Vec<u64>,
    /// number of documents containing each id
    document_counts: Vec<u64>,
    /// documents containing each id, in registration order
    postings: Vec<Vec<K>>,
}

impl<K, T> Default for Corpus<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::from_vocabulary(Vocabulary::new())
    }
}

impl<K, T> Corpus<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// Create a new instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing id table; all aggregates are zero
    pub fn from_vocabulary(vocab: Vocabulary<T>) -> Self {
        let n = vocab.len();
        Self {
            vocab,
            counts: vec![0; n],
            document_counts: vec![0; n],
            postings: vec![Vec::new(); n],
        }
    }

    fn intern(&mut self, token: &T) -> usize {
        let (id, fresh) = self.vocab.intern(token);
        if fresh {
            self.counts.push(0);
            self.document_counts.push(0);
            self.postings.push(Vec::new());
        }
        id
    }

    /// Add one document's distinct (token, count) entries
    ///
    /// Each entry bumps the token's document count by exactly one, so the
    /// entries must not repeat a token.
    pub fn add_document<'a, I>(&mut self, key: &K, entries: I) -> usize
    where
        I: IntoIterator<Item = (&'a T, u64)>,
        T: 'a,
    {
        let before = self.vocab.len();
        for (token, count) in entries {
            let id = self.intern(token);
            self.counts[id] += count;
            self.document_counts[id] += 1;
            self.postings[id].push(key.clone());
        }
        self.vocab.len() - before
    }

    /// Retract a document previously added with the same entries.
    /// Ids stay allocated.
    pub fn sub_document<'a, I>(&mut self, key: &K, entries: I)
    where
        I: IntoIterator<Item = (&'a T, u64)>,
        T: 'a,
    {
        for (token, count) in entries {
            if let Some(id) = self.vocab.id(token) {
                self.counts[id] = self.counts[id].saturating_sub(count);
                self.document_counts[id] = self.document_counts[id].saturating_sub(1);
                self.postings[id].retain(|k| k != key);
            }
        }
    }

    /// Total occurrences of `token`, 0 if unknown
    pub fn count(&self, token: &T) -> u64 {
        self.vocab.id(token).map_or(0, |id| self.counts[id])
    }

    /// Number of documents containing `token`, 0 if unknown
    pub fn document_count(&self, token: &T) -> u64 {
        self.vocab.id(token).map_or(0, |id| self.document_counts[id])
    }

    /// Documents containing `token`
    pub fn papers_containing(&self, token: &T) -> HashSet<&K> {
        self.vocab
            .id(token)
            .map(|id| self.postings[id].iter().collect())
            .unwrap_or_default()
    }

    /// `n` highest-ranked tokens by the chosen aggregate, ties by token
    pub fn top(&self, n: usize, by: TopBy) -> Vec<(&T, u64)>
    where
        T: Ord,
    {
        let values = match by {
            TopBy::Counts => &self.counts,
            TopBy::DocumentCounts => &self.document_counts,
        };
        let pairs = self.vocab.iter().zip(values.iter().copied()).collect();
        top_n_by_value(pairs, n)
    }

    /// Apply `func(token, id, count, document_count)` once per vocabulary
    /// entry, in id order. `None` drops the entry.
    pub fn map_vocabulary<U, E, F>(&self, mut func: F) -> Result<Vec<Option<U>>, E>
    where
        F: FnMut(&T, usize, u64, u64) -> Result<Option<U>, E>,
    {
        self.vocab
            .iter()
            .enumerate()
            .map(|(id, token)| func(token, id, self.counts[id], self.document_counts[id]))
            .collect()
    }

    #[inline]
    pub fn id(&self, token: &T) -> Option<usize> {
        self.vocab.id(token)
    }

    #[inline]
    pub fn vocab(&self) -> &Vocabulary<T> {
        &self.vocab
    }

    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    #[inline]
    pub fn document_counts(&self) -> &[u64] {
        &self.document_counts
    }

    /// Get the current vocabulary size (number of unique tokens)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// All tokens in the corpus
    pub fn unique(&self) -> HashSet<&T> {
        self.vocab.iter().collect()
    }
}
