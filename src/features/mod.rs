pub mod config;
pub mod corpus;
pub mod serde;
pub mod structured;
pub mod token;

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use num::{FromPrimitive, Num};
use tracing::debug;

use crate::error::{FeatureError, Result};
use crate::features::{config::TopBy, corpus::Corpus, token::Feature};
use crate::utils::datastruct::vocab::Vocabulary;

/// Corpus-level collection of `Feature`s
///
/// `FeatureSet<K, T>` has the following generic parameters:
/// - `K`: Document key type (e.g., String, usize)
/// - `T`: Token type (e.g., String, or a tuple for composite tokens)
///
/// Every registered document shares one vocabulary index. Ids are handed
/// out in order of first appearance and never reassigned.
#[derive(Debug, Clone)]
pub struct FeatureSet<K = String, T = String>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// Document's Feature, in registration order
    pub(crate) features: IndexMap<K, Feature<T>>,
    /// vocabulary index and aggregates
    pub(crate) corpus: Corpus<K, T>,
}

impl<K, T> Default for FeatureSet<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self {
            features: IndexMap::new(),
            corpus: Corpus::new(),
        }
    }
}

impl<K, T> FromIterator<(K, Feature<T>)> for FeatureSet<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, Feature<T>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, feature) in iter {
            set.add(key, feature);
        }
        set
    }
}

impl<K, T> FeatureSet<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// Create an empty FeatureSet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FeatureSet whose ids start from an existing vocabulary order
    pub fn with_vocabulary<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            features: IndexMap::new(),
            corpus: Corpus::from_vocabulary(Vocabulary::from_ordered(tokens)),
        }
    }

    /// Register `feature` under `key`
    ///
    /// Unseen tokens get the next free ids. Each token adds its count to
    /// `counts` and exactly one to `document_counts`.
    /// An already registered key is replaced: its old contribution is
    /// retracted first, the document moves to the end of the row order, and
    /// the old Feature is returned.
    pub fn add(&mut self, key: K, feature: Feature<T>) -> Option<Feature<T>> {
        let replaced = self.features.shift_remove(&key);
        if let Some(old) = &replaced {
            self.corpus.sub_document(&key, old.iter());
            debug!(tokens = old.len(), "replacing registered document");
        }
        let fresh = self.corpus.add_document(&key, feature.iter());
        debug!(
            tokens = feature.len(),
            new_tokens = fresh,
            vocab_size = self.corpus.vocab_size(),
            "document added to feature set"
        );
        self.features.insert(key, feature);
        replaced
    }

    /// Total occurrences of `token` across all documents, 0 if unknown
    pub fn count(&self, token: &T) -> u64 {
        self.corpus.count(token)
    }

    /// Number of documents containing `token`, 0 if unknown
    pub fn document_count(&self, token: &T) -> u64 {
        self.corpus.document_count(token)
    }

    /// Ids of the documents whose Feature contains `token`
    pub fn papers_containing(&self, token: &T) -> HashSet<&K> {
        self.corpus.papers_containing(token)
    }

    /// `n` tokens with the largest aggregate value
    ///
    /// Ties are broken by token order. `n` beyond the vocabulary size
    /// returns the whole vocabulary, ranked.
    pub fn top(&self, n: usize, by: TopBy) -> Vec<(&T, u64)>
    where
        T: Ord,
    {
        self.corpus.top(n, by)
    }

    /// Dense document x vocabulary count matrix
    ///
    /// Rows follow registration order, columns follow vocabulary ids.
    ///
    /// # Errors
    /// `FeatureError::NumericCast` if a count does not fit `N`
    pub fn as_matrix<N>(&self) -> Result<Vec<Vec<N>>>
    where
        N: Num + Copy + FromPrimitive,
    {
        self.features
            .values()
            .map(|feature| self.dense_row(feature))
            .collect()
    }

    fn dense_row<N>(&self, feature: &Feature<T>) -> Result<Vec<N>>
    where
        N: Num + Copy + FromPrimitive,
    {
        let mut row = vec![N::zero(); self.corpus.vocab_size()];
        for (token, count) in feature.iter() {
            if let Some(id) = self.corpus.id(token) {
                row[id] = N::from_u64(count).ok_or(FeatureError::NumericCast { value: count })?;
            }
        }
        Ok(row)
    }

    /// One row of `as_matrix`, as f64
    ///
    /// With `norm` the entries are divided by the document's total and sum
    /// to 1.0.
    ///
    /// # Errors
    /// - `FeatureError::UnknownDocument` if `key` is not registered
    /// - `FeatureError::ZeroTotal` if `norm` is set and the document is empty
    pub fn as_vector(&self, key: &K, norm: bool) -> Result<Vec<f64>>
    where
        K: Debug,
    {
        let feature = self.get_registered(key)?;
        let mut row: Vec<f64> = self.dense_row(feature)?;
        if norm {
            if feature.total() == 0 {
                return Err(FeatureError::ZeroTotal);
            }
            let total = feature.total() as f64;
            row.iter_mut().for_each(|v| *v /= total);
        }
        Ok(row)
    }

    /// (id, count) entries of one document, sorted by id
    pub fn indexed_counts(&self, key: &K) -> Result<Vec<(usize, u64)>>
    where
        K: Debug,
    {
        let feature = self.get_registered(key)?;
        let mut entries: Vec<(usize, u64)> = feature
            .iter()
            .filter_map(|(token, count)| self.corpus.id(token).map(|id| (id, count)))
            .collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        Ok(entries)
    }

    fn get_registered(&self, key: &K) -> Result<&Feature<T>>
    where
        K: Debug,
    {
        self.features
            .get(key)
            .ok_or_else(|| FeatureError::UnknownDocument(format!("{:?}", key)))
    }

    /// Map the vocabulary through `func(token, id, count, document_count)`
    ///
    /// `func` runs once per vocabulary entry. `Some(new)` renames the token
    /// (several tokens may merge into one), `None` drops it. The result is
    /// a new set with every document's counts re-accumulated through the
    /// mapping; `self` is untouched.
    pub fn transform<U, F>(&self, mut func: F) -> FeatureSet<K, U>
    where
        U: Eq + Hash + Clone,
        F: FnMut(&T, usize, u64, u64) -> Option<U>,
    {
        match self.try_transform(|t, id, c, dc| Ok::<_, Infallible>(func(t, id, c, dc))) {
            Ok(set) => set,
            Err(never) => match never {},
        }
    }

    /// `transform` with a fallible function; its error is returned as is
    pub fn try_transform<U, E, F>(&self, func: F) -> std::result::Result<FeatureSet<K, U>, E>
    where
        U: Eq + Hash + Clone,
        F: FnMut(&T, usize, u64, u64) -> std::result::Result<Option<U>, E>,
    {
        let mapping = self.corpus.map_vocabulary(func)?;
        let mut out = FeatureSet::new();
        for (key, feature) in &self.features {
            let mut mapped = Feature::default();
            for (token, count) in feature.iter() {
                if let Some(Some(new_token)) = self.corpus.id(token).map(|id| &mapping[id]) {
                    mapped.add_count(new_token.clone(), count);
                }
            }
            out.add(key.clone(), mapped);
        }
        debug!(
            vocab_before = self.corpus.vocab_size(),
            vocab_after = out.corpus.vocab_size(),
            "feature set transformed"
        );
        Ok(out)
    }
}

/// Accessors
impl<K, T> FeatureSet<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// Number of registered documents
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains_document(&self, key: &K) -> bool {
        self.features.contains_key(key)
    }

    pub fn feature(&self, key: &K) -> Option<&Feature<T>> {
        self.features.get(key)
    }

    pub fn features(&self) -> &IndexMap<K, Feature<T>> {
        &self.features
    }

    /// id -> token, in id order
    pub fn index(&self) -> &[T] {
        self.corpus.vocab().as_slice()
    }

    /// Same as `index`; the order external vocabulary files use
    pub fn vocabulary(&self) -> &[T] {
        self.index()
    }

    /// token -> id
    pub fn lookup(&self) -> &HashMap<T, usize> {
        self.corpus.vocab().lookup()
    }

    /// total occurrences, indexed by id
    pub fn counts(&self) -> &[u64] {
        self.corpus.counts()
    }

    /// document breadth, indexed by id
    pub fn document_counts(&self) -> &[u64] {
        self.corpus.document_counts()
    }

    pub fn unique(&self) -> HashSet<&T> {
        self.corpus.unique()
    }

    pub fn id(&self, token: &T) -> Option<usize> {
        self.corpus.id(token)
    }

    pub fn token(&self, id: usize) -> Option<&T> {
        self.corpus.vocab().token(id)
    }
}
