use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::hash::Hash;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::features::{config::TopBy, corpus::Corpus, structured::StructuredFeature, token::Feature, FeatureSet};

/// Corpus-level collection of `StructuredFeature`s
///
/// Aggregates are counted from the raw token streams. Membership is fixed
/// at construction; the vocabulary can only be reshaped into a new
/// `FeatureSet` through `transform`.
#[derive(Debug, Clone)]
pub struct StructuredFeatureSet<K = String, T = String>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    features: IndexMap<K, StructuredFeature<T>>,
    corpus: Corpus<K, T>,
    /// longest token stream
    n_features: usize,
}

impl<K, T> FromIterator<(K, StructuredFeature<T>)> for StructuredFeatureSet<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, StructuredFeature<T>)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<K, T> StructuredFeatureSet<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// Build the set and its aggregates
    /// A key given twice keeps the later feature.
    pub fn new<I>(features: I) -> Self
    where
        I: IntoIterator<Item = (K, StructuredFeature<T>)>,
    {
        let features: IndexMap<K, StructuredFeature<T>> = features.into_iter().collect();
        let mut corpus = Corpus::new();
        let mut n_features = 0;
        for (key, feature) in &features {
            let fresh = corpus.add_document(key, feature.to_feature().iter());
            n_features = n_features.max(feature.len());
            trace!(tokens = feature.len(), new_tokens = fresh, "structured document indexed");
        }
        debug!(
            documents = features.len(),
            vocab_size = corpus.vocab_size(),
            n_features,
            "structured feature set built"
        );
        Self {
            features,
            corpus,
            n_features,
        }
    }

    /// Occurrences of `token` across every stream, 0 if unknown
    pub fn count(&self, token: &T) -> u64 {
        self.corpus.count(token)
    }

    /// Number of documents whose stream contains `token`, 0 if unknown
    pub fn document_count(&self, token: &T) -> u64 {
        self.corpus.document_count(token)
    }

    /// Ids of documents whose stream contains `token`
    pub fn papers_containing(&self, token: &T) -> HashSet<&K> {
        self.corpus.papers_containing(token)
    }

    /// `n` highest-ranked tokens, ties by token order
    pub fn top(&self, n: usize, by: TopBy) -> Vec<(&T, u64)>
    where
        T: Ord,
    {
        self.corpus.top(n, by)
    }

    /// Map the vocabulary through `func(token, id, count, document_count)`
    ///
    /// `func` runs once per vocabulary entry. `Some(new)` replaces the
    /// token, merging counts when several tokens share a replacement;
    /// `None` drops it. Each stream is then re-scanned through the mapping
    /// into a new `FeatureSet`. Documents keep their place even when every
    /// token is dropped.
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
    pub fn try_transform<U, E, F>(&self, func: F) -> Result<FeatureSet<K, U>, E>
    where
        U: Eq + Hash + Clone,
        F: FnMut(&T, usize, u64, u64) -> Result<Option<U>, E>,
    {
        let mapping = self.corpus.map_vocabulary(func)?;
        let mut out = FeatureSet::new();
        for (key, feature) in &self.features {
            let mapped: Feature<U> = feature
                .tokens()
                .iter()
                .filter_map(|token| self.corpus.id(token).and_then(|id| mapping[id].clone()))
                .collect();
            out.add(key.clone(), mapped);
        }
        debug!(
            vocab_before = self.corpus.vocab_size(),
            vocab_after = out.index().len(),
            "structured feature set transformed"
        );
        Ok(out)
    }

    /// The plain aggregate view: one `Feature` per stream
    pub fn to_feature_set(&self) -> FeatureSet<K, T> {
        self.transform(|token, _, _, _| Some(token.clone()))
    }

    /// Chunks of `context` across the set
    ///
    /// # Returns
    /// * `Vec<&K>` - documents that define `context`, in set order
    /// * `Vec<&[T]>` - their chunks, document by document
    ///
    /// Documents without the context are skipped.
    pub fn context_chunks(&self, context: &str) -> (Vec<&K>, Vec<&[T]>) {
        let mut keys = Vec::new();
        let mut chunks = Vec::new();
        for (key, feature) in &self.features {
            if let Some(found) = feature.chunks(context) {
                keys.push(key);
                chunks.extend(found);
            }
        }
        debug!(context, documents = keys.len(), chunks = chunks.len(), "context chunks collected");
        (keys, chunks)
    }

    /// Token lists for an external topic-model corpus
    ///
    /// One list per chunk of `context`, or one per document when `context`
    /// is `None`. Tokens are rendered as text.
    pub fn to_gensim_corpus(&self, context: Option<&str>) -> Vec<Vec<String>>
    where
        T: ToString,
    {
        let render = |chunk: &[T]| chunk.iter().map(ToString::to_string).collect::<Vec<_>>();
        match context {
            Some(name) => self.context_chunks(name).1.into_iter().map(render).collect(),
            None => self.features.values().map(|f| render(f.tokens())).collect(),
        }
    }
}

/// Accessors
impl<K, T> StructuredFeatureSet<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// Number of documents
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Length of the longest token stream
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of documents
    pub fn n_documents(&self) -> usize {
        self.features.len()
    }

    pub fn feature(&self, key: &K) -> Option<&StructuredFeature<T>> {
        self.features.get(key)
    }

    pub fn features(&self) -> &IndexMap<K, StructuredFeature<T>> {
        &self.features
    }

    pub fn index(&self) -> &[T] {
        self.corpus.vocab().as_slice()
    }

    pub fn lookup(&self) -> &HashMap<T, usize> {
        self.corpus.vocab().lookup()
    }

    pub fn counts(&self) -> &[u64] {
        self.corpus.counts()
    }

    pub fn document_counts(&self) -> &[u64] {
        self.corpus.document_counts()
    }

    pub fn unique(&self) -> HashSet<&T> {
        self.corpus.unique()
    }
}
