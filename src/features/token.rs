use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::features::config::SubtractPolicy;
use crate::utils::sort::top_n_by_value;

/// The three shapes a count delta can take
///
/// Deserializes untagged, so `"bob"`, `["bob", "joe"]` and
/// `[["bob", 3], ["joe", 1]]` are all accepted. Any other shape is rejected
/// by the deserializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenInput<T> {
    /// (token, count) pairs
    Counts(Vec<(T, u64)>),
    /// tokens, counted by frequency
    Tokens(Vec<T>),
    /// a single occurrence of one token
    Token(T),
}

impl<T> TokenInput<T> {
    fn into_pairs(self) -> Vec<(T, u64)> {
        match self {
            TokenInput::Counts(pairs) => pairs,
            TokenInput::Tokens(tokens) => tokens.into_iter().map(|t| (t, 1)).collect(),
            TokenInput::Token(token) => vec![(token, 1)],
        }
    }
}

/// Feature struct
/// Sparse token counts for a single document.
///
/// Entries keep first-seen order. A token whose count drops to zero is
/// removed, so every stored count is positive.
///
/// # Examples
/// ```
/// use text_features::Feature;
/// let mut feature = Feature::from_tokens(["bob", "joe", "bob"]);
/// feature.merge_add(text_features::TokenInput::Token("bob"));
///
/// assert_eq!(feature.value(&"bob"), 3);
/// assert_eq!(feature.len(), 2);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawFeature<T>")]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Eq + Hash"
))]
pub struct Feature<T = String>
where
    T: Eq + Hash,
{
    #[serde(with = "indexmap::map::serde_seq")]
    counts: IndexMap<T, u64>,
    /// derived from `counts`, recomputed on load
    #[serde(skip_serializing)]
    total: u64,
}

/// unchecked wire form, validated on the way in
#[derive(Deserialize)]
struct RawFeature<T> {
    counts: Vec<(T, u64)>,
}

impl<T> TryFrom<RawFeature<T>> for Feature<T>
where
    T: Eq + Hash,
{
    type Error = FeatureError;

    fn try_from(raw: RawFeature<T>) -> Result<Self> {
        let mut feature = Self::default();
        for (pos, (token, count)) in raw.counts.into_iter().enumerate() {
            if count == 0 {
                return Err(FeatureError::invalid_counts(format!("entry {pos} has a zero count")));
            }
            if feature.counts.contains_key(&token) {
                return Err(FeatureError::invalid_counts(format!(
                    "entry {pos} repeats an earlier token"
                )));
            }
            feature.total = feature.total.checked_add(count).ok_or_else(|| {
                FeatureError::invalid_counts(format!("total overflows at entry {pos}"))
            })?;
            feature.counts.insert(token, count);
        }
        Ok(feature)
    }
}

impl<T> Default for Feature<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Feature {
            counts: IndexMap::new(),
            total: 0,
        }
    }
}

/// Construction
impl<T> Feature<T>
where
    T: Eq + Hash,
{
    /// Create a Feature from any accepted input shape
    pub fn new(input: TokenInput<T>) -> Self {
        let mut feature = Self::default();
        feature.merge_add(input);
        feature
    }

    /// A single occurrence of `token`
    pub fn from_token(token: T) -> Self {
        Self::new(TokenInput::Token(token))
    }

    /// Count a token list by frequency
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        tokens.into_iter().collect()
    }

    /// Take (token, count) pairs; repeated tokens are summed
    pub fn from_counts<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, u64)>,
    {
        let mut feature = Self::default();
        for (token, count) in pairs {
            feature.add_count(token, count);
        }
        feature
    }
}

impl<T> FromIterator<T> for Feature<T>
where
    T: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut feature = Self::default();
        for token in iter {
            feature.add_count(token, 1);
        }
        feature
    }
}

/// Count deltas
impl<T> Feature<T>
where
    T: Eq + Hash,
{
    /// Add `n` occurrences of `token`
    #[inline]
    pub fn add_count(&mut self, token: T, n: u64) -> &mut Self {
        if n == 0 {
            return self;
        }
        *self.counts.entry(token).or_insert(0) += n;
        self.total += n;
        self
    }

    /// Remove up to `n` occurrences of `token`, stopping at zero
    ///
    /// # Returns
    /// * `u64` - how many occurrences were actually removed
    #[inline]
    pub fn sub_count(&mut self, token: &T, n: u64) -> u64 {
        let Some(count) = self.counts.get_mut(token) else {
            return 0;
        };
        let taken = n.min(*count);
        *count -= taken;
        self.total -= taken;
        if *count == 0 {
            self.counts.shift_remove(token);
        }
        taken
    }

    /// Merge `input` into the stored counts, creating unseen entries
    pub fn merge_add(&mut self, input: TokenInput<T>) -> &mut Self {
        for (token, n) in input.into_pairs() {
            self.add_count(token, n);
        }
        self
    }

    /// Same as `merge_add`
    pub fn extend(&mut self, input: TokenInput<T>) -> &mut Self {
        self.merge_add(input)
    }

    /// Subtract `input` from the stored counts, clamping at zero
    pub fn merge_subtract(&mut self, input: TokenInput<T>) -> &mut Self {
        for (token, n) in input.into_pairs() {
            self.sub_count(&token, n);
        }
        self
    }

    /// Subtract `input` under an explicit policy
    ///
    /// With `SubtractPolicy::Strict` the whole delta is checked first; on
    /// underflow nothing is changed.
    pub fn merge_subtract_with(
        &mut self,
        input: TokenInput<T>,
        policy: SubtractPolicy,
    ) -> Result<&mut Self>
    where
        T: Debug,
    {
        let pairs = input.into_pairs();
        if policy == SubtractPolicy::Strict {
            let mut wanted: IndexMap<&T, u64> = IndexMap::new();
            for (token, n) in &pairs {
                *wanted.entry(token).or_insert(0) += *n;
            }
            for (token, requested) in wanted {
                let have = self.value(token);
                if requested > have {
                    return Err(FeatureError::Underflow {
                        token: format!("{:?}", token),
                        have,
                        requested,
                    });
                }
            }
        }
        for (token, n) in pairs {
            self.sub_count(&token, n);
        }
        Ok(self)
    }
}

/// Reads
impl<T> Feature<T>
where
    T: Eq + Hash,
{
    /// Count for `token`, 0 if absent
    #[inline]
    pub fn value(&self, token: &T) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Normalized counts in stored order; values sum to 1.0
    ///
    /// # Errors
    /// `FeatureError::ZeroTotal` when the feature holds no occurrences
    pub fn norm(&self) -> Result<Vec<(&T, f64)>> {
        if self.total == 0 {
            return Err(FeatureError::ZeroTotal);
        }
        let total = self.total as f64;
        Ok(self
            .counts
            .iter()
            .map(|(token, &count)| (token, count as f64 / total))
            .collect())
    }

    /// Sum of all counts
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct tokens
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    pub fn contains(&self, token: &T) -> bool {
        self.counts.contains_key(token)
    }

    /// (token, count) pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&T, u64)> + '_ {
        self.counts.iter().map(|(token, &count)| (token, count))
    }

    /// Tokens in first-seen order
    pub fn tokens(&self) -> impl Iterator<Item = &T> + '_ {
        self.counts.keys()
    }

    /// Set of distinct tokens
    pub fn unique(&self) -> HashSet<&T> {
        self.counts.keys().collect()
    }

    /// `n` most frequent tokens, ties broken by token order
    pub fn top(&self, n: usize) -> Vec<(&T, u64)>
    where
        T: Ord,
    {
        top_n_by_value(self.iter().collect(), n)
    }
}
