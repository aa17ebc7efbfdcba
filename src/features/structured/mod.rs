pub mod set;

use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::features::token::Feature;

pub use set::StructuredFeatureSet;

/// StructuredFeature struct
/// The full token stream of one document plus named segmentations of it.
///
/// A context is a list of chunk-start offsets into the stream. It starts at
/// 0, never decreases, and stays inside the stream; chunk `i` spans from
/// offset `i` up to offset `i + 1`, the last chunk runs to the end. Contexts
/// are independent of each other, nesting is not checked.
///
/// # Examples
/// ```
/// use text_features::StructuredFeature;
/// let tokens: Vec<u32> = (0..50).collect();
/// let feature = StructuredFeature::new(tokens, [("sentence", vec![0, 20, 27, 34])]).unwrap();
///
/// let sentences = feature.chunks("sentence").unwrap();
/// assert_eq!(sentences.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![20, 7, 7, 16]);
/// assert_eq!(feature.chunk("sentence", 1).unwrap(), &(20..27).collect::<Vec<u32>>()[..]);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawStructuredFeature<T>")]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct StructuredFeature<T = String> {
    tokens: Vec<T>,
    contexts: IndexMap<String, Vec<usize>>,
}

/// unchecked wire form, validated on the way in
#[derive(Deserialize)]
struct RawStructuredFeature<T> {
    tokens: Vec<T>,
    contexts: IndexMap<String, Vec<usize>>,
}

impl<T> TryFrom<RawStructuredFeature<T>> for StructuredFeature<T> {
    type Error = FeatureError;

    fn try_from(raw: RawStructuredFeature<T>) -> Result<Self> {
        Self::new(raw.tokens, raw.contexts)
    }
}

impl<T> StructuredFeature<T> {
    /// Create a StructuredFeature from a token stream and its contexts
    ///
    /// # Errors
    /// Any context that `add_context` would reject.
    pub fn new<I, S>(tokens: Vec<T>, contexts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<usize>)>,
        S: Into<String>,
    {
        let mut feature = Self {
            tokens,
            contexts: IndexMap::new(),
        };
        for (name, indices) in contexts {
            feature.add_context(name, indices)?;
        }
        Ok(feature)
    }

    /// Attach a new named context
    ///
    /// # Errors
    /// - `FeatureError::DuplicateContext` if `name` is taken
    /// - `FeatureError::InvalidBoundaries` if `indices` is empty, does not
    ///   start at 0, or decreases
    /// - `FeatureError::BoundaryOutOfRange` if an index is past the stream
    pub fn add_context(&mut self, name: impl Into<String>, indices: Vec<usize>) -> Result<&mut Self> {
        let name = name.into();
        if self.contexts.contains_key(&name) {
            return Err(FeatureError::DuplicateContext { name });
        }
        match indices.first() {
            None => return Err(FeatureError::invalid_boundaries(name, "no boundaries given")),
            Some(&first) if first != 0 => {
                return Err(FeatureError::invalid_boundaries(
                    name,
                    format!("first boundary is {first}, expected 0"),
                ))
            }
            Some(_) => {}
        }
        if let Some(pos) = indices.windows(2).position(|w| w[1] < w[0]) {
            return Err(FeatureError::invalid_boundaries(
                name,
                format!("boundary {} decreases to {}", indices[pos], indices[pos + 1]),
            ));
        }
        // non-decreasing, so checking the last one is enough
        if let Some(&last) = indices.last() {
            if last > self.tokens.len() {
                return Err(FeatureError::BoundaryOutOfRange {
                    context: name,
                    index: last,
                    len: self.tokens.len(),
                });
            }
        }
        self.contexts.insert(name, indices);
        Ok(self)
    }

    /// All chunks of `context`, or `None` if it is not defined
    pub fn chunks(&self, context: &str) -> Option<Vec<&[T]>> {
        let indices = self.contexts.get(context)?;
        Some((0..indices.len()).map(|i| self.span(indices, i)).collect())
    }

    /// Chunk `i` of `context`, or `None` if either does not exist
    pub fn chunk(&self, context: &str, i: usize) -> Option<&[T]> {
        let indices = self.contexts.get(context)?;
        if i >= indices.len() {
            return None;
        }
        Some(self.span(indices, i))
    }

    #[inline]
    fn span(&self, indices: &[usize], i: usize) -> &[T] {
        let start = indices[i];
        let end = indices.get(i + 1).copied().unwrap_or(self.tokens.len());
        &self.tokens[start..end]
    }

    /// Number of chunks in `context`
    pub fn num_chunks(&self, context: &str) -> Option<usize> {
        self.contexts.get(context).map(Vec::len)
    }

    pub fn has_context(&self, context: &str) -> bool {
        self.contexts.contains_key(context)
    }

    /// Length of the token stream
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[T] {
        &self.tokens
    }

    pub fn contexts(&self) -> &IndexMap<String, Vec<usize>> {
        &self.contexts
    }

    pub fn context_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.contexts.keys().map(String::as_str)
    }

    /// Frequency view of the whole stream
    pub fn to_feature(&self) -> Feature<T>
    where
        T: Eq + Hash + Clone,
    {
        self.tokens.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuredFeature<u32> {
        StructuredFeature::new(
            (0..50).collect(),
            [("paragraph", vec![0, 27]), ("sentence", vec![0, 20, 27, 34])],
        )
        .unwrap()
    }

    #[test]
    fn init() {
        let feature = sample();
        assert_eq!(feature.len(), 50);
        assert_eq!(feature.contexts().len(), 2);
        assert_eq!(feature.context_names().collect::<Vec<_>>(), vec!["paragraph", "sentence"]);
    }

    #[test]
    fn select_context() {
        let feature = sample();
        let sentences = feature.chunks("sentence").unwrap();
        assert_eq!(sentences.len(), 4);
        assert_eq!(sentences.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![20, 7, 7, 16]);
        assert!(feature.chunks("chapter").is_none());
    }

    #[test]
    fn select_chunk() {
        let feature = sample();
        assert_eq!(feature.chunk("sentence", 0).unwrap().len(), 20);
        assert_eq!(feature.chunk("sentence", 1).unwrap(), &(20..27).collect::<Vec<u32>>()[..]);
        assert_eq!(feature.chunk("sentence", 3).unwrap().last(), Some(&49));
        assert!(feature.chunk("sentence", 4).is_none());
        assert!(feature.chunk("chapter", 0).is_none());
    }

    #[test]
    fn add_context() {
        let mut feature = sample();
        let before = feature.contexts().len();
        feature.add_context("orthogonal", vec![0, 5, 22, 38]).unwrap();
        assert!(feature.contexts().len() > before);

        assert_eq!(feature.chunks("orthogonal").unwrap().len(), 4);
        assert_eq!(feature.chunk("orthogonal", 1).unwrap().len(), 22 - 5);
        assert_eq!(feature.num_chunks("orthogonal"), Some(4));
    }

    #[test]
    fn add_context_validation() {
        let mut feature = sample();
        let err = feature.add_context("sentence", vec![0]).unwrap_err();
        assert_eq!(err, FeatureError::DuplicateContext { name: "sentence".to_string() });

        assert!(matches!(
            feature.add_context("a", vec![]),
            Err(FeatureError::InvalidBoundaries { .. })
        ));
        assert!(matches!(
            feature.add_context("b", vec![3, 10]),
            Err(FeatureError::InvalidBoundaries { .. })
        ));
        assert!(matches!(
            feature.add_context("c", vec![0, 10, 9]),
            Err(FeatureError::InvalidBoundaries { .. })
        ));
        assert_eq!(
            feature.add_context("d", vec![0, 51]).unwrap_err(),
            FeatureError::BoundaryOutOfRange { context: "d".to_string(), index: 51, len: 50 }
        );
        // rejected contexts leave no trace
        assert_eq!(feature.contexts().len(), 2);
    }

    #[test]
    fn repeated_boundaries_give_empty_chunks() {
        let feature = StructuredFeature::new(vec!['a', 'b', 'c'], [("s", vec![0, 0, 3])]).unwrap();
        let chunks = feature.chunks("s").unwrap();
        assert_eq!(chunks, vec![&[][..], &['a', 'b', 'c'][..], &[][..]]);
    }

    #[test]
    fn to_feature_counts_stream() {
        let feature = StructuredFeature::new(vec!["a", "b", "a"], Vec::<(String, Vec<usize>)>::new()).unwrap();
        let counts = feature.to_feature();
        assert_eq!(counts.value(&"a"), 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn deserialization_validates_contexts() {
        let ok: StructuredFeature<u32> =
            serde_json::from_str(r#"{"tokens":[1,2,3],"contexts":{"s":[0,2]}}"#).unwrap();
        assert_eq!(ok.chunk("s", 1).unwrap(), &[3u32]);

        let bad = serde_json::from_str::<StructuredFeature<u32>>(r#"{"tokens":[1,2,3],"contexts":{"s":[1]}}"#);
        assert!(bad.is_err());
    }
}
