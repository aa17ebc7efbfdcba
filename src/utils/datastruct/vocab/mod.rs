use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Append-only token table
///
/// `pool` holds tokens in id order, `lookup` is the reverse map.
/// Ids are handed out in first-seen order and are never freed, so an id
/// stays valid for the life of the table.
///
/// Only `pool` is serialized; `lookup` is rebuilt while deserializing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawVocabulary<T>")]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Eq + Hash + Clone"
))]
pub struct Vocabulary<T>
where
    T: Eq + Hash,
{
    pool: Vec<T>,
    #[serde(skip_serializing)]
    lookup: HashMap<T, usize>,
}

#[derive(Deserialize)]
struct RawVocabulary<T> {
    pool: Vec<T>,
}

impl<T> TryFrom<RawVocabulary<T>> for Vocabulary<T>
where
    T: Eq + Hash + Clone,
{
    type Error = FeatureError;

    /// A repeated token would shift every later id, so it is rejected.
    fn try_from(raw: RawVocabulary<T>) -> Result<Self, FeatureError> {
        let mut vocab = Self::new();
        for (id, token) in raw.pool.iter().enumerate() {
            if !vocab.intern(token).1 {
                return Err(FeatureError::serialization(format!(
                    "vocabulary entry {id} repeats an earlier token"
                )));
            }
        }
        Ok(vocab)
    }
}

impl<T> Default for Vocabulary<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self {
            pool: Vec::new(),
            lookup: HashMap::new(),
        }
    }
}

impl<T> Vocabulary<T>
where
    T: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from tokens already in id order.
    /// Repeated tokens keep their first id.
    pub fn from_ordered<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut vocab = Self::new();
        for token in tokens {
            vocab.intern(&token);
        }
        vocab
    }

    /// Return the id of `token`, allocating the next one if unseen.
    /// The bool is true when a new id was allocated.
    pub fn intern(&mut self, token: &T) -> (usize, bool) {
        if let Some(&id) = self.lookup.get(token) {
            return (id, false);
        }
        let id = self.pool.len();
        self.pool.push(token.clone());
        self.lookup.insert(token.clone(), id);
        (id, true)
    }

    #[inline]
    pub fn id(&self, token: &T) -> Option<usize> {
        self.lookup.get(token).copied()
    }

    #[inline]
    pub fn token(&self, id: usize) -> Option<&T> {
        self.pool.get(id)
    }

    #[inline]
    pub fn contains(&self, token: &T) -> bool {
        self.lookup.contains_key(token)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Tokens in id order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.pool.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.pool
    }

    pub fn lookup(&self) -> &HashMap<T, usize> {
        &self.lookup
    }
}
