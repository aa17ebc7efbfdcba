use std::hash::Hash;

use ::serde::{
    de::DeserializeOwned, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer,
};

use crate::error::Result;
use crate::features::{token::Feature, FeatureSet};

/// Snapshot form of a `FeatureSet`
/// It holds only the vocabulary order and the documents; aggregates are
/// rebuilt by `into_feature_set`, which hands out the same ids again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize, T: Serialize",
    deserialize = "K: Deserialize<'de>, T: Deserialize<'de> + Eq + Hash"
))]
pub struct FeatureSetData<K, T>
where
    T: Eq + Hash,
{
    /// tokens in id order
    pub index: Vec<T>,
    /// documents in registration order
    pub documents: Vec<(K, Feature<T>)>,
}

impl<K, T> FeatureSetData<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    /// Rebuild the `FeatureSet`, aggregates included.
    pub fn into_feature_set(self) -> FeatureSet<K, T> {
        let mut set = FeatureSet::with_vocabulary(self.index);
        for (key, feature) in self.documents {
            set.add(key, feature);
        }
        set
    }
}

impl<K, T> From<&FeatureSet<K, T>> for FeatureSetData<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone,
{
    fn from(set: &FeatureSet<K, T>) -> Self {
        Self {
            index: set.index().to_vec(),
            documents: set
                .features
                .iter()
                .map(|(key, feature)| (key.clone(), feature.clone()))
                .collect(),
        }
    }
}

/// documents as a (key, feature) sequence, same layout as `FeatureSetData`
struct DocumentSeq<'a, K, T>(&'a FeatureSet<K, T>)
where
    K: Eq + Hash + Clone,
    T: Eq + Hash + Clone;

impl<K, T> Serialize for DocumentSeq<'_, K, T>
where
    K: Eq + Hash + Clone + Serialize,
    T: Eq + Hash + Clone + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.features.iter())
    }
}

impl<K, T> Serialize for FeatureSet<K, T>
where
    K: Eq + Hash + Clone + Serialize,
    T: Eq + Hash + Clone + Serialize,
{
    /// Aggregates are derived data and are left out.
    /// Deserialize through `FeatureSetData`.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("FeatureSetData", 2)?;
        state.serialize_field("index", self.index())?;
        state.serialize_field("documents", &DocumentSeq(self))?;
        state.end()
    }
}

impl<'de, K, T> Deserialize<'de> for FeatureSet<K, T>
where
    K: Eq + Hash + Clone + Deserialize<'de>,
    T: Eq + Hash + Clone + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        FeatureSetData::deserialize(deserializer).map(FeatureSetData::into_feature_set)
    }
}

impl<K, T> FeatureSet<K, T>
where
    K: Eq + Hash + Clone + Serialize,
    T: Eq + Hash + Clone + Serialize,
{
    /// Encode as CBOR
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }
}

impl<K, T> FeatureSet<K, T>
where
    K: Eq + Hash + Clone + DeserializeOwned,
    T: Eq + Hash + Clone + DeserializeOwned,
{
    /// Decode from CBOR produced by `to_cbor`
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}
