/// This crate keeps token-frequency features for a corpus of documents.
pub mod error;
pub mod features;
pub mod utils;

/// Error type and Result alias
/// Every fallible operation in this crate returns `FeatureError`.
/// Looking up an unknown token is not an error; it answers 0.
pub use error::{FeatureError, Result};

/// Feature
/// Sparse token counts for one document, in first-seen order.
///
/// It can be built from a single token, a list of tokens (counted by
/// frequency) or a list of (token, count) pairs, and updated in place with
/// the same three shapes via `TokenInput`.
///
/// # Serialization
/// Supported.
pub use features::token::{Feature, TokenInput};

/// FeatureSet
/// The corpus-level collection of `Feature`s.
///
/// Internally, it holds:
/// - The registered Features, keyed by document id
/// - The vocabulary index (token <-> stable integer id)
/// - Total occurrence counts per token
/// - Document counts per token
/// - An inverted index from token to documents
///
/// `FeatureSet<K, T>` has the following generic parameters:
/// - `K`: Document key type (e.g., String, usize)
/// - `T`: Token type (e.g., String)
///
/// # Serialization
/// Supported. Aggregates are left out and rebuilt on load.
/// `FeatureSetData` is the plain snapshot form.
pub use features::FeatureSet;
pub use features::serde::FeatureSetData;

/// StructuredFeature
/// The full ordered token stream of one document, plus named contexts
/// (sentences, paragraphs, ...) that cut it into chunks.
pub use features::structured::StructuredFeature;

/// StructuredFeatureSet
/// The corpus-level collection of `StructuredFeature`s.
/// Supports context-scoped chunk extraction, vocabulary transformation into
/// a new `FeatureSet`, and export as a list of token lists for external
/// topic-model libraries.
pub use features::structured::StructuredFeatureSet;

/// Configuration values
/// - `TopBy`: ranking source for `top` (total counts or document counts)
/// - `SubtractPolicy`: clamp at zero or fail on underflow
pub use features::config::{SubtractPolicy, TopBy};
