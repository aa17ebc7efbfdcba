//! Property-based tests using proptest

use std::collections::HashMap;

use proptest::prelude::*;
use text_features::*;

fn token() -> impl Strategy<Value = String> {
    "[a-f]{1,2}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_feature_counts_match_token_list(tokens in prop::collection::vec(token(), 0..60)) {
        let feature = Feature::from_tokens(tokens.clone());

        let mut expected: HashMap<&String, u64> = HashMap::new();
        for t in &tokens {
            *expected.entry(t).or_insert(0) += 1;
        }
        prop_assert_eq!(feature.len(), expected.len());
        prop_assert_eq!(feature.total(), tokens.len() as u64);
        for (t, c) in expected {
            prop_assert_eq!(feature.value(t), c);
        }
    }

    #[test]
    fn test_norm_sums_to_one(tokens in prop::collection::vec(token(), 1..60)) {
        let feature = Feature::from_tokens(tokens);
        let sum: f64 = feature.norm().unwrap().iter().map(|(_, v)| v).sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "norm sums to {}", sum);
    }

    #[test]
    fn test_three_input_shapes_are_equivalent(
        base in prop::collection::vec(token(), 0..20),
        t in token(),
        k in 1u64..5
    ) {
        let mut by_pairs = Feature::from_tokens(base.clone());
        let mut by_list = by_pairs.clone();
        let mut by_token = by_pairs.clone();

        by_pairs.merge_add(TokenInput::Counts(vec![(t.clone(), k)]));
        by_list.merge_add(TokenInput::Tokens(vec![t.clone(); k as usize]));
        for _ in 0..k {
            by_token.merge_add(TokenInput::Token(t.clone()));
        }
        prop_assert_eq!(&by_pairs, &by_list);
        prop_assert_eq!(&by_pairs, &by_token);

        by_pairs.merge_subtract(TokenInput::Counts(vec![(t.clone(), k)]));
        by_list.merge_subtract(TokenInput::Tokens(vec![t.clone(); k as usize]));
        for _ in 0..k {
            by_token.merge_subtract(TokenInput::Token(t.clone()));
        }
        let original = Feature::from_tokens(base);
        prop_assert_eq!(by_pairs.value(&t), original.value(&t));
        prop_assert_eq!(&by_pairs, &by_list);
        prop_assert_eq!(&by_pairs, &by_token);
    }

    #[test]
    fn test_feature_set_aggregates_are_sums(
        docs in prop::collection::vec(prop::collection::vec(token(), 0..15), 1..8)
    ) {
        let features: Vec<Feature> = docs.iter().cloned().map(Feature::from_tokens).collect();
        let set: FeatureSet<usize, String> = features.iter().cloned().enumerate().collect();

        let n = set.index().len();
        prop_assert_eq!(set.lookup().len(), n);
        prop_assert_eq!(set.counts().len(), n);
        prop_assert_eq!(set.document_counts().len(), n);

        for token in set.index() {
            let count: u64 = features.iter().map(|f| f.value(token)).sum();
            let docs = features.iter().filter(|f| f.contains(token)).count() as u64;
            prop_assert_eq!(set.count(token), count);
            prop_assert_eq!(set.document_count(token), docs);
            prop_assert_eq!(set.papers_containing(token).len() as u64, docs);
        }

        let matrix: Vec<Vec<u64>> = set.as_matrix().unwrap();
        prop_assert_eq!(matrix.len(), set.len());
        for (row, feature) in matrix.iter().zip(&features) {
            prop_assert_eq!(row.len(), n);
            prop_assert_eq!(row.iter().sum::<u64>(), feature.total());
        }
    }

    #[test]
    fn test_top_is_sorted_and_bounded(
        docs in prop::collection::vec(prop::collection::vec(token(), 1..15), 1..8),
        n in 0usize..40
    ) {
        let set: FeatureSet<usize, String> = docs
            .into_iter()
            .map(Feature::from_tokens)
            .enumerate()
            .collect();
        for by in [TopBy::Counts, TopBy::DocumentCounts] {
            let top = set.top(n, by);
            prop_assert_eq!(top.len(), n.min(set.index().len()));
            for w in top.windows(2) {
                prop_assert!(w[0].1 > w[1].1 || (w[0].1 == w[1].1 && w[0].0 < w[1].0));
            }
        }
    }

    #[test]
    fn test_chunks_partition_stream(
        len in 0usize..80,
        cuts in prop::collection::vec(0usize..80, 0..10)
    ) {
        let mut bounds: Vec<usize> = cuts.into_iter().filter(|&c| c <= len).collect();
        bounds.push(0);
        bounds.sort_unstable();
        let tokens: Vec<usize> = (0..len).collect();
        let feature = StructuredFeature::new(tokens.clone(), [("s", bounds.clone())]).unwrap();

        let chunks = feature.chunks("s").unwrap();
        prop_assert_eq!(chunks.len(), bounds.len());
        let joined: Vec<usize> = chunks.concat();
        prop_assert_eq!(joined, tokens);
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(feature.chunk("s", i).unwrap(), *chunk);
        }
    }

    #[test]
    fn test_feature_invariants_survive_serde(
        adds in prop::collection::vec((token(), 1u64..20), 0..30),
        subs in prop::collection::vec((token(), 1u64..20), 0..30)
    ) {
        let mut feature = Feature::from_counts(adds);
        feature.merge_subtract(TokenInput::Counts(subs));

        let json = serde_json::to_string(&feature).unwrap();
        let back: Feature = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&back, &feature);
        prop_assert!(back.iter().all(|(_, c)| c > 0));
        prop_assert_eq!(back.total(), back.iter().map(|(_, c)| c).sum::<u64>());
    }

    #[test]
    fn test_feature_set_snapshot_round_trip(
        docs in prop::collection::vec(prop::collection::vec(token(), 0..15), 1..8),
        replaced in prop::collection::vec(token(), 0..10)
    ) {
        let mut set: FeatureSet<usize, String> = docs
            .into_iter()
            .map(Feature::from_tokens)
            .enumerate()
            .collect();
        // a replacement can leave ids with zero counts behind
        set.add(0, Feature::from_tokens(replaced));

        let back = FeatureSet::<usize, String>::from_cbor(&set.to_cbor().unwrap()).unwrap();
        prop_assert_eq!(back.index(), set.index());
        prop_assert_eq!(back.counts(), set.counts());
        prop_assert_eq!(back.document_counts(), set.document_counts());
        for (key, feature) in back.features() {
            prop_assert_eq!(Some(feature), set.feature(key));
            prop_assert!(feature.iter().all(|(_, c)| c > 0));
            prop_assert_eq!(feature.total(), feature.iter().map(|(_, c)| c).sum::<u64>());
        }
        for token in back.index() {
            let holders = back.features().values().filter(|f| f.contains(token)).count();
            prop_assert_eq!(back.papers_containing(token).len(), holders);
        }
    }

    #[test]
    fn test_transform_never_grows_vocabulary(
        docs in prop::collection::vec(prop::collection::vec(0u32..50, 1..30), 1..5),
        modulus in 1u32..10
    ) {
        let set = StructuredFeatureSet::new(
            docs.into_iter()
                .enumerate()
                .map(|(i, tokens)| (i, StructuredFeature::new(tokens, [("all", vec![0])]).unwrap())),
        );
        let reduced = set.transform(|t, _, _, _| Some(t % modulus));
        prop_assert!(reduced.index().len() <= set.index().len());
        prop_assert!(reduced.index().len() <= modulus as usize);
        let before: u64 = set.counts().iter().sum();
        let after: u64 = reduced.counts().iter().sum();
        prop_assert_eq!(before, after);

        let (papers, chunks) = set.context_chunks("all");
        prop_assert_eq!(papers.len(), set.len());
        prop_assert_eq!(chunks.len(), set.len());
    }
}
