//! Result fusion strategies
//!
//! Merges the lexical and vector rankings into one list keyed by document
//! id. Reciprocal Rank Fusion works on ranks alone and needs no calibration
//! across the two score scales; weighted fusion min-max normalizes each
//! source list before mixing, since the raw scores are not comparable.

use std::collections::HashMap;

use crate::config::FusionConfig;
use crate::types::{Candidate, DocId, FusionMethod, SearchSource};

/// Resolved fusion parameters for one call
#[derive(Debug, Clone)]
pub struct FusionParams {
    pub method: FusionMethod,
    /// RRF smoothing constant
    pub k0: f32,
    pub weight_lexical: f32,
    pub weight_vector: f32,
    pub top_k: usize,
}

impl FusionParams {
    pub fn new(config: &FusionConfig, method: FusionMethod, top_k: usize) -> Self {
        Self {
            method,
            k0: config.rrf_k0,
            weight_lexical: config.weight_lexical,
            weight_vector: config.weight_vector,
            top_k,
        }
    }
}

/// Fuse two ranked candidate lists into one.
///
/// The merge upserts by document id, lexical list first, preserving
/// first-seen insertion order. Ties on the fused score keep that insertion
/// order (the sort is stable), so the output is deterministic regardless of
/// which retrieval call finished first. Output carries a dense 1-based
/// `fused_rank` and is truncated to `top_k`.
pub fn fuse(lexical: &[Candidate], vector: &[Candidate], params: &FusionParams) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::with_capacity(lexical.len() + vector.len());
    let mut by_id: HashMap<DocId, usize> = HashMap::new();

    fold_list(&mut merged, &mut by_id, lexical, SearchSource::Lexical);
    fold_list(&mut merged, &mut by_id, vector, SearchSource::Vector);

    match params.method {
        FusionMethod::Rrf => {
            for candidate in &mut merged {
                let score: f32 = candidate
                    .source_ranks
                    .values()
                    .map(|&rank| 1.0 / (params.k0 + rank as f32))
                    .sum();
                candidate.fused_score = Some(score);
            }
        }
        FusionMethod::Weighted => {
            let lexical_range = score_range(lexical, SearchSource::Lexical);
            let vector_range = score_range(vector, SearchSource::Vector);
            for candidate in &mut merged {
                let n_lexical =
                    normalized_score(candidate, SearchSource::Lexical, lexical_range);
                let n_vector = normalized_score(candidate, SearchSource::Vector, vector_range);
                candidate.fused_score = Some(
                    params.weight_lexical * n_lexical + params.weight_vector * n_vector,
                );
            }
        }
    }

    // Stable sort: equal scores keep first-seen insertion order
    merged.sort_by(|a, b| {
        b.fused_score
            .unwrap_or(0.0)
            .total_cmp(&a.fused_score.unwrap_or(0.0))
    });
    merged.truncate(params.top_k);
    for (i, candidate) in merged.iter_mut().enumerate() {
        candidate.fused_rank = Some(i + 1);
    }

    merged
}

/// Upsert one source's ranking into the merged list, recording that
/// source's rank and raw score per document.
fn fold_list(
    merged: &mut Vec<Candidate>,
    by_id: &mut HashMap<DocId, usize>,
    list: &[Candidate],
    source: SearchSource,
) {
    for (i, hit) in list.iter().enumerate() {
        let rank = hit.source_ranks.get(&source).copied().unwrap_or(i + 1);
        let score = hit.source_scores.get(&source).copied().unwrap_or(0.0);

        match by_id.get(&hit.id) {
            Some(&idx) => {
                let row = &mut merged[idx];
                // text is first-non-empty-wins, never overwritten once set
                if row.text.as_deref().is_none_or(str::is_empty) {
                    if let Some(text) = &hit.text {
                        if !text.is_empty() {
                            row.text = Some(text.clone());
                        }
                    }
                }
                if row.title.is_none() {
                    row.title = hit.title.clone();
                }
                if row.tags.is_empty() {
                    row.tags = hit.tags.clone();
                }
                if row.created_at.is_none() {
                    row.created_at = hit.created_at;
                }
                if row.meta.is_none() {
                    row.meta = hit.meta.clone();
                }
                row.source_ranks.insert(source, rank);
                row.source_scores.insert(source, score);
            }
            None => {
                let mut row = hit.clone();
                row.source_ranks.insert(source, rank);
                row.source_scores.insert(source, score);
                by_id.insert(row.id.clone(), merged.len());
                merged.push(row);
            }
        }
    }
}

/// Min and max raw score over one source list, if non-empty
fn score_range(list: &[Candidate], source: SearchSource) -> Option<(f32, f32)> {
    let scores: Vec<f32> = list
        .iter()
        .filter_map(|c| c.source_scores.get(&source).copied())
        .collect();
    if scores.is_empty() {
        return None;
    }
    let min = scores.iter().copied().fold(f32::MAX, f32::min);
    let max = scores.iter().copied().fold(f32::MIN, f32::max);
    Some((min, max))
}

/// Min-max normalize a candidate's raw score for one source.
///
/// A candidate absent from the source contributes 0. A degenerate list
/// (zero score range) normalizes to 1.0.
fn normalized_score(
    candidate: &Candidate,
    source: SearchSource,
    range: Option<(f32, f32)>,
) -> f32 {
    let Some(score) = candidate.source_scores.get(&source).copied() else {
        return 0.0;
    };
    let Some((min, max)) = range else {
        return 0.0;
    };
    let span = max - min;
    if span > 0.0 {
        (score - min) / span
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndexRow;

    fn hit(id: &str, source: SearchSource, rank: usize, score: f32) -> Candidate {
        Candidate::from_row(
            IndexRow {
                id: id.to_string(),
                text: Some(format!("text {}", id)),
                title: None,
                tags: Vec::new(),
                score: Some(score),
                created_at: None,
                meta: None,
            },
            source,
            rank,
        )
    }

    fn rrf_params(top_k: usize) -> FusionParams {
        FusionParams::new(&FusionConfig::default(), FusionMethod::Rrf, top_k)
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn rrf_reference_scenario() {
        // lexical: [1, 2], vector: [2, 3], k0 = 60
        let lexical = vec![
            hit("1", SearchSource::Lexical, 1, 9.0),
            hit("2", SearchSource::Lexical, 2, 7.0),
        ];
        let vector = vec![
            hit("2", SearchSource::Vector, 1, 0.9),
            hit("3", SearchSource::Vector, 2, 0.8),
        ];

        let fused = fuse(&lexical, &vector, &rrf_params(10));

        assert_eq!(ids(&fused), vec!["2", "1", "3"]);
        let expected_2 = 1.0 / 62.0 + 1.0 / 61.0;
        let expected_1 = 1.0 / 61.0;
        let expected_3 = 1.0 / 62.0;
        assert!((fused[0].fused_score.unwrap() - expected_2).abs() < 1e-6);
        assert!((fused[1].fused_score.unwrap() - expected_1).abs() < 1e-6);
        assert!((fused[2].fused_score.unwrap() - expected_3).abs() < 1e-6);
    }

    #[test]
    fn rrf_scores_are_non_increasing() {
        let lexical: Vec<Candidate> = (0..5)
            .map(|i| hit(&format!("l{}", i), SearchSource::Lexical, i + 1, 5.0 - i as f32))
            .collect();
        let vector: Vec<Candidate> = (0..5)
            .map(|i| hit(&format!("v{}", i), SearchSource::Vector, i + 1, 1.0 - 0.1 * i as f32))
            .collect();

        let fused = fuse(&lexical, &vector, &rrf_params(10));
        for pair in fused.windows(2) {
            assert!(pair[0].fused_score.unwrap() >= pair[1].fused_score.unwrap());
        }
    }

    #[test]
    fn document_in_both_lists_outscores_single_source_at_same_rank() {
        let lexical = vec![hit("both", SearchSource::Lexical, 1, 5.0)];
        let vector = vec![hit("both", SearchSource::Vector, 1, 0.9)];
        let fused_both = fuse(&lexical, &vector, &rrf_params(10));

        let fused_single = fuse(&lexical, &[], &rrf_params(10));

        assert!(
            fused_both[0].fused_score.unwrap() > fused_single[0].fused_score.unwrap(),
            "additivity: appearing in both lists must strictly increase the score"
        );
    }

    #[test]
    fn merge_never_duplicates_an_id() {
        let lexical = vec![
            hit("a", SearchSource::Lexical, 1, 3.0),
            hit("b", SearchSource::Lexical, 2, 2.0),
        ];
        let vector = vec![
            hit("b", SearchSource::Vector, 1, 0.9),
            hit("a", SearchSource::Vector, 2, 0.8),
        ];

        let fused = fuse(&lexical, &vector, &rrf_params(10));
        assert_eq!(fused.len(), 2);

        // both sources recorded on the shared documents
        for c in &fused {
            assert!(c.source_ranks.contains_key(&SearchSource::Lexical));
            assert!(c.source_ranks.contains_key(&SearchSource::Vector));
        }
    }

    #[test]
    fn output_is_bounded_by_top_k_and_distinct_input() {
        let lexical: Vec<Candidate> = (0..4)
            .map(|i| hit(&format!("d{}", i), SearchSource::Lexical, i + 1, 4.0 - i as f32))
            .collect();
        // d0 and d1 overlap with the lexical list
        let vector: Vec<Candidate> = (0..3)
            .map(|i| hit(&format!("d{}", i), SearchSource::Vector, i + 1, 0.9 - 0.1 * i as f32))
            .collect();

        let fused = fuse(&lexical, &vector, &rrf_params(3));
        assert_eq!(fused.len(), 3);

        let unbounded = fuse(&lexical, &vector, &rrf_params(100));
        // 4 + 3 - 3 overlapping = 4 distinct documents
        assert_eq!(unbounded.len(), 4);
    }

    #[test]
    fn fused_rank_is_dense_and_one_based() {
        let lexical = vec![
            hit("a", SearchSource::Lexical, 1, 3.0),
            hit("b", SearchSource::Lexical, 2, 2.0),
            hit("c", SearchSource::Lexical, 3, 1.0),
        ];
        let fused = fuse(&lexical, &[], &rrf_params(10));
        let ranks: Vec<usize> = fused.iter().map(|c| c.fused_rank.unwrap()).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn ties_keep_first_seen_insertion_order() {
        // Same rank in a single list each: identical RRF contributions
        let lexical = vec![hit("from_lexical", SearchSource::Lexical, 1, 3.0)];
        let vector = vec![hit("from_vector", SearchSource::Vector, 1, 0.9)];

        let fused = fuse(&lexical, &vector, &rrf_params(10));
        assert_eq!(ids(&fused), vec!["from_lexical", "from_vector"]);
    }

    #[test]
    fn fusion_is_deterministic() {
        let lexical = vec![
            hit("a", SearchSource::Lexical, 1, 3.0),
            hit("b", SearchSource::Lexical, 2, 2.0),
        ];
        let vector = vec![
            hit("c", SearchSource::Vector, 1, 0.9),
            hit("a", SearchSource::Vector, 2, 0.8),
        ];

        let first = fuse(&lexical, &vector, &rrf_params(10));
        let second = fuse(&lexical, &vector, &rrf_params(10));
        assert_eq!(ids(&first), ids(&second));
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.fused_score, y.fused_score);
        }
    }

    #[test]
    fn one_empty_side_still_produces_a_ranking() {
        let vector = vec![
            hit("v1", SearchSource::Vector, 1, 0.9),
            hit("v2", SearchSource::Vector, 2, 0.8),
        ];
        let fused = fuse(&[], &vector, &rrf_params(10));
        assert_eq!(ids(&fused), vec!["v1", "v2"]);
        // no lexical contribution recorded
        assert!(fused[0].source_ranks.get(&SearchSource::Lexical).is_none());
    }

    #[test]
    fn both_sides_empty_produces_empty_output() {
        let fused = fuse(&[], &[], &rrf_params(10));
        assert!(fused.is_empty());
    }

    #[test]
    fn text_is_backfilled_from_the_other_source_but_never_overwritten() {
        let mut lexical_hit = hit("a", SearchSource::Lexical, 1, 3.0);
        lexical_hit.text = None;
        let mut vector_hit = hit("a", SearchSource::Vector, 1, 0.9);
        vector_hit.text = Some("vector text".to_string());

        let fused = fuse(&[lexical_hit], &[vector_hit.clone()], &rrf_params(10));
        assert_eq!(fused[0].text.as_deref(), Some("vector text"));

        // when the first source already has text, the second must not win
        let mut lexical_with_text = hit("a", SearchSource::Lexical, 1, 3.0);
        lexical_with_text.text = Some("lexical text".to_string());
        let fused = fuse(&[lexical_with_text], &[vector_hit], &rrf_params(10));
        assert_eq!(fused[0].text.as_deref(), Some("lexical text"));
    }

    #[test]
    fn weighted_fusion_normalizes_each_list() {
        let params = FusionParams::new(&FusionConfig::default(), FusionMethod::Weighted, 10);

        // lexical scores span 2.0..=6.0, vector scores span 0.2..=0.8
        let lexical = vec![
            hit("a", SearchSource::Lexical, 1, 6.0),
            hit("b", SearchSource::Lexical, 2, 2.0),
        ];
        let vector = vec![
            hit("b", SearchSource::Vector, 1, 0.8),
            hit("a", SearchSource::Vector, 2, 0.2),
        ];

        let fused = fuse(&lexical, &vector, &params);

        // a: 0.4 * 1.0 + 0.6 * 0.0 = 0.4
        // b: 0.4 * 0.0 + 0.6 * 1.0 = 0.6
        let a = fused.iter().find(|c| c.id == "a").unwrap();
        let b = fused.iter().find(|c| c.id == "b").unwrap();
        assert!((a.fused_score.unwrap() - 0.4).abs() < 1e-6);
        assert!((b.fused_score.unwrap() - 0.6).abs() < 1e-6);
        assert_eq!(fused[0].id, "b");
    }

    #[test]
    fn weighted_fusion_missing_side_contributes_zero() {
        let params = FusionParams::new(&FusionConfig::default(), FusionMethod::Weighted, 10);
        let lexical = vec![
            hit("only_lex", SearchSource::Lexical, 1, 4.0),
            hit("shared", SearchSource::Lexical, 2, 2.0),
        ];
        let vector = vec![hit("shared", SearchSource::Vector, 1, 0.9)];

        let fused = fuse(&lexical, &vector, &params);
        // shared: 0.4 * 0.0 + 0.6 * 1.0 (degenerate one-element vector list)
        let shared = fused.iter().find(|c| c.id == "shared").unwrap();
        assert!((shared.fused_score.unwrap() - 0.6).abs() < 1e-6);
        // only_lex: 0.4 * 1.0 + 0.6 * 0.0
        let only_lex = fused.iter().find(|c| c.id == "only_lex").unwrap();
        assert!((only_lex.fused_score.unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn weighted_fusion_degenerate_range_normalizes_to_one() {
        let params = FusionParams::new(&FusionConfig::default(), FusionMethod::Weighted, 10);
        // all lexical scores identical: range is zero
        let lexical = vec![
            hit("a", SearchSource::Lexical, 1, 3.0),
            hit("b", SearchSource::Lexical, 2, 3.0),
        ];
        let fused = fuse(&lexical, &[], &params);
        for c in &fused {
            assert!((c.fused_score.unwrap() - 0.4).abs() < 1e-6);
        }
    }
}
