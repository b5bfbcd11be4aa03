// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Reconciliation of raw candidates into a clean entity list

use std::cmp::Ordering;

use super::config::RedactionOptions;
use super::detector::PIIEntity;

/// Merge candidates into an ordered, non-overlapping, filtered list
///
/// Steps, in order:
/// 1. sort by `start`, longer span first on ties
/// 2. sweep left to right keeping a candidate only if it starts at or after the
///    end of the last kept one (first wins after sorting)
/// 3. drop candidates below `options.confidence_threshold`
/// 4. drop candidates outside `options.categories` when set
///
/// Overlap resolution runs before filtering, so a candidate that is later
/// filtered out still suppresses anything it overlapped.
pub fn reconcile(mut candidates: Vec<PIIEntity>, options: &RedactionOptions) -> Vec<PIIEntity> {
    candidates.retain(|c| c.length > 0);
    candidates.sort_by(compare_candidates);

    let mut kept: Vec<PIIEntity> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let clear = kept.last().map_or(true, |last| candidate.start >= last.end());
        if clear {
            kept.push(candidate);
        }
    }

    kept.retain(|e| e.confidence_score >= options.confidence_threshold);
    kept.retain(|e| options.allows(e.category));
    kept
}

fn compare_candidates(a: &PIIEntity, b: &PIIEntity) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.length.cmp(&a.length))
        // Deterministic among identical spans
        .then_with(|| {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .unwrap_or(Ordering::Equal)
        })
}

/// True when every entity ends at or before the next one starts
pub fn is_non_overlapping(entities: &[PIIEntity]) -> bool {
    entities.windows(2).all(|pair| pair[0].end() <= pair[1].start)
}
