// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Text rewriting for reconciled entities

use sha2::{Digest, Sha256};
use std::borrow::Cow;

use super::detector::PIIEntity;
use super::offsets::CharIndex;

/// Fixed-width replacement token, e.g. `***`
pub fn masking_token(masking_character: char, width: usize) -> String {
    std::iter::repeat(masking_character).take(width).collect()
}

/// Replace every entity span with `token`
///
/// # Arguments
/// * `text` - Original text
/// * `entities` - Reconciled entities: ordered, non-overlapping, code-point offsets
/// * `token` - Replacement for each span
///
/// # Returns
/// The rewritten text; borrowed unchanged when there is nothing to replace.
/// Spans that do not fit the text are skipped.
pub fn redact<'a>(text: &'a str, entities: &[PIIEntity], token: &str) -> Cow<'a, str> {
    if entities.is_empty() {
        // Zero-copy when nothing is redacted
        return Cow::Borrowed(text);
    }

    let index = CharIndex::new(text);
    let mut result = text.to_string();

    // Last span first so earlier byte offsets stay valid
    for entity in entities.iter().rev() {
        match index.byte_range(entity.start, entity.length) {
            Some(range) => result.replace_range(range, token),
            None => {
                tracing::warn!(
                    category = %entity.category,
                    start = entity.start,
                    length = entity.length,
                    "Skipping entity outside text bounds"
                );
            }
        }
    }

    Cow::Owned(result)
}

/// Short SHA-256 fingerprint for logging a value without revealing it
pub fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    format!("{:x}", digest)[..8].to_string()
}
