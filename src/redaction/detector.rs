// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Entity model and the regex-based detector

use serde::{Deserialize, Serialize};

use super::config::{PIICategory, RedactorConfig};
use super::error::RedactionError;
use super::offsets::CharIndex;
use super::patterns::PatternCatalog;

/// A detected PII occurrence
///
/// `start` and `length` count code points, never bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PIIEntity {
    pub category: PIICategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub text: String,
    pub start: usize,
    pub length: usize,
    pub confidence_score: f64,
}

impl PIIEntity {
    pub fn new(
        category: PIICategory,
        text: impl Into<String>,
        start: usize,
        length: usize,
        confidence_score: f64,
    ) -> Self {
        Self {
            category,
            subcategory: None,
            text: text.into(),
            start,
            length,
            confidence_score,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Code-point offset one past the entity
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Deterministic detector backed by the pattern catalog
///
/// # Example
/// ```
/// use pii_redaction::{PIICategory, RegexEntityDetector};
///
/// let detector = RegexEntityDetector::builtin().unwrap();
/// let entities = detector.detect("SSN: 123-45-6789");
///
/// assert_eq!(entities.len(), 1);
/// assert_eq!(entities[0].category, PIICategory::Ssn);
/// assert_eq!(entities[0].start, 5);
/// ```
pub struct RegexEntityDetector {
    catalog: PatternCatalog,
}

impl RegexEntityDetector {
    pub fn new(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn builtin() -> Result<Self, RedactionError> {
        Ok(Self::new(PatternCatalog::builtin()?))
    }

    pub fn from_config(config: &RedactorConfig) -> Result<Self, RedactionError> {
        Ok(Self::new(PatternCatalog::from_config(config)?))
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Scan `text` with every catalog entry
    ///
    /// Candidates may overlap; every occurrence of a repeated value is reported
    /// separately. Output is in catalog order, not text order.
    pub fn detect(&self, text: &str) -> Vec<PIIEntity> {
        let mut entities = Vec::new();
        if text.is_empty() {
            return entities;
        }

        let index = CharIndex::new(text);

        for entry in self.catalog.matching(text) {
            let mut pos = 0;
            while pos <= text.len() {
                let Some(mat) = entry.regex.find_at(text, pos) else {
                    break;
                };
                if mat.is_empty() {
                    pos = next_char_boundary(text, mat.end());
                    continue;
                }
                if let Some(validate) = entry.validator {
                    if !validate(mat.as_str()) {
                        // A rejected span may still hold a valid value that starts
                        // at a later digit group
                        pos = next_group_start(text, mat.start(), mat.end());
                        continue;
                    }
                }

                let start = index.char_offset(mat.start());
                let end = index.char_offset(mat.end());

                entities.push(PIIEntity::new(
                    entry.category,
                    mat.as_str(),
                    start,
                    end - start,
                    entry.confidence,
                ));
                pos = mat.end();
            }
        }

        entities
    }
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(pos + 1, |c| pos + c.len_utf8())
}

/// Byte offset of the first digit run starting inside `start..end`, after
/// `start`; `end` when there is none
fn next_group_start(text: &str, start: usize, end: usize) -> usize {
    let bytes = text.as_bytes();
    (start + 1..end)
        .find(|&i| bytes[i].is_ascii_digit() && !bytes[i - 1].is_ascii_digit())
        .unwrap_or(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> RegexEntityDetector {
        RegexEntityDetector::builtin().unwrap()
    }

    fn of_category(entities: &[PIIEntity], category: PIICategory) -> Vec<&PIIEntity> {
        entities.iter().filter(|e| e.category == category).collect()
    }

    #[test]
    fn test_detect_ssn() {
        let entities = detector().detect("My SSN is 123-45-6789");
        let ssn = of_category(&entities, PIICategory::Ssn);

        assert_eq!(ssn.len(), 1);
        assert_eq!(ssn[0].text, "123-45-6789");
        assert_eq!(ssn[0].start, 10);
        assert_eq!(ssn[0].length, 11);
    }

    #[test]
    fn test_detect_email() {
        let entities = detector().detect("Contact: john.doe@example.com");
        let emails = of_category(&entities, PIICategory::Email);

        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].text, "john.doe@example.com");
    }

    #[test]
    fn test_detect_credit_card_requires_luhn() {
        let entities = detector().detect("Card: 4111-1111-1111-1111");
        assert_eq!(of_category(&entities, PIICategory::CreditCard).len(), 1);

        let entities = detector().detect("Order: 4111-1111-1111-1112");
        assert!(of_category(&entities, PIICategory::CreditCard).is_empty());
    }

    #[test]
    fn test_card_after_short_number() {
        for (text, card) in [
            ("Qty 2 4111 1111 1111 1111 charged", "4111 1111 1111 1111"),
            ("Ticket 12 4111-1111-1111-1111", "4111-1111-1111-1111"),
        ] {
            let entities = detector().detect(text);
            let cards = of_category(&entities, PIICategory::CreditCard);

            assert_eq!(cards.len(), 1, "in {text}");
            assert_eq!(cards[0].text, card);
        }
    }

    #[test]
    fn test_rejected_span_rescanned_from_next_group() {
        // "1234 4111 1111 1111" fails Luhn; the card starts one group later
        let entities = detector().detect("Ref 1234 4111 1111 1111 1111");
        let cards = of_category(&entities, PIICategory::CreditCard);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].text, "4111 1111 1111 1111");
        assert_eq!(cards[0].start, 9);
    }

    #[test]
    fn test_next_group_start() {
        let text = "1234 4111 1111";
        assert_eq!(next_group_start(text, 0, text.len()), 5);
        assert_eq!(next_group_start(text, 5, text.len()), 10);
        assert_eq!(next_group_start(text, 10, text.len()), text.len());
    }

    #[test]
    fn test_detect_ip_address() {
        let entities = detector().detect("Server at 192.168.1.100 is down");
        let ips = of_category(&entities, PIICategory::IpAddress);

        assert_eq!(ips.len(), 1);
        assert_eq!(ips[0].text, "192.168.1.100");
    }

    #[test]
    fn test_code_point_offsets_after_multibyte() {
        let text = "🚀é mail: a@b.io";
        let entities = detector().detect(text);
        let emails = of_category(&entities, PIICategory::Email);

        assert_eq!(emails.len(), 1);
        // 🚀 and é are one code point each
        assert_eq!(emails[0].start, 9);
        assert_eq!(emails[0].length, 6);
    }

    #[test]
    fn test_duplicate_values_reported_per_occurrence() {
        let entities = detector().detect("a@b.com and again a@b.com");
        let emails = of_category(&entities, PIICategory::Email);

        assert_eq!(emails.len(), 2);
        assert_ne!(emails[0].start, emails[1].start);
    }

    #[test]
    fn test_no_pii() {
        assert!(detector().detect("Nothing to see here.").is_empty());
        assert!(detector().detect("").is_empty());
    }

    #[test]
    fn test_masking_tokens_are_not_pii() {
        assert!(detector().detect("Contact *** for info. SSN: XXX").is_empty());
    }
}
