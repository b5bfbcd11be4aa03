// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Pattern catalog for regex-based PII detection
// Uses RegexSet as a prefilter so only patterns that matched are scanned in full

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet};

use super::config::{PIICategory, RedactorConfig};
use super::error::RedactionError;

/// Extra check applied to a match before it becomes a candidate
pub type Validator = fn(&str) -> bool;

/// Compiled catalog entry
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub category: PIICategory,
    pub regex: Regex,
    pub confidence: f64,
    pub validator: Option<Validator>,
    pub description: String,
}

/// Pattern definition (pattern, description, base confidence, validator)
type PatternDef = (&'static str, &'static str, f64, Option<Validator>);

static EMAIL_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        "Email address",
        0.95,
        None,
    )]
});

// The final group separator is mandatory so bare digit runs never match.
// The country-code prefix must start at a word boundary or a `+`.
static PHONE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"(?:(?:\+|\b)1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]\d{4}\b",
            "US phone number",
            0.8,
            None,
        ),
        (
            r"\+[1-9]\d{9,14}\b",
            "International phone number",
            0.65,
            None,
        ),
    ]
});

static SSN_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        r"\b\d{3}-\d{2}-\d{4}\b",
        "US Social Security Number",
        0.98,
        None,
    )]
});

// Card shapes only, so a neighbouring quantity or ticket number is never
// swallowed into the match
static CREDIT_CARD_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"\b\d{4}[-\s]\d{4}[-\s]\d{4}[-\s]\d{1,7}\b",
            "Credit card number (4-4-4-N)",
            0.9,
            Some(luhn_check as Validator),
        ),
        (
            r"\b\d{4}[-\s]\d{6}[-\s]\d{4,5}\b",
            "Credit card number (4-6-5 and 4-6-4)",
            0.9,
            Some(luhn_check as Validator),
        ),
        (
            r"\b\d{13,19}\b",
            "Credit card number (unseparated)",
            0.9,
            Some(luhn_check as Validator),
        ),
    ]
});

static IP_ADDRESS_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b",
        "IPv4 address",
        0.85,
        None,
    )]
});

/// Luhn checksum over the digits of a 13-19 digit card number
pub fn luhn_check(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Registry of (category, matcher, base confidence) entries
pub struct PatternCatalog {
    regex_set: RegexSet,
    entries: Vec<CatalogEntry>,
}

impl PatternCatalog {
    /// Catalog with every built-in category enabled
    pub fn builtin() -> Result<Self, RedactionError> {
        Self::from_config(&RedactorConfig::default())
    }

    /// Compile the catalog selected by configuration, custom patterns last
    pub fn from_config(config: &RedactorConfig) -> Result<Self, RedactionError> {
        let mut builder = CatalogBuilder::default();

        builder.add_defs(config.detect_email, PIICategory::Email, &EMAIL_PATTERNS)?;
        builder.add_defs(
            config.detect_phone_number,
            PIICategory::PhoneNumber,
            &PHONE_PATTERNS,
        )?;
        builder.add_defs(config.detect_ssn, PIICategory::Ssn, &SSN_PATTERNS)?;
        builder.add_defs(
            config.detect_credit_card,
            PIICategory::CreditCard,
            &CREDIT_CARD_PATTERNS,
        )?;
        builder.add_defs(
            config.detect_ip_address,
            PIICategory::IpAddress,
            &IP_ADDRESS_PATTERNS,
        )?;

        for custom in config.custom_patterns.iter().filter(|c| c.enabled) {
            builder.add(
                custom.category,
                &custom.pattern,
                &custom.description,
                custom.confidence,
                None,
            )?;
        }

        builder.build()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose pattern matches somewhere in `text`
    pub fn matching<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        let matched: Vec<usize> = self.regex_set.matches(text).into_iter().collect();
        matched.into_iter().map(move |idx| &self.entries[idx])
    }
}

#[derive(Default)]
struct CatalogBuilder {
    pattern_strings: Vec<String>,
    entries: Vec<CatalogEntry>,
}

impl CatalogBuilder {
    fn add_defs(
        &mut self,
        enabled: bool,
        category: PIICategory,
        defs: &[PatternDef],
    ) -> Result<(), RedactionError> {
        if !enabled {
            return Ok(());
        }
        for (pattern, description, confidence, validator) in defs {
            self.add(category, pattern, description, *confidence, *validator)?;
        }
        Ok(())
    }

    fn add(
        &mut self,
        category: PIICategory,
        pattern: &str,
        description: &str,
        confidence: f64,
        validator: Option<Validator>,
    ) -> Result<(), RedactionError> {
        let regex = RegexBuilder::new(pattern)
            .build()
            .map_err(|source| RedactionError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;

        tracing::debug!(%category, description, confidence, "Compiled PII pattern");

        self.pattern_strings.push(pattern.to_string());
        self.entries.push(CatalogEntry {
            category,
            regex,
            confidence,
            validator,
            description: description.to_string(),
        });
        Ok(())
    }

    fn build(self) -> Result<PatternCatalog, RedactionError> {
        // All categories disabled is a valid, empty catalog
        let regex_set = if self.pattern_strings.is_empty() {
            RegexSet::empty()
        } else {
            RegexSet::new(&self.pattern_strings).map_err(|source| RedactionError::Pattern {
                pattern: self.pattern_strings.join(" | "),
                source,
            })?
        };

        Ok(PatternCatalog {
            regex_set,
            entries: self.entries,
        })
    }
}
