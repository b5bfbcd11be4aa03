// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Categories, per-call options and process-wide configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::RedactionError;

/// PII categories an entity can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PIICategory {
    Email,
    PhoneNumber,
    #[serde(rename = "SSN")]
    Ssn,
    CreditCard,
    #[serde(rename = "IPAddress")]
    IpAddress,
    // Only reported by cloud recognizers
    Person,
    Address,
    Custom,
}

impl PIICategory {
    pub const ALL: [PIICategory; 8] = [
        PIICategory::Email,
        PIICategory::PhoneNumber,
        PIICategory::Ssn,
        PIICategory::CreditCard,
        PIICategory::IpAddress,
        PIICategory::Person,
        PIICategory::Address,
        PIICategory::Custom,
    ];

    /// Canonical name, as used in serialized results
    pub fn as_str(&self) -> &'static str {
        match self {
            PIICategory::Email => "Email",
            PIICategory::PhoneNumber => "PhoneNumber",
            PIICategory::Ssn => "SSN",
            PIICategory::CreditCard => "CreditCard",
            PIICategory::IpAddress => "IPAddress",
            PIICategory::Person => "Person",
            PIICategory::Address => "Address",
            PIICategory::Custom => "Custom",
        }
    }
}

impl fmt::Display for PIICategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PIICategory {
    type Err = RedactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "email" => Ok(PIICategory::Email),
            "phonenumber" | "phone" => Ok(PIICategory::PhoneNumber),
            "ssn" => Ok(PIICategory::Ssn),
            "creditcard" => Ok(PIICategory::CreditCard),
            "ipaddress" => Ok(PIICategory::IpAddress),
            "person" => Ok(PIICategory::Person),
            "address" => Ok(PIICategory::Address),
            "custom" => Ok(PIICategory::Custom),
            _ => Err(RedactionError::InvalidOptions(format!(
                "unsupported category '{}'",
                s
            ))),
        }
    }
}

fn default_masking_character() -> char {
    '*'
}

/// Per-call redaction options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionOptions {
    #[serde(default = "default_masking_character")]
    pub masking_character: char,
    /// Entities scoring below this are dropped; 0.0 keeps everything
    #[serde(default)]
    pub confidence_threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<HashSet<PIICategory>>,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            masking_character: default_masking_character(),
            confidence_threshold: 0.0,
            categories: None,
        }
    }
}

impl RedactionOptions {
    /// Parse and validate camelCase JSON options
    ///
    /// Any parse failure, including an unknown category name, is reported as
    /// `InvalidOptions`, the same as the typed builders.
    pub fn from_json(json: &str) -> Result<Self, RedactionError> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| RedactionError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_masking_character(mut self, masking_character: char) -> Self {
        self.masking_character = masking_character;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = PIICategory>,
    {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    /// Build the allow-list from category names, rejecting unknown ones
    pub fn with_category_names<I, S>(self, names: I) -> Result<Self, RedactionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories = names
            .into_iter()
            .map(|name| name.as_ref().parse::<PIICategory>())
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(self.with_categories(categories))
    }

    /// Reject malformed options; values are never clamped
    pub fn validate(&self) -> Result<(), RedactionError> {
        let threshold = self.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RedactionError::InvalidOptions(format!(
                "confidence threshold {} is outside [0, 1]",
                threshold
            )));
        }

        if self.masking_character.is_control() {
            return Err(RedactionError::InvalidOptions(format!(
                "masking character {:?} is a control character",
                self.masking_character
            )));
        }

        if let Some(categories) = &self.categories {
            if categories.is_empty() {
                return Err(RedactionError::InvalidOptions(
                    "category allow-list is empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn allows(&self, category: PIICategory) -> bool {
        self.categories
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&category))
    }
}

/// Custom pattern registered alongside the built-in catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPattern {
    #[serde(default = "default_custom_category")]
    pub category: PIICategory,
    pub pattern: String,
    pub description: String,
    #[serde(default = "default_custom_confidence")]
    pub confidence: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_custom_category() -> PIICategory {
    PIICategory::Custom
}

fn default_custom_confidence() -> f64 {
    0.8
}

fn default_enabled() -> bool {
    true
}

/// Process-wide configuration, fixed when the service is built
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactorConfig {
    // Built-in catalog categories
    pub detect_email: bool,
    pub detect_phone_number: bool,
    pub detect_ssn: bool,
    pub detect_credit_card: bool,
    pub detect_ip_address: bool,

    pub custom_patterns: Vec<CustomPattern>,

    /// Masking characters per token
    pub token_width: usize,

    /// Deadline for one cloud recognizer attempt
    pub cloud_timeout_ms: u64,

    /// Texts processed concurrently by batch calls
    pub batch_concurrency: usize,
}

impl Default for RedactorConfig {
    fn default() -> Self {
        Self {
            detect_email: true,
            detect_phone_number: true,
            detect_ssn: true,
            detect_credit_card: true,
            detect_ip_address: true,

            custom_patterns: Vec::new(),

            token_width: 3,
            cloud_timeout_ms: 5_000,
            batch_concurrency: 4,
        }
    }
}

impl RedactorConfig {
    /// Parse configuration from a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, RedactionError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RedactionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RedactionError> {
        if self.token_width == 0 {
            return Err(RedactionError::InvalidConfig(
                "token_width must be at least 1".to_string(),
            ));
        }
        if self.cloud_timeout_ms == 0 {
            return Err(RedactionError::InvalidConfig(
                "cloud_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.batch_concurrency == 0 {
            return Err(RedactionError::InvalidConfig(
                "batch_concurrency must be at least 1".to_string(),
            ));
        }
        for custom in &self.custom_patterns {
            if !(0.0..=1.0).contains(&custom.confidence) {
                return Err(RedactionError::InvalidConfig(format!(
                    "confidence {} for custom pattern '{}' is outside [0, 1]",
                    custom.confidence, custom.pattern
                )));
            }
        }
        Ok(())
    }

    pub fn cloud_timeout(&self) -> Duration {
        Duration::from_millis(self.cloud_timeout_ms)
    }
}
