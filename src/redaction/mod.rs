// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII Detection & Redaction engine
//
// - Cloud recognizer first, regex catalog fallback on any failure
// - Overlap reconciliation into an ordered, non-overlapping entity list
// - Code-point safe rewriting with a fixed-width masking token

pub mod cloud;
pub mod config;
pub mod detector;
pub mod error;
pub mod masking;
pub mod offsets;
pub mod patterns;
pub mod reconcile;
pub mod service;

pub use cloud::{CloudEntityDetector, DetectionOutcome, PiiRecognizer};
pub use config::{CustomPattern, PIICategory, RedactionOptions, RedactorConfig};
pub use detector::{PIIEntity, RegexEntityDetector};
pub use error::{DetectorUnavailable, RecognizerError, RedactionError};
pub use patterns::PatternCatalog;
pub use service::{RedactionResult, RedactionService};
