// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII detection and redaction for knowledge-base ingestion
// Optional PyO3 bindings behind the `python` feature

pub mod redaction;

#[cfg(feature = "python")]
pub mod python;

pub use redaction::{
    CloudEntityDetector, CustomPattern, DetectionOutcome, DetectorUnavailable, PIICategory,
    PIIEntity, PatternCatalog, PiiRecognizer, RecognizerError, RedactionError, RedactionOptions,
    RedactionResult, RedactionService, RedactorConfig, RegexEntityDetector,
};
