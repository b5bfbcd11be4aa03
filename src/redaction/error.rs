// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types for PII redaction

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to callers of the redaction engine
#[derive(Debug, Error)]
pub enum RedactionError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to compile pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure reported by an external PII recognizer
#[derive(Debug, Clone, Error)]
pub enum RecognizerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("recognizer rejected credentials")]
    Unauthorized,

    #[error("recognizer quota exceeded")]
    QuotaExceeded,

    #[error("malformed recognizer response: {0}")]
    MalformedResponse(String),
}

/// Why the cloud path produced no usable entities
///
/// Only ever observed inside the service, where it triggers the regex fallback.
#[derive(Debug, Clone, Error)]
pub enum DetectorUnavailable {
    #[error("recognizer did not answer within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Recognizer(#[from] RecognizerError),

    #[error("recognizer returned an invalid entity: {0}")]
    InvalidEntity(String),
}
