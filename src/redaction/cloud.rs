// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Adapter around an external PII recognition capability
// Fails closed: any error, timeout or invalid entity makes the whole attempt unavailable

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::detector::PIIEntity;
use super::error::{DetectorUnavailable, RecognizerError};
use super::offsets::CharIndex;

/// External PII recognizer
///
/// Implementations own transport, authentication and any retry policy.
/// Entity offsets must be code-point offsets into the text passed in.
#[async_trait]
pub trait PiiRecognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<Vec<PIIEntity>, RecognizerError>;
}

/// Result of one detection attempt
#[derive(Debug, Clone)]
pub enum DetectionOutcome {
    Detected(Vec<PIIEntity>),
    Unavailable(DetectorUnavailable),
}

/// Bounded, validating wrapper around a [`PiiRecognizer`]
#[derive(Clone)]
pub struct CloudEntityDetector {
    recognizer: Arc<dyn PiiRecognizer>,
    timeout: Duration,
}

impl CloudEntityDetector {
    pub fn new(recognizer: Arc<dyn PiiRecognizer>, timeout: Duration) -> Self {
        Self {
            recognizer,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One attempt, bounded by the configured deadline
    ///
    /// Dropping the returned future abandons the in-flight recognizer call.
    pub async fn detect(&self, text: &str) -> DetectionOutcome {
        let response = match tokio::time::timeout(self.timeout, self.recognizer.recognize(text)).await
        {
            Ok(Ok(entities)) => entities,
            Ok(Err(e)) => return DetectionOutcome::Unavailable(e.into()),
            Err(_) => return DetectionOutcome::Unavailable(DetectorUnavailable::Timeout(self.timeout)),
        };

        match validate_entities(text, &response) {
            Ok(()) => DetectionOutcome::Detected(response),
            Err(reason) => DetectionOutcome::Unavailable(reason),
        }
    }
}

/// Check every entity against the text it claims to describe
fn validate_entities(text: &str, entities: &[PIIEntity]) -> Result<(), DetectorUnavailable> {
    if entities.is_empty() {
        return Ok(());
    }

    let index = CharIndex::new(text);

    for entity in entities {
        if entity.length == 0 {
            return Err(DetectorUnavailable::InvalidEntity(format!(
                "zero-length {} entity at {}",
                entity.category, entity.start
            )));
        }

        if !(0.0..=1.0).contains(&entity.confidence_score) {
            return Err(DetectorUnavailable::InvalidEntity(format!(
                "{} entity at {} has confidence {}",
                entity.category, entity.start, entity.confidence_score
            )));
        }

        match index.slice(entity.start, entity.length) {
            Some(covered) if covered == entity.text => {}
            Some(_) => {
                return Err(DetectorUnavailable::InvalidEntity(format!(
                    "{} entity text does not match span {}..{}",
                    entity.category,
                    entity.start,
                    entity.end()
                )))
            }
            None => {
                return Err(DetectorUnavailable::InvalidEntity(format!(
                    "{} entity span {}..{} exceeds text length {}",
                    entity.category,
                    entity.start,
                    entity.start.saturating_add(entity.length),
                    index.char_len()
                )))
            }
        }
    }

    Ok(())
}
