// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Redaction façade: detector selection, reconciliation and rewriting

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::cloud::{CloudEntityDetector, DetectionOutcome, PiiRecognizer};
use super::config::{RedactionOptions, RedactorConfig};
use super::detector::{PIIEntity, RegexEntityDetector};
use super::error::RedactionError;
use super::masking::{self, fingerprint, masking_token};
use super::offsets::char_len;
use super::reconcile::reconcile;

/// Outcome of one redaction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionResult {
    pub redacted_text: String,
    /// Left to right, non-overlapping
    pub entities: Vec<PIIEntity>,
    /// Code points in the input
    pub original_length: usize,
    /// Code points in the output
    pub redacted_length: usize,
}

/// Which detector produced the entities of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    Cloud,
    Regex,
}

/// PII redaction engine
///
/// Each call tries the cloud recognizer when one is configured and falls back
/// to the regex catalog on any failure. Nothing is remembered between calls:
/// a recognizer that failed is tried again on the next call. This keeps every
/// call independent at the cost of paying the failure latency (bounded by
/// `cloud_timeout_ms`) on each call while the recognizer is down.
///
/// # Example
/// ```
/// use pii_redaction::RedactionService;
///
/// let service = RedactionService::regex_only().unwrap();
/// let runtime = tokio::runtime::Builder::new_current_thread()
///     .enable_all()
///     .build()
///     .unwrap();
/// let result = runtime
///     .block_on(service.redact_pii("Contact john.doe@company.com for info.", None))
///     .unwrap();
///
/// assert_eq!(result.redacted_text, "Contact *** for info.");
/// assert_eq!(result.entities.len(), 1);
/// ```
pub struct RedactionService {
    regex: RegexEntityDetector,
    cloud: Option<CloudEntityDetector>,
    config: RedactorConfig,
}

impl RedactionService {
    /// Regex-only service
    pub fn new(config: RedactorConfig) -> Result<Self, RedactionError> {
        config.validate()?;
        let regex = RegexEntityDetector::from_config(&config)?;

        tracing::info!(
            patterns = regex.catalog().len(),
            "PII redaction enabled with regex-only detection"
        );

        Ok(Self {
            regex,
            cloud: None,
            config,
        })
    }

    /// Service that tries `recognizer` first and falls back to regex
    pub fn with_recognizer(
        config: RedactorConfig,
        recognizer: Arc<dyn PiiRecognizer>,
    ) -> Result<Self, RedactionError> {
        let mut service = Self::new(config)?;
        service.cloud = Some(CloudEntityDetector::new(
            recognizer,
            service.config.cloud_timeout(),
        ));

        tracing::info!(
            timeout_ms = service.config.cloud_timeout_ms,
            "PII redaction enabled with cloud recognizer and regex fallback"
        );

        Ok(service)
    }

    /// Regex-only service with the default configuration
    pub fn regex_only() -> Result<Self, RedactionError> {
        Self::new(RedactorConfig::default())
    }

    pub fn config(&self) -> &RedactorConfig {
        &self.config
    }

    pub fn has_cloud_detector(&self) -> bool {
        self.cloud.is_some()
    }

    /// Detect, reconcile and redact PII in `text`
    ///
    /// Only invalid options produce an error; recognizer failures fall back to
    /// regex detection.
    pub async fn redact_pii(
        &self,
        text: &str,
        options: Option<&RedactionOptions>,
    ) -> Result<RedactionResult, RedactionError> {
        let defaults = RedactionOptions::default();
        let options = options.unwrap_or(&defaults);
        options.validate()?;

        Ok(self.redact_validated(text, options).await)
    }

    /// Redact each text with default options, preserving input order
    pub async fn batch_redact_pii<S>(&self, texts: &[S]) -> Vec<RedactionResult>
    where
        S: AsRef<str> + Sync,
    {
        self.redact_all(texts, &RedactionOptions::default()).await
    }

    /// Redact each text with `options`, preserving input order
    pub async fn batch_redact_pii_with<S>(
        &self,
        texts: &[S],
        options: &RedactionOptions,
    ) -> Result<Vec<RedactionResult>, RedactionError>
    where
        S: AsRef<str> + Sync,
    {
        options.validate()?;
        Ok(self.redact_all(texts, options).await)
    }

    async fn redact_all<S>(&self, texts: &[S], options: &RedactionOptions) -> Vec<RedactionResult>
    where
        S: AsRef<str> + Sync,
    {
        if texts.is_empty() {
            return Vec::new();
        }

        tracing::debug!(
            texts = texts.len(),
            concurrency = self.config.batch_concurrency,
            "Redacting batch"
        );

        // `buffered` keeps results in input order
        stream::iter(texts)
            .map(|text| self.redact_validated(text.as_ref(), options))
            .buffered(self.config.batch_concurrency)
            .collect()
            .await
    }

    async fn redact_validated(&self, text: &str, options: &RedactionOptions) -> RedactionResult {
        let original_length = char_len(text);
        let span = tracing::debug_span!(
            "redact_pii",
            call_id = %Uuid::new_v4(),
            chars = original_length
        );

        async move {
            let (source, candidates) = self.detect(text).await;
            let entities = reconcile(candidates, options);

            let token = masking_token(options.masking_character, self.config.token_width);
            let redacted_text = masking::redact(text, &entities, &token).into_owned();
            let redacted_length = char_len(&redacted_text);

            for entity in &entities {
                tracing::debug!(
                    category = %entity.category,
                    start = entity.start,
                    length = entity.length,
                    confidence = entity.confidence_score,
                    fingerprint = %fingerprint(&entity.text),
                    "Redacted entity"
                );
            }
            tracing::debug!(?source, entities = entities.len(), "Redaction complete");

            RedactionResult {
                redacted_text,
                entities,
                original_length,
                redacted_length,
            }
        }
        .instrument(span)
        .await
    }

    /// Cloud first when configured, regex otherwise; never a mix of both
    async fn detect(&self, text: &str) -> (DetectorKind, Vec<PIIEntity>) {
        if let Some(cloud) = &self.cloud {
            match cloud.detect(text).await {
                DetectionOutcome::Detected(entities) => return (DetectorKind::Cloud, entities),
                DetectionOutcome::Unavailable(reason) => {
                    tracing::warn!(error = %reason, "Cloud PII detection unavailable, falling back to regex");
                }
            }
        }

        (DetectorKind::Regex, self.regex.detect(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redaction::config::PIICategory;
    use crate::redaction::error::RecognizerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingRecognizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PiiRecognizer for FailingRecognizer {
        async fn recognize(&self, _text: &str) -> Result<Vec<PIIEntity>, RecognizerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(RecognizerError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_regex_only_redaction() {
        let service = RedactionService::regex_only().unwrap();
        assert!(!service.has_cloud_detector());

        let result = service
            .redact_pii("SSN: 123-45-6789 needs to be protected.", None)
            .await
            .unwrap();

        assert_eq!(result.redacted_text, "SSN: *** needs to be protected.");
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].category, PIICategory::Ssn);
        assert_eq!(result.original_length, 39);
        assert_eq!(result.redacted_length, 31);
    }

    #[tokio::test]
    async fn test_every_call_retries_cloud() {
        let recognizer = Arc::new(FailingRecognizer {
            calls: AtomicUsize::new(0),
        });
        let service =
            RedactionService::with_recognizer(RedactorConfig::default(), recognizer.clone())
                .unwrap();

        for _ in 0..3 {
            let result = service.redact_pii("mail a@b.com", None).await.unwrap();
            assert_eq!(result.redacted_text, "mail ***");
        }
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_token_width_from_config() {
        let config = RedactorConfig {
            token_width: 5,
            ..Default::default()
        };
        let service = RedactionService::new(config).unwrap();
        let result = service.redact_pii("ip 10.0.0.1", None).await.unwrap();

        assert_eq!(result.redacted_text, "ip *****");
    }

    #[tokio::test]
    async fn test_invalid_options_propagate() {
        let service = RedactionService::regex_only().unwrap();
        let options = RedactionOptions::default().with_confidence_threshold(2.0);

        let result = service.redact_pii("a@b.com", Some(&options)).await;
        assert!(matches!(result, Err(RedactionError::InvalidOptions(_))));

        let batch = service.batch_redact_pii_with(&["a@b.com"], &options).await;
        assert!(matches!(batch, Err(RedactionError::InvalidOptions(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RedactorConfig {
            batch_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            RedactionService::new(config),
            Err(RedactionError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_result_serializes_camel_case() {
        let service = RedactionService::regex_only().unwrap();
        let result = service.redact_pii("SSN 123-45-6789", None).await.unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["redactedText"], "SSN ***");
        assert_eq!(json["originalLength"], 15);
        assert_eq!(json["entities"][0]["category"], "SSN");
        assert_eq!(json["entities"][0]["confidenceScore"], 0.98);
        assert!(json["entities"][0].get("subcategory").is_none());
    }
}
