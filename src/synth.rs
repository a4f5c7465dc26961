use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::InsightsConfig;
use crate::error::SynthesisError;
use crate::llm::{Completion, CompletionRequest};
use crate::model::{InsightRecord, MetricsBundle};
use crate::prompt;
use crate::schema::{
    metrics_bundle_schema, variations_schema, METRICS_SCHEMA_NAME, VARIATIONS_SCHEMA_NAME,
};
use crate::validate::{validate_insight_record, validate_metrics_bundle, FieldError, Validation};

pub const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub call_timeout: Duration,
    pub max_variations: usize,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            max_variations: 10,
        }
    }
}

impl SynthOptions {
    pub fn from_config(config: &InsightsConfig) -> Self {
        Self {
            call_timeout: config.call_timeout(),
            max_variations: config.generation.max_variations.max(1),
        }
    }
}

pub struct Synthesizer<C> {
    client: C,
    options: SynthOptions,
}

impl<C: Completion> Synthesizer<C> {
    pub fn new(client: C, options: SynthOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &SynthOptions {
        &self.options
    }

    pub async fn synthesize(
        &self,
        title: &str,
        initial_views: u64,
    ) -> Result<MetricsBundle, SynthesisError> {
        self.synthesize_with_cancel(title, initial_views, &CancellationToken::new())
            .await
    }

    pub async fn synthesize_with_cancel(
        &self,
        title: &str,
        initial_views: u64,
        cancel: &CancellationToken,
    ) -> Result<MetricsBundle, SynthesisError> {
        let bundle = self
            .generate(
                METRICS_SCHEMA_NAME,
                metrics_bundle_schema(),
                prompt::metrics_prompt(title, initial_views),
                cancel,
                |value| {
                    validate_metrics_bundle(&value)
                        .into_result()
                        .map_err(SynthesisError::SchemaViolation)
                },
            )
            .await?;

        info!(
            title,
            initial_views,
            views = bundle.views,
            interactions = bundle.interactions,
            "demo metrics synthesized"
        );
        Ok(bundle)
    }

    pub async fn generate_variations(
        &self,
        original: &InsightRecord,
        count: usize,
    ) -> Result<Vec<InsightRecord>, SynthesisError> {
        self.generate_variations_with_cancel(original, count, &CancellationToken::new())
            .await
    }

    pub async fn generate_variations_with_cancel(
        &self,
        original: &InsightRecord,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<InsightRecord>, SynthesisError> {
        if count == 0 {
            return Err(SynthesisError::invalid_input("count", "must be at least 1"));
        }
        if count > self.options.max_variations {
            return Err(SynthesisError::invalid_input(
                "count",
                format!("must be at most {}", self.options.max_variations),
            ));
        }

        let original_value = serde_json::to_value(original).map_err(|err| {
            SynthesisError::invalid_input("$", format!("failed to serialize insight: {}", err))
        })?;
        if let Validation::Invalid(errors) = validate_insight_record(&original_value) {
            return Err(SynthesisError::InvalidInput(errors));
        }
        let original_json = serde_json::to_string_pretty(&original_value).map_err(|err| {
            SynthesisError::invalid_input("$", format!("failed to serialize insight: {}", err))
        })?;

        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let variants = self
            .generate(
                VARIATIONS_SCHEMA_NAME,
                variations_schema(count),
                prompt::variations_prompt(&original_json, &original.video_id, count),
                cancel,
                |value| accept_variations(value, count, &stamp),
            )
            .await?;

        let variants = assign_unique_ids(variants, &original.video_id);
        info!(
            video_id = %original.video_id,
            count = variants.len(),
            "insight variations generated"
        );
        Ok(variants)
    }

    async fn generate<T>(
        &self,
        schema_name: &str,
        schema: Value,
        base_prompt: String,
        cancel: &CancellationToken,
        accept: impl Fn(Value) -> Result<T, SynthesisError>,
    ) -> Result<T, SynthesisError> {
        let mut request = CompletionRequest {
            schema_name: schema_name.to_string(),
            prompt: base_prompt.clone(),
            schema,
        };

        let mut attempt = 1;
        loop {
            let outcome = match self.call(&request, cancel).await {
                Ok(value) => accept(value),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(record) => return Ok(record),
                Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        schema = schema_name,
                        attempt,
                        error = %err,
                        "generated output rejected, retrying"
                    );
                    request.prompt = prompt::with_corrections(&base_prompt, &problems(&err));
                    attempt += 1;
                }
                Err(err) => {
                    warn!(schema = schema_name, attempt, error = %err, "generation failed");
                    return Err(err);
                }
            }
        }
    }

    async fn call(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<Value, SynthesisError> {
        if cancel.is_cancelled() {
            return Err(SynthesisError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SynthesisError::Cancelled),
            outcome = tokio::time::timeout(self.options.call_timeout, self.client.complete(request)) => {
                match outcome {
                    Ok(result) => result.map_err(SynthesisError::from),
                    Err(_) => Err(SynthesisError::CollaboratorUnavailable(format!(
                        "no response within {} ms",
                        self.options.call_timeout.as_millis()
                    ))),
                }
            }
        }
    }
}

/// Count policy: too few is a mismatch (retried once), too many is truncated.
fn accept_variations(
    value: Value,
    count: usize,
    stamp: &str,
) -> Result<Vec<InsightRecord>, SynthesisError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("variations") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SynthesisError::MalformedOutput(
                    "expected a \"variations\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(SynthesisError::MalformedOutput(
                "expected an array of variations".to_string(),
            ))
        }
    };

    if items.len() < count {
        return Err(SynthesisError::CountMismatch {
            expected: count,
            received: items.len(),
        });
    }
    if items.len() > count {
        warn!(
            expected = count,
            received = items.len(),
            "truncating surplus variations"
        );
    }

    let mut variants = Vec::with_capacity(count);
    let mut errors = Vec::new();
    for (idx, mut item) in items.into_iter().take(count).enumerate() {
        if let Some(obj) = item.as_object_mut() {
            obj.insert("isDemo".to_string(), Value::Bool(true));
            obj.insert("lastEdited".to_string(), Value::String(stamp.to_string()));
        }
        match validate_insight_record(&item) {
            Validation::Valid(record) => variants.push(record),
            Validation::Invalid(found) => {
                errors.extend(found.into_iter().map(|err| {
                    let path = if err.path == "$" {
                        format!("variations[{}]", idx)
                    } else {
                        format!("variations[{}].{}", idx, err.path)
                    };
                    FieldError::new(path, err.message)
                }));
            }
        }
    }

    if !errors.is_empty() {
        return Err(SynthesisError::SchemaViolation(errors));
    }
    Ok(variants)
}

fn assign_unique_ids(mut variants: Vec<InsightRecord>, original_id: &str) -> Vec<InsightRecord> {
    let mut seen = HashSet::new();
    seen.insert(original_id.to_string());
    let mut rng = rand::thread_rng();

    for (idx, variant) in variants.iter_mut().enumerate() {
        if seen.contains(&variant.video_id) {
            let mut candidate = fresh_id(original_id, idx, &mut rng);
            while seen.contains(&candidate) {
                candidate = fresh_id(original_id, idx, &mut rng);
            }
            warn!(
                duplicate = %variant.video_id,
                replacement = %candidate,
                "variation reused an existing videoId"
            );
            variant.video_id = candidate;
        }
        seen.insert(variant.video_id.clone());
    }
    variants
}

fn fresh_id(original_id: &str, idx: usize, rng: &mut impl Rng) -> String {
    format!(
        "{}-v{}-{:06x}",
        original_id,
        idx + 1,
        rng.gen::<u32>() & 0x00ff_ffff
    )
}

fn problems(err: &SynthesisError) -> Vec<String> {
    match err {
        SynthesisError::SchemaViolation(errors) => prompt::field_problems(errors),
        SynthesisError::CountMismatch { expected, received } => vec![format!(
            "expected exactly {} variations, received {}",
            expected, received
        )],
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InsightMetrics;

    fn record(video_id: &str) -> InsightRecord {
        InsightRecord {
            video_id: video_id.to_string(),
            title: "clip".to_string(),
            thumbnail_url: String::new(),
            metrics: InsightMetrics::default(),
            timeseries: Vec::new(),
            country_breakdown: Vec::new(),
            last_edited: String::new(),
            is_demo: true,
        }
    }

    #[test]
    fn colliding_ids_are_replaced() {
        let variants = vec![record("orig"), record("b"), record("b")];
        let fixed = assign_unique_ids(variants, "orig");

        let ids: HashSet<_> = fixed.iter().map(|variant| variant.video_id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains("orig"));
        assert_eq!(fixed[1].video_id, "b");
        assert!(fixed[0].video_id.starts_with("orig-v1-"));
        assert!(fixed[2].video_id.starts_with("orig-v3-"));
    }

    #[test]
    fn non_array_payload_is_malformed() {
        let err = accept_variations(Value::String("nope".to_string()), 1, "t").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedOutput);
    }

    #[test]
    fn object_without_variations_key_is_malformed() {
        let payload = serde_json::json!({ "items": [serde_json::to_value(record("a")).unwrap()] });
        let err = accept_variations(payload, 1, "t").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedOutput);
        assert!(err.is_retryable());
    }
}
