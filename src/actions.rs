use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::error::{ErrorKind, SynthesisError};
use crate::llm::Completion;
use crate::model::{InsightMetrics, InsightRecord, MetricsBundle};
use crate::post::{Post, PostDraft};
use crate::synth::Synthesizer;
use crate::validate::validate_insight_record;

pub const DASHBOARD_VARIATIONS: usize = 1;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to apply demo data.")]
    ApplyDemoData(#[source] SynthesisError),
    #[error("Failed to duplicate insight.")]
    DuplicateInsight(#[source] SynthesisError),
}

impl ActionError {
    pub fn cause(&self) -> &SynthesisError {
        match self {
            ActionError::ApplyDemoData(err) | ActionError::DuplicateInsight(err) => err,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause().kind()
    }
}

pub async fn apply_demo_data<C: Completion>(
    synth: &Synthesizer<C>,
    title: &str,
    initial_views: u64,
) -> Result<MetricsBundle, ActionError> {
    synth.synthesize(title, initial_views).await.map_err(|err| {
        error!(kind = err.kind().label(), error = %err, "error applying demo data");
        ActionError::ApplyDemoData(err)
    })
}

pub async fn apply_demo_data_to_insight<C: Completion>(
    synth: &Synthesizer<C>,
    insight: &InsightRecord,
) -> Result<MetricsBundle, ActionError> {
    apply_demo_data(synth, &insight.title, insight.metrics.views).await
}

pub async fn duplicate_insight<C: Completion>(
    synth: &Synthesizer<C>,
    original: &InsightRecord,
    count: usize,
) -> Result<Vec<InsightRecord>, ActionError> {
    synth
        .generate_variations(original, count)
        .await
        .map_err(|err| {
            error!(kind = err.kind().label(), error = %err, "error duplicating insight");
            ActionError::DuplicateInsight(err)
        })
}

pub fn parse_insight(value: &Value) -> Result<InsightRecord, SynthesisError> {
    validate_insight_record(value)
        .into_result()
        .map_err(SynthesisError::InvalidInput)
}

/// Creates a post seeded with demo metrics. Synthesis failures never abort creation: the
/// post falls back to zero views, likes and comments.
pub async fn create_post<C: Completion>(synth: &Synthesizer<C>, draft: PostDraft) -> Post {
    let mut post = Post::from_draft(draft);
    let now = Utc::now();
    post.created_at = Some(now.to_rfc3339_opts(SecondsFormat::Millis, true));

    let seed = InsightRecord {
        video_id: format!("temp-{}", now.timestamp_millis()),
        title: post.display_title().to_string(),
        thumbnail_url: post.image_url.clone(),
        metrics: InsightMetrics::default(),
        timeseries: Vec::new(),
        country_breakdown: Vec::new(),
        last_edited: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        is_demo: false,
    };

    match apply_demo_data_to_insight(synth, &seed).await {
        Ok(bundle) => post.apply_metrics(&bundle),
        Err(err) => {
            error!(
                cause = %err.cause(),
                "failed to apply demo data, creating post with default metrics"
            );
            post.apply_zero_metrics();
        }
    }
    post
}
