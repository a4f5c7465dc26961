#![allow(dead_code)]

use async_trait::async_trait;
use reel_insights::{
    Completion, CompletionRequest, CollaboratorError, InsightRecord, SynthOptions, Synthesizer,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays canned answers in order and records every request it receives.
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<Value, CollaboratorError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<Result<Value, CollaboratorError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.prompt.clone())
            .collect()
    }

    pub fn schema_names(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.schema_name.clone())
            .collect()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, CollaboratorError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CollaboratorError::Unavailable("script exhausted".to_string())))
    }
}

/// Never answers within any reasonable test timeout.
pub struct StalledCompletion {
    pub calls: Mutex<usize>,
}

impl StalledCompletion {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Completion for StalledCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<Value, CollaboratorError> {
        *self.calls.lock().unwrap() += 1;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Value::Null)
    }
}

pub fn synthesizer<C: Completion>(client: C) -> Synthesizer<C> {
    Synthesizer::new(client, SynthOptions::default())
}

pub fn malformed() -> Result<Value, CollaboratorError> {
    Err(CollaboratorError::Malformed("llm response missing JSON".to_string()))
}

pub fn unavailable() -> Result<Value, CollaboratorError> {
    Err(CollaboratorError::Unavailable("llm api error: 503".to_string()))
}

/// A bundle consistent with "Funny cat video" seeded at 50,000 views.
pub fn bundle_json() -> Value {
    json!({
        "views": 50000,
        "likes": 3200,
        "comments": 250,
        "shares": 410,
        "saves": 380,
        "reposts": 120,
        "interactions": 4360,
        "profileActivity": 640,
        "follows": 85,
        "accountsReached": 41000,
        "viewRate": 68.5,
        "skipRate": 31.5,
        "watchTime": "2h 45m",
        "avgWatchTime": 11.2,
        "audienceBreakdown": { "followers": 35.5, "nonFollowers": 64.5 },
        "interactionsBreakdown": { "followers": 62.0, "nonFollowers": 38.0 },
        "genderBreakdown": { "men": 47.3, "women": 52.7 },
        "ageBreakdown": [
            { "range": "18-24", "percentage": 38.2 },
            { "range": "25-34", "percentage": 34.1 },
            { "range": "35-44", "percentage": 18.4 },
            { "range": "45+", "percentage": 9.3 }
        ],
        "countryBreakdown": [
            { "name": "United States", "percentage": 41.0 },
            { "name": "India", "percentage": 18.5 },
            { "name": "Brazil", "percentage": 14.0 },
            { "name": "United Kingdom", "percentage": 14.5 },
            { "name": "Canada", "percentage": 12.0 }
        ],
        "viewSources": [
            { "source": "Reels tab", "percentage": 52.0 },
            { "source": "Explore", "percentage": 18.0 },
            { "source": "Feed", "percentage": 14.0 },
            { "source": "Profile", "percentage": 9.5 },
            { "source": "Stories", "percentage": 6.5 }
        ]
    })
}

pub fn bundle_without(field: &str) -> Value {
    let mut bundle = bundle_json();
    if let Some(obj) = bundle.as_object_mut() {
        obj.remove(field);
    }
    bundle
}

pub fn insight_json() -> Value {
    json!({
        "videoId": "vid-001",
        "title": "Morning routine",
        "thumbnailUrl": "https://cdn.example.com/thumb.jpg",
        "metrics": {
            "views": 12000,
            "likes": 840,
            "comments": 60,
            "saves": 120,
            "shares": 95,
            "reach": 9800,
            "impressions": 15000,
            "avg_watch_time": 9.5
        },
        "timeseries": [
            { "date": "2024-05-01", "views": 4000 },
            { "date": "2024-05-02", "views": 5000 },
            { "date": "2024-05-03", "views": 3000 }
        ],
        "countryBreakdown": [
            { "country": "United States", "views": 6000 },
            { "country": "India", "views": 3500 },
            { "country": "Brazil", "views": 2500 }
        ],
        "lastEdited": "2024-05-03T10:00:00.000Z",
        "isDemo": false
    })
}

pub fn insight() -> InsightRecord {
    serde_json::from_value(insight_json()).unwrap()
}

pub fn variation_json(video_id: &str, title: &str, views: u64) -> Value {
    let mut variation = insight_json();
    variation["videoId"] = json!(video_id);
    variation["title"] = json!(title);
    variation["metrics"]["views"] = json!(views);
    variation["metrics"]["likes"] = json!(views * 7 / 100);
    variation
}

pub fn variations(items: Vec<Value>) -> Value {
    json!({ "variations": items })
}
