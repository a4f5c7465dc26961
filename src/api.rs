use serde::{Deserialize, Serialize};
use serde_json::Value;
use reel_insights::{
    parse_insight, ActionError, FieldError, InsightRecord, MetricsBundle, SynthesisError,
};

#[derive(Debug, Deserialize)]
pub struct ApiDemoDataRequest {
    pub request_id: Option<String>,
    pub title: Option<String>,
    pub initial_views: Option<u64>,
}

impl ApiDemoDataRequest {
    pub fn into_input(self) -> (String, u64) {
        (
            self.title.unwrap_or_default().trim().to_string(),
            self.initial_views.unwrap_or(0),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiDuplicateRequest {
    pub request_id: Option<String>,
    pub original: Option<Value>,
    pub count: Option<usize>,
}

impl ApiDuplicateRequest {
    pub fn into_input(self, default_count: usize) -> Result<(InsightRecord, usize), SynthesisError> {
        let original = self
            .original
            .ok_or_else(|| SynthesisError::invalid_input("original", "missing field"))?;
        let original = parse_insight(&original)?;
        Ok((original, self.count.unwrap_or(default_count)))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiDemoDataResponse {
    pub request_id: String,
    pub metrics: MetricsBundle,
}

#[derive(Debug, Serialize)]
pub struct ApiDuplicateResponse {
    pub request_id: String,
    pub variations: Vec<InsightRecord>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub request_id: String,
    pub error: String,
    pub kind: &'static str,
    pub detail: String,
    pub field_errors: Vec<FieldError>,
}

impl ApiErrorResponse {
    pub fn from_action(err: &ActionError, request_id: String) -> Self {
        Self {
            request_id,
            error: err.to_string(),
            ..Self::from_synthesis(err.cause(), String::new())
        }
    }

    pub fn from_synthesis(err: &SynthesisError, request_id: String) -> Self {
        let field_errors = match err {
            SynthesisError::SchemaViolation(errors) | SynthesisError::InvalidInput(errors) => {
                errors.clone()
            }
            _ => Vec::new(),
        };
        Self {
            request_id,
            error: err.to_string(),
            kind: err.kind().label(),
            detail: err.to_string(),
            field_errors,
        }
    }
}
