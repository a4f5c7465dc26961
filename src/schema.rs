use serde_json::{json, Value};

pub const METRICS_SCHEMA_NAME: &str = "metrics_bundle";
pub const VARIATIONS_SCHEMA_NAME: &str = "insight_variations";

pub fn metrics_bundle_schema() -> Value {
    let counters = [
        "views",
        "likes",
        "comments",
        "shares",
        "saves",
        "reposts",
        "interactions",
        "profileActivity",
        "follows",
        "accountsReached",
    ];

    let mut properties = serde_json::Map::new();
    for name in counters {
        properties.insert(name.to_string(), integer());
    }
    properties.insert("viewRate".to_string(), percentage());
    properties.insert("skipRate".to_string(), percentage());
    properties.insert(
        "watchTime".to_string(),
        json!({ "type": "string", "description": "Total watch time, e.g. \"2h 45m\"." }),
    );
    properties.insert(
        "avgWatchTime".to_string(),
        json!({ "type": "number", "minimum": 0, "description": "Average watch time in seconds." }),
    );
    properties.insert(
        "audienceBreakdown".to_string(),
        split(&["followers", "nonFollowers"]),
    );
    properties.insert(
        "interactionsBreakdown".to_string(),
        split(&["followers", "nonFollowers"]),
    );
    properties.insert("genderBreakdown".to_string(), split(&["men", "women"]));
    properties.insert("ageBreakdown".to_string(), share_list("range", 3, 4));
    properties.insert("countryBreakdown".to_string(), share_list("name", 5, 5));
    properties.insert("viewSources".to_string(), share_list("source", 5, 5));

    let required: Vec<Value> = properties.keys().cloned().map(Value::String).collect();
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
        "additionalProperties": false,
    })
}

pub fn insight_record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "videoId": { "type": "string" },
            "title": { "type": "string" },
            "thumbnailUrl": { "type": "string" },
            "metrics": {
                "type": "object",
                "properties": {
                    "views": integer(),
                    "likes": integer(),
                    "comments": integer(),
                    "saves": integer(),
                    "shares": integer(),
                    "reach": integer(),
                    "impressions": integer(),
                    "avg_watch_time": { "type": "number", "minimum": 0 },
                },
                "required": [
                    "views", "likes", "comments", "saves", "shares",
                    "reach", "impressions", "avg_watch_time"
                ],
                "additionalProperties": false,
            },
            "timeseries": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "date": { "type": "string" }, "views": integer() },
                    "required": ["date", "views"],
                    "additionalProperties": false,
                },
            },
            "countryBreakdown": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "country": { "type": "string" }, "views": integer() },
                    "required": ["country", "views"],
                    "additionalProperties": false,
                },
            },
            "lastEdited": { "type": "string" },
            "isDemo": { "type": "boolean" },
        },
        "required": [
            "videoId", "title", "thumbnailUrl", "metrics", "timeseries",
            "countryBreakdown", "lastEdited", "isDemo"
        ],
        "additionalProperties": false,
    })
}

/// Structured-output endpoints only accept an object at the top level, so the batch is
/// wrapped in `{ "variations": [...] }`.
pub fn variations_schema(count: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "variations": {
                "type": "array",
                "items": insight_record_schema(),
                "minItems": count,
                "maxItems": count,
            },
        },
        "required": ["variations"],
        "additionalProperties": false,
    })
}

fn integer() -> Value {
    json!({ "type": "integer", "minimum": 0 })
}

fn percentage() -> Value {
    json!({ "type": "number", "minimum": 0, "maximum": 100 })
}

fn split(fields: &[&str]) -> Value {
    let mut properties = serde_json::Map::new();
    for field in fields {
        properties.insert(field.to_string(), percentage());
    }
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": fields,
        "additionalProperties": false,
    })
}

fn share_list(label: &str, min: usize, max: usize) -> Value {
    json!({
        "type": "array",
        "minItems": min,
        "maxItems": max,
        "items": {
            "type": "object",
            "properties": {
                label: { "type": "string" },
                "percentage": percentage(),
            },
            "required": [label, "percentage"],
            "additionalProperties": false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_schema_requires_every_property() {
        let schema = metrics_bundle_schema();
        let properties = schema["properties"].as_object().map(|map| map.len()).unwrap_or(0);
        let required = schema["required"].as_array().map(|list| list.len()).unwrap_or(0);
        assert_eq!(properties, 20);
        assert_eq!(properties, required);
    }

    #[test]
    fn variations_schema_pins_batch_length() {
        let schema = variations_schema(4);
        assert_eq!(schema["properties"]["variations"]["minItems"], 4);
        assert_eq!(schema["properties"]["variations"]["maxItems"], 4);
    }
}
