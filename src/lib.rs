pub mod actions;
pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod post;
pub mod prompt;
pub mod schema;
pub mod store;
pub mod synth;
pub mod validate;

pub use actions::{
    apply_demo_data, apply_demo_data_to_insight, create_post, duplicate_insight, parse_insight,
    ActionError,
};
pub use error::{CollaboratorError, ErrorKind, SynthesisError};
pub use llm::{completion_from_env, Completion, CompletionRequest, LlmClient, Unconfigured};
pub use model::{
    AgeBucket, CountryShare, CountryViews, FollowerSplit, GenderSplit, InsightMetrics,
    InsightRecord, MetricsBundle, TimePoint, ViewSource,
};
pub use post::{Post, PostDraft, PostType};
pub use synth::{SynthOptions, Synthesizer};
pub use validate::{validate, FieldError, Schema, ValidatedRecord, Validation};

pub fn format_count(value: u64) -> String {
    let mut chars: Vec<char> = value.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(50_000), "50,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn format_percent_keeps_scale() {
        assert_eq!(format_percent(62.345), "62.3%");
    }
}
