use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::model::{
    AgeBucket, CountryShare, CountryViews, FollowerSplit, GenderSplit, InsightMetrics,
    InsightRecord, MetricsBundle, TimePoint, ViewSource,
};

pub const SUM_TOLERANCE: f64 = 0.5;

pub const AGE_BUCKETS_MIN: usize = 3;
pub const AGE_BUCKETS_MAX: usize = 4;
pub const COUNTRY_ENTRIES: usize = 5;
pub const VIEW_SOURCE_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Vec<FieldError>),
}

impl<T> Validation<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn into_result(self) -> Result<T, Vec<FieldError>> {
        match self {
            Validation::Valid(value) => Ok(value),
            Validation::Invalid(errors) => Err(errors),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U> {
        match self {
            Validation::Valid(value) => Validation::Valid(f(value)),
            Validation::Invalid(errors) => Validation::Invalid(errors),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    MetricsBundle,
    InsightRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedRecord {
    Metrics(MetricsBundle),
    Insight(InsightRecord),
}

pub fn validate(candidate: &Value, schema: Schema) -> Validation<ValidatedRecord> {
    match schema {
        Schema::MetricsBundle => validate_metrics_bundle(candidate).map(ValidatedRecord::Metrics),
        Schema::InsightRecord => validate_insight_record(candidate).map(ValidatedRecord::Insight),
    }
}

/// Checks structure, ranges, list lengths, breakdown totals and the interactions identity.
/// Nothing is corrected: a breakdown totalling 97 is reported, not rescaled.
pub fn validate_metrics_bundle(candidate: &Value) -> Validation<MetricsBundle> {
    let mut reader = Reader::default();
    let Some(root) = reader.object(candidate, "$") else {
        return reader.finish(None);
    };

    let counters_start = reader.errors.len();
    let views = reader.count(root, "", "views");
    let likes = reader.count(root, "", "likes");
    let comments = reader.count(root, "", "comments");
    let shares = reader.count(root, "", "shares");
    let saves = reader.count(root, "", "saves");
    let reposts = reader.count(root, "", "reposts");
    let interactions = reader.count(root, "", "interactions");
    if reader.errors.len() == counters_start {
        let expected = likes as u128 + comments as u128 + shares as u128 + saves as u128
            + reposts as u128;
        if interactions as u128 != expected {
            reader.fail(
                "interactions",
                format!(
                    "must equal likes + comments + shares + saves + reposts ({}), got {}",
                    expected, interactions
                ),
            );
        }
    }

    let profile_activity = reader.count(root, "", "profileActivity");
    let follows = reader.count(root, "", "follows");
    let accounts_reached = reader.count(root, "", "accountsReached");
    let view_rate = reader.percent(root, "", "viewRate");
    let skip_rate = reader.percent(root, "", "skipRate");
    let watch_time = reader.string(root, "", "watchTime");
    let avg_watch_time = reader.number(root, "", "avgWatchTime");

    let audience_breakdown = reader.follower_split(root, "audienceBreakdown");
    let interactions_breakdown = reader.follower_split(root, "interactionsBreakdown");
    let gender_breakdown = reader.gender_split(root, "genderBreakdown");

    let age_breakdown = reader.share_list(
        root,
        "ageBreakdown",
        "range",
        AGE_BUCKETS_MIN..=AGE_BUCKETS_MAX,
        |range, percentage| AgeBucket { range, percentage },
    );
    let country_breakdown = reader.share_list(
        root,
        "countryBreakdown",
        "name",
        COUNTRY_ENTRIES..=COUNTRY_ENTRIES,
        |name, percentage| CountryShare { name, percentage },
    );
    let view_sources = reader.share_list(
        root,
        "viewSources",
        "source",
        VIEW_SOURCE_ENTRIES..=VIEW_SOURCE_ENTRIES,
        |source, percentage| ViewSource { source, percentage },
    );

    let bundle = MetricsBundle {
        views,
        likes,
        comments,
        shares,
        saves,
        reposts,
        interactions,
        profile_activity,
        follows,
        accounts_reached,
        view_rate,
        skip_rate,
        watch_time,
        avg_watch_time,
        audience_breakdown,
        interactions_breakdown,
        gender_breakdown,
        age_breakdown,
        country_breakdown,
        view_sources,
    };
    reader.finish(Some(bundle))
}

pub fn validate_insight_record(candidate: &Value) -> Validation<InsightRecord> {
    let mut reader = Reader::default();
    let Some(root) = reader.object(candidate, "$") else {
        return reader.finish(None);
    };

    let video_id = reader.string(root, "", "videoId");
    if video_id.trim().is_empty() && root.get("videoId").is_some_and(Value::is_string) {
        reader.fail("videoId", "must not be empty");
    }
    let title = reader.string(root, "", "title");
    let thumbnail_url = reader.string(root, "", "thumbnailUrl");

    let metrics = match reader
        .field(root, "", "metrics")
        .and_then(|value| reader.object(value, "metrics"))
    {
        Some(obj) => InsightMetrics {
            views: reader.count(obj, "metrics", "views"),
            likes: reader.count(obj, "metrics", "likes"),
            comments: reader.count(obj, "metrics", "comments"),
            saves: reader.count(obj, "metrics", "saves"),
            shares: reader.count(obj, "metrics", "shares"),
            reach: reader.count(obj, "metrics", "reach"),
            impressions: reader.count(obj, "metrics", "impressions"),
            avg_watch_time: reader.number(obj, "metrics", "avg_watch_time"),
        },
        None => InsightMetrics::default(),
    };

    let mut timeseries = Vec::new();
    if let Some(items) = reader.array(root, "", "timeseries") {
        for (idx, item) in items.iter().enumerate() {
            let path = format!("timeseries[{}]", idx);
            if let Some(obj) = reader.object(item, &path) {
                timeseries.push(TimePoint {
                    date: reader.string(obj, &path, "date"),
                    views: reader.count(obj, &path, "views"),
                });
            }
        }
    }

    let mut country_breakdown = Vec::new();
    if let Some(items) = reader.array(root, "", "countryBreakdown") {
        for (idx, item) in items.iter().enumerate() {
            let path = format!("countryBreakdown[{}]", idx);
            if let Some(obj) = reader.object(item, &path) {
                country_breakdown.push(CountryViews {
                    country: reader.string(obj, &path, "country"),
                    views: reader.count(obj, &path, "views"),
                });
            }
        }
    }

    let last_edited = reader.string(root, "", "lastEdited");
    let is_demo = reader.boolean(root, "", "isDemo");

    let record = InsightRecord {
        video_id,
        title,
        thumbnail_url,
        metrics,
        timeseries,
        country_breakdown,
        last_edited,
        is_demo,
    };
    reader.finish(Some(record))
}

#[derive(Default)]
struct Reader {
    errors: Vec<FieldError>,
}

impl Reader {
    fn finish<T>(self, value: Option<T>) -> Validation<T> {
        match value {
            Some(value) if self.errors.is_empty() => Validation::Valid(value),
            _ => Validation::Invalid(self.errors),
        }
    }

    fn fail(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(path, message));
    }

    fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.fail(path, format!("expected object, found {}", kind_of(value)));
                None
            }
        }
    }

    fn field<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a Value> {
        match obj.get(key) {
            Some(Value::Null) | None => {
                self.fail(join(parent, key), "missing field");
                None
            }
            Some(value) => Some(value),
        }
    }

    fn count(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) -> u64 {
        let Some(value) = self.field(obj, parent, key) else {
            return 0;
        };
        if let Some(count) = value.as_u64() {
            return count;
        }
        let path = join(parent, key);
        match value.as_f64() {
            Some(number) if number < 0.0 => {
                self.fail(path, format!("must be non-negative, got {}", number));
                0
            }
            // u64::MAX as f64 rounds up to 2^64, so the bound must be strict.
            Some(number) if number.fract() == 0.0 && number < u64::MAX as f64 => number as u64,
            Some(number) if number.fract() == 0.0 => {
                self.fail(path, format!("exceeds maximum count, got {}", number));
                0
            }
            Some(number) => {
                self.fail(path, format!("must be an integer, got {}", number));
                0
            }
            None => {
                self.fail(path, format!("expected integer, found {}", kind_of(value)));
                0
            }
        }
    }

    fn number(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) -> f64 {
        let Some(value) = self.field(obj, parent, key) else {
            return 0.0;
        };
        let path = join(parent, key);
        match value.as_f64() {
            Some(number) if number.is_finite() && number >= 0.0 => number,
            Some(number) => {
                self.fail(path, format!("must be non-negative, got {}", number));
                0.0
            }
            None => {
                self.fail(path, format!("expected number, found {}", kind_of(value)));
                0.0
            }
        }
    }

    fn percent(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) -> f64 {
        let Some(value) = self.field(obj, parent, key) else {
            return 0.0;
        };
        let path = join(parent, key);
        match value.as_f64() {
            Some(number) if (0.0..=100.0).contains(&number) => number,
            Some(number) => {
                self.fail(path, format!("percentage out of range [0, 100]: {}", number));
                0.0
            }
            None => {
                self.fail(path, format!("expected number, found {}", kind_of(value)));
                0.0
            }
        }
    }

    fn string(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) -> String {
        let Some(value) = self.field(obj, parent, key) else {
            return String::new();
        };
        match value.as_str() {
            Some(text) => text.to_string(),
            None => {
                self.fail(
                    join(parent, key),
                    format!("expected string, found {}", kind_of(value)),
                );
                String::new()
            }
        }
    }

    fn boolean(&mut self, obj: &Map<String, Value>, parent: &str, key: &str) -> bool {
        let Some(value) = self.field(obj, parent, key) else {
            return false;
        };
        match value.as_bool() {
            Some(flag) => flag,
            None => {
                self.fail(
                    join(parent, key),
                    format!("expected boolean, found {}", kind_of(value)),
                );
                false
            }
        }
    }

    fn array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a [Value]> {
        let value = self.field(obj, parent, key)?;
        match value.as_array() {
            Some(items) => Some(items.as_slice()),
            None => {
                self.fail(
                    join(parent, key),
                    format!("expected array, found {}", kind_of(value)),
                );
                None
            }
        }
    }

    fn follower_split(&mut self, root: &Map<String, Value>, key: &str) -> FollowerSplit {
        let start = self.errors.len();
        let split = match self.field(root, "", key).and_then(|value| self.object(value, key)) {
            Some(obj) => FollowerSplit {
                followers: self.percent(obj, key, "followers"),
                non_followers: self.percent(obj, key, "nonFollowers"),
            },
            None => FollowerSplit {
                followers: 0.0,
                non_followers: 0.0,
            },
        };
        if self.errors.len() == start {
            self.check_total(key, &[split.followers, split.non_followers]);
        }
        split
    }

    fn gender_split(&mut self, root: &Map<String, Value>, key: &str) -> GenderSplit {
        let start = self.errors.len();
        let split = match self.field(root, "", key).and_then(|value| self.object(value, key)) {
            Some(obj) => GenderSplit {
                men: self.percent(obj, key, "men"),
                women: self.percent(obj, key, "women"),
            },
            None => GenderSplit {
                men: 0.0,
                women: 0.0,
            },
        };
        if self.errors.len() == start {
            self.check_total(key, &[split.men, split.women]);
        }
        split
    }

    fn share_list<T>(
        &mut self,
        root: &Map<String, Value>,
        key: &str,
        label: &str,
        expected_len: std::ops::RangeInclusive<usize>,
        build: impl Fn(String, f64) -> T,
    ) -> Vec<T> {
        let start = self.errors.len();
        let Some(items) = self.array(root, "", key) else {
            return Vec::new();
        };

        if !expected_len.contains(&items.len()) {
            let expected = if expected_len.start() == expected_len.end() {
                format!("{}", expected_len.start())
            } else {
                format!("{}-{}", expected_len.start(), expected_len.end())
            };
            self.fail(
                key,
                format!("expected {} entries, found {}", expected, items.len()),
            );
        }

        let mut entries = Vec::with_capacity(items.len());
        let mut shares = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let path = format!("{}[{}]", key, idx);
            if let Some(obj) = self.object(item, &path) {
                let name = self.string(obj, &path, label);
                let percentage = self.percent(obj, &path, "percentage");
                shares.push(percentage);
                entries.push(build(name, percentage));
            }
        }

        if self.errors.len() == start {
            self.check_total(key, &shares);
        }
        entries
    }

    fn check_total(&mut self, path: &str, shares: &[f64]) {
        let total: f64 = shares.iter().sum();
        if (total - 100.0).abs() > SUM_TOLERANCE {
            self.fail(
                path,
                format!("percentages sum to {:.2}, expected 100 ± {}", total, SUM_TOLERANCE),
            );
        }
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
