use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub saves: u64,
    pub reposts: u64,
    pub interactions: u64,
    pub profile_activity: u64,
    pub follows: u64,
    pub accounts_reached: u64,
    pub view_rate: f64,
    pub skip_rate: f64,
    pub watch_time: String,
    pub avg_watch_time: f64,
    pub audience_breakdown: FollowerSplit,
    pub interactions_breakdown: FollowerSplit,
    pub gender_breakdown: GenderSplit,
    pub age_breakdown: Vec<AgeBucket>,
    pub country_breakdown: Vec<CountryShare>,
    pub view_sources: Vec<ViewSource>,
}

impl MetricsBundle {
    pub fn interaction_total(&self) -> u64 {
        self.likes + self.comments + self.shares + self.saves + self.reposts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerSplit {
    pub followers: f64,
    pub non_followers: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderSplit {
    pub men: f64,
    pub women: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBucket {
    pub range: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryShare {
    pub name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSource {
    pub source: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRecord {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub metrics: InsightMetrics,
    pub timeseries: Vec<TimePoint>,
    pub country_breakdown: Vec<CountryViews>,
    pub last_edited: String,
    pub is_demo: bool,
}

// Field names are snake_case on the wire for this block only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub saves: u64,
    pub shares: u64,
    pub reach: u64,
    pub impressions: u64,
    pub avg_watch_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryViews {
    pub country: String,
    pub views: u64,
}
