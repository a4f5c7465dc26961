use serde::{Deserialize, Serialize};

use crate::model::{AgeBucket, CountryShare, FollowerSplit, GenderSplit, MetricsBundle, ViewSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Image,
    Reel,
}

impl PostType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "image" | "photo" | "pic" => Some(PostType::Image),
            "reel" | "video" | "vid" => Some(PostType::Reel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub image_url: String,
    pub image_hint: String,
    pub caption: String,
    pub kind: PostType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub image_url: String,
    pub image_hint: String,
    #[serde(default)]
    pub caption: String,
    #[serde(rename = "type")]
    pub kind: PostType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saves: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_activity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_reached: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_watch_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_breakdown: Option<FollowerSplit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions_breakdown: Option<FollowerSplit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_breakdown: Option<GenderSplit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_breakdown: Option<Vec<AgeBucket>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_breakdown: Option<Vec<CountryShare>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_sources: Option<Vec<ViewSource>>,
}

impl Post {
    pub fn from_draft(draft: PostDraft) -> Self {
        Self {
            id: None,
            image_url: draft.image_url,
            image_hint: draft.image_hint,
            caption: draft.caption,
            kind: draft.kind,
            created_at: None,
            views: None,
            likes: None,
            comments: None,
            shares: None,
            saves: None,
            reposts: None,
            interactions: None,
            profile_activity: None,
            follows: None,
            accounts_reached: None,
            view_rate: None,
            skip_rate: None,
            watch_time: None,
            avg_watch_time: None,
            audience_breakdown: None,
            interactions_breakdown: None,
            gender_breakdown: None,
            age_breakdown: None,
            country_breakdown: None,
            view_sources: None,
        }
    }

    pub fn apply_metrics(&mut self, bundle: &MetricsBundle) {
        self.views = Some(bundle.views);
        self.likes = Some(bundle.likes);
        self.comments = Some(bundle.comments);
        self.shares = Some(bundle.shares);
        self.saves = Some(bundle.saves);
        self.reposts = Some(bundle.reposts);
        self.interactions = Some(bundle.interactions);
        self.profile_activity = Some(bundle.profile_activity);
        self.follows = Some(bundle.follows);
        self.accounts_reached = Some(bundle.accounts_reached);
        self.view_rate = Some(bundle.view_rate);
        self.skip_rate = Some(bundle.skip_rate);
        self.watch_time = Some(bundle.watch_time.clone());
        self.avg_watch_time = Some(bundle.avg_watch_time);
        self.audience_breakdown = Some(bundle.audience_breakdown.clone());
        self.interactions_breakdown = Some(bundle.interactions_breakdown.clone());
        self.gender_breakdown = Some(bundle.gender_breakdown.clone());
        self.age_breakdown = Some(bundle.age_breakdown.clone());
        self.country_breakdown = Some(bundle.country_breakdown.clone());
        self.view_sources = Some(bundle.view_sources.clone());
    }

    pub fn apply_zero_metrics(&mut self) {
        self.views = Some(0);
        self.likes = Some(0);
        self.comments = Some(0);
    }

    pub fn display_title(&self) -> &str {
        let caption = self.caption.trim();
        if caption.is_empty() {
            "New Post"
        } else {
            caption
        }
    }
}
