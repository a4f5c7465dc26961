use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::model::InsightRecord;
use crate::post::Post;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserLibrary {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub insights: Vec<InsightRecord>,
}

pub struct LibraryStore {
    path: PathBuf,
    users: RwLock<HashMap<String, UserLibrary>>,
    next_id: AtomicUsize,
}

impl LibraryStore {
    pub async fn load(path: PathBuf) -> Result<Self, String> {
        let users = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read library: {}", err))?;
            if data.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&data)
                    .map_err(|err| format!("failed to parse library: {}", err))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
            next_id: AtomicUsize::new(0),
        })
    }

    pub async fn posts(&self, user_id: &str) -> Vec<Post> {
        let guard = self.users.read().await;
        guard
            .get(user_id)
            .map(|library| library.posts.clone())
            .unwrap_or_default()
    }

    pub async fn add_post(&self, user_id: &str, mut post: Post) -> Result<Post, String> {
        if post.id.is_none() {
            post.id = Some(self.generate_post_id());
        }
        let mut guard = self.users.write().await;
        let mut updated = guard.clone();
        updated
            .entry(user_id.to_string())
            .or_default()
            .posts
            .insert(0, post.clone());
        self.persist(&updated).await?;
        *guard = updated;
        Ok(post)
    }

    pub async fn insights(&self, user_id: &str) -> Vec<InsightRecord> {
        let guard = self.users.read().await;
        guard
            .get(user_id)
            .map(|library| library.insights.clone())
            .unwrap_or_default()
    }

    pub async fn get_insight(&self, user_id: &str, video_id: &str) -> Option<InsightRecord> {
        let guard = self.users.read().await;
        guard.get(user_id).and_then(|library| {
            library
                .insights
                .iter()
                .find(|insight| insight.video_id == video_id)
                .cloned()
        })
    }

    pub async fn add_insights(
        &self,
        user_id: &str,
        insights: Vec<InsightRecord>,
    ) -> Result<usize, String> {
        let mut guard = self.users.write().await;
        let mut updated = guard.clone();
        let library = updated.entry(user_id.to_string()).or_default();
        let added = insights.len();
        for insight in insights {
            match library
                .insights
                .iter_mut()
                .find(|existing| existing.video_id == insight.video_id)
            {
                Some(existing) => *existing = insight,
                None => library.insights.push(insight),
            }
        }
        self.persist(&updated).await?;
        *guard = updated;
        Ok(added)
    }

    fn generate_post_id(&self) -> String {
        let counter = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("post-{}-{}", chrono::Utc::now().timestamp_millis(), counter)
    }

    async fn persist(&self, users: &HashMap<String, UserLibrary>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(users)
            .map_err(|err| format!("failed to serialize library: {}", err))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| format!("failed to write library: {}", err))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| format!("failed to finalize library: {}", err))?;
        Ok(())
    }
}

async fn ensure_dir(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| format!("failed to create library dir: {}", err))
}
