mod support;

use reel_insights::config::InsightsConfig;
use reel_insights::store::LibraryStore;
use reel_insights::{Post, PostDraft, PostType};
use support::insight;

fn post(caption: &str) -> Post {
    let mut post = Post::from_draft(PostDraft {
        image_url: "https://cdn.example.com/post.jpg".to_string(),
        image_hint: String::new(),
        caption: caption.to_string(),
        kind: PostType::Image,
    });
    post.apply_zero_metrics();
    post
}

#[tokio::test]
async fn posts_are_assigned_ids_and_listed_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = LibraryStore::load(dir.path().join("library.json"))
        .await
        .unwrap();

    let first = store.add_post("user-1", post("first")).await.unwrap();
    let second = store.add_post("user-1", post("second")).await.unwrap();

    assert!(first.id.as_deref().unwrap().starts_with("post-"));
    assert_ne!(first.id, second.id);

    let captions: Vec<_> = store
        .posts("user-1")
        .await
        .into_iter()
        .map(|post| post.caption)
        .collect();
    assert_eq!(captions, vec!["second", "first"]);
    assert!(store.posts("user-2").await.is_empty());
}

#[tokio::test]
async fn library_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("library.json");

    {
        let store = LibraryStore::load(path.clone()).await.unwrap();
        store.add_post("user-1", post("kept")).await.unwrap();
        store.add_insights("user-1", vec![insight()]).await.unwrap();
    }

    let reloaded = LibraryStore::load(path).await.unwrap();
    let posts = reloaded.posts("user-1").await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].caption, "kept");
    assert_eq!(posts[0].views, Some(0));
    assert_eq!(reloaded.insights("user-1").await, vec![insight()]);
}

#[tokio::test]
async fn insights_with_same_video_id_are_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = LibraryStore::load(dir.path().join("library.json"))
        .await
        .unwrap();

    let original = insight();
    let mut edited = insight();
    edited.title = "Morning routine (edited)".to_string();
    let mut variant = insight();
    variant.video_id = "vid-002".to_string();
    variant.is_demo = true;

    store.add_insights("user-1", vec![original]).await.unwrap();
    let saved = store
        .add_insights("user-1", vec![edited, variant])
        .await
        .unwrap();
    assert_eq!(saved, 2);

    let insights = store.insights("user-1").await;
    assert_eq!(insights.len(), 2);
    assert_eq!(insights[0].title, "Morning routine (edited)");

    let found = store.get_insight("user-1", "vid-002").await.unwrap();
    assert!(found.is_demo);
    assert!(store.get_insight("user-1", "missing").await.is_none());
}

#[test]
fn config_round_trips_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("insights.toml");

    let mut config = InsightsConfig::default();
    config.generation.default_variations = 2;
    config.llm.model = "custom-model".to_string();
    config.write(&path).unwrap();

    let (loaded, loaded_path) = InsightsConfig::load(Some(path.clone())).unwrap();
    assert_eq!(loaded_path, Some(path));
    assert_eq!(loaded.generation.default_variations, 2);
    assert_eq!(loaded.generation.max_variations, 10);
    if std::env::var("LLM_MODEL").is_err() {
        assert_eq!(loaded.llm.model, "custom-model");
    }
}

#[tokio::test]
async fn failed_write_leaves_library_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "plain file").unwrap();
    let store = LibraryStore::load(blocker.join("library.json"))
        .await
        .unwrap();

    assert!(store.add_post("alice", post("lost")).await.is_err());
    assert!(store.posts("alice").await.is_empty());

    assert!(store.add_insights("alice", vec![insight()]).await.is_err());
    assert!(store.insights("alice").await.is_empty());
    assert!(store.get_insight("alice", "vid-001").await.is_none());
}
