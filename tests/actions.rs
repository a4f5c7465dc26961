mod support;

use reel_insights::{
    apply_demo_data, apply_demo_data_to_insight, create_post, duplicate_insight, parse_insight,
    ActionError, ErrorKind, PostDraft, PostType,
};
use serde_json::json;
use support::{
    bundle_json, insight, insight_json, malformed, synthesizer, unavailable, variation_json,
    variations, ScriptedCompletion,
};

fn draft(caption: &str) -> PostDraft {
    PostDraft {
        image_url: "https://cdn.example.com/post.jpg".to_string(),
        image_hint: "cat on sofa".to_string(),
        caption: caption.to_string(),
        kind: PostType::Reel,
    }
}

#[tokio::test]
async fn apply_demo_data_failure_uses_dashboard_message() {
    let client = ScriptedCompletion::new(vec![unavailable()]);
    let synth = synthesizer(client.clone());

    let err = apply_demo_data(&synth, "Funny cat video", 50_000)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::ApplyDemoData(_)));
    assert_eq!(err.to_string(), "Failed to apply demo data.");
    assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
}

#[tokio::test]
async fn duplicate_failure_uses_dashboard_message() {
    let client = ScriptedCompletion::new(vec![malformed(), malformed()]);
    let synth = synthesizer(client.clone());

    let err = duplicate_insight(&synth, &insight(), 1).await.unwrap_err();

    assert!(matches!(err, ActionError::DuplicateInsight(_)));
    assert_eq!(err.to_string(), "Failed to duplicate insight.");
    assert_eq!(err.kind(), ErrorKind::MalformedOutput);
}

#[tokio::test]
async fn duplicate_returns_demo_variants() {
    let client = ScriptedCompletion::new(vec![Ok(variations(vec![variation_json(
        "vid-777", "Evening routine", 14_000,
    )]))]);
    let synth = synthesizer(client.clone());

    let result = duplicate_insight(&synth, &insight(), 1).await.unwrap();
    assert_eq!(result.len(), 1);
    assert!(result[0].is_demo);
    assert_eq!(result[0].metrics.views, 14_000);
}

#[tokio::test]
async fn demo_data_for_insight_uses_its_title_and_views() {
    let client = ScriptedCompletion::new(vec![Ok(bundle_json())]);
    let synth = synthesizer(client.clone());

    apply_demo_data_to_insight(&synth, &insight()).await.unwrap();

    let prompt = &client.prompts()[0];
    assert!(prompt.contains("Video Title: Morning routine"));
    assert!(prompt.contains("Initial Views: 12000"));
}

#[tokio::test]
async fn create_post_merges_generated_metrics() {
    let client = ScriptedCompletion::new(vec![Ok(bundle_json())]);
    let synth = synthesizer(client.clone());

    let post = create_post(&synth, draft("Funny cat video")).await;

    assert_eq!(post.caption, "Funny cat video");
    assert_eq!(post.kind, PostType::Reel);
    assert_eq!(post.views, Some(50_000));
    assert_eq!(post.likes, Some(3_200));
    assert_eq!(post.interactions, Some(4_360));
    assert_eq!(post.watch_time.as_deref(), Some("2h 45m"));
    assert_eq!(post.view_sources.as_ref().map(Vec::len), Some(5));
    assert!(post.created_at.is_some());
    assert!(post.id.is_none());
}

#[tokio::test]
async fn create_post_without_caption_seeds_default_title() {
    let client = ScriptedCompletion::new(vec![Ok(bundle_json())]);
    let synth = synthesizer(client.clone());

    create_post(&synth, draft("   ")).await;

    let prompt = &client.prompts()[0];
    assert!(prompt.contains("Video Title: New Post"));
    assert!(prompt.contains("Initial Views: 0"));
}

#[tokio::test]
async fn create_post_falls_back_to_zero_metrics() {
    let client = ScriptedCompletion::new(vec![unavailable()]);
    let synth = synthesizer(client.clone());

    let post = create_post(&synth, draft("Funny cat video")).await;

    assert_eq!(post.views, Some(0));
    assert_eq!(post.likes, Some(0));
    assert_eq!(post.comments, Some(0));
    assert_eq!(post.shares, None);
    assert_eq!(post.gender_breakdown, None);
}

#[test]
fn post_serializes_kind_as_type() {
    let mut post = reel_insights::Post::from_draft(draft(""));
    post.apply_zero_metrics();
    let value = serde_json::to_value(&post).unwrap();

    assert_eq!(value["type"], json!("reel"));
    assert_eq!(value["imageUrl"], json!("https://cdn.example.com/post.jpg"));
    assert_eq!(value["views"], json!(0));
    assert!(value.get("shares").is_none());
}

#[test]
fn parse_insight_accepts_valid_json() {
    let record = parse_insight(&insight_json()).unwrap();
    assert_eq!(record.title, "Morning routine");
}

#[test]
fn parse_insight_rejects_incomplete_json() {
    let mut candidate = insight_json();
    candidate["metrics"] = json!({ "views": 10 });

    let err = parse_insight(&candidate).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
