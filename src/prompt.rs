use crate::validate::FieldError;

pub fn system_prompt() -> String {
    let prompt = r#"You are a video analytics expert generating demo data for a social media dashboard.
Rules:
- Output a single JSON value matching the requested schema, no markdown or commentary.
- Counts are whole non-negative numbers; percentages are numbers between 0 and 100.
"#;
    prompt.to_string()
}

pub fn metrics_prompt(title: &str, initial_views: u64) -> String {
    format!(
        r#"Given the title of a video and its initial views, generate a complete and realistic set of demo data for a social media reel.

Video Title: {title}
Initial Views: {initial_views}

Generate values for all fields in the output schema:
- views, likes, comments, shares, saves, reposts, interactions, profileActivity, follows, accountsReached (integers)
- viewRate (percentage of viewers who watched past the first 3 seconds), skipRate (percentage who skipped)
- watchTime (total watch time as text, e.g. "2h 45m"), avgWatchTime (seconds)
- audienceBreakdown and interactionsBreakdown (followers / nonFollowers), genderBreakdown (men / women)
- ageBreakdown (range, percentage), countryBreakdown (name, percentage), viewSources (source, percentage)

Guidance:
- Base the metrics on the initial views. Likes should be around 5-8% of views, and comments around 0.2-1%. Other metrics should be proportional.
- interactions must be exactly likes + comments + shares + saves + reposts.
- The percentages in each breakdown must sum to 100.
- Provide 5 countries, 3-4 standard age ranges and 5 common view sources.
- Return the complete data as a single JSON object. Make sure all numbers are realistic for a popular reel."#,
        title = title,
        initial_views = initial_views,
    )
}

pub fn variations_prompt(original_json: &str, video_id: &str, count: usize) -> String {
    format!(
        r#"Given an original video insight, generate {count} variations of it.
The variations should have slightly altered metrics, titles and country breakdowns while remaining a realistic and coherent data set.
They are used as alternative scenarios for A/B testing and presentations.

Original Insight:
{original}

Output: a JSON object {{"variations": [...]}} containing exactly {count} insight objects with the same structure as the original.
- Rephrase or slightly alter each title.
- Scale metrics proportionally rather than randomizing them independently: higher views should come with higher likes and comments.
- Keep the overall trend of the time series, with some random fluctuation.
- Adjust country breakdowns to reflect different plausible audiences.
- Give every variation a new, unique videoId different from "{video_id}".
- Set isDemo to true."#,
        count = count,
        original = original_json,
        video_id = video_id,
    )
}

pub fn with_corrections(prompt: &str, problems: &[String]) -> String {
    let mut out = String::with_capacity(prompt.len() + 256);
    out.push_str(prompt);
    out.push_str("\n\nYour previous answer was rejected:\n");
    for problem in problems.iter().take(8) {
        out.push_str("- ");
        out.push_str(problem);
        out.push('\n');
    }
    out.push_str("Return a corrected answer that satisfies every rule.");
    out
}

pub fn field_problems(errors: &[FieldError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_prompt_embeds_inputs() {
        let prompt = metrics_prompt("Funny cat video", 50_000);
        assert!(prompt.contains("Video Title: Funny cat video"));
        assert!(prompt.contains("Initial Views: 50000"));
        assert!(prompt.contains("5-8% of views"));
    }

    #[test]
    fn variations_prompt_names_original_id() {
        let prompt = variations_prompt(r#"{"videoId":"vid-9","title":"x"}"#, "vid-9", 2);
        assert!(prompt.contains("generate 2 variations"));
        assert!(prompt.contains("different from \"vid-9\""));
    }

    #[test]
    fn corrections_list_is_capped() {
        let problems: Vec<String> = (0..20).map(|idx| format!("problem {}", idx)).collect();
        let prompt = with_corrections("base", &problems);
        assert!(prompt.starts_with("base"));
        assert!(prompt.contains("problem 7"));
        assert!(!prompt.contains("problem 8"));
    }
}
