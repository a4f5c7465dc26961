mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use reel_insights::config::InsightsConfig;
use reel_insights::store::LibraryStore;
use reel_insights::{
    apply_demo_data, completion_from_env, create_post, duplicate_insight, format_count,
    format_float, format_percent, parse_insight, Completion, MetricsBundle, PostDraft, PostType,
    SynthOptions, Synthesizer,
};

#[derive(Parser)]
#[command(name = "reel-insights", about = "Synthetic reel engagement metrics")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a demo metrics bundle for a title.
    DemoData(DemoDataArgs),
    /// Generate variations of an insight stored as JSON.
    Duplicate(DuplicateArgs),
    /// Create a post seeded with demo metrics and save it.
    CreatePost(CreatePostArgs),
    Serve(ServeArgs),
    /// Write the effective configuration to a TOML file.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct DemoDataArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value_t = 0)]
    views: u64,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct DuplicateArgs {
    /// Path to the insight JSON, or "-" for stdin.
    #[arg(long)]
    insight: String,
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long, requires = "user")]
    save: bool,
}

#[derive(Args, Debug, Clone)]
struct CreatePostArgs {
    #[arg(long)]
    user: String,
    #[arg(long, default_value = "")]
    caption: String,
    #[arg(long)]
    image_url: String,
    #[arg(long, default_value = "")]
    image_hint: String,
    #[arg(long, default_value = "reel")]
    kind: String,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long)]
    path: Option<PathBuf>,
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, config_path) = InsightsConfig::load(cli.config)?;
    if let Command::InitConfig(args) = &cli.command {
        return run_init_config(args, &config, config_path);
    }
    let completion = completion_from_env(&config.llm)?;
    let synth = Synthesizer::new(completion, SynthOptions::from_config(&config));

    match cli.command {
        Command::DemoData(args) => run_demo_data(args, &synth).await,
        Command::Duplicate(args) => run_duplicate(args, &config, &synth).await,
        Command::CreatePost(args) => run_create_post(args, &config, &synth).await,
        Command::Serve(args) => server::serve(args, &config, synth).await,
        Command::InitConfig(_) => Ok(()),
    }
}

fn run_init_config(
    args: &InitConfigArgs,
    config: &InsightsConfig,
    config_path: Option<PathBuf>,
) -> Result<(), String> {
    let path = args
        .path
        .clone()
        .or(config_path)
        .ok_or_else(|| "missing config path: pass --path".to_string())?;
    if path.exists() && !args.force {
        return Err(format!(
            "{} already exists: pass --force to overwrite",
            path.display()
        ));
    }
    config.write(&path)?;
    eprintln!("Wrote config to {}", path.display());
    Ok(())
}

async fn run_demo_data(
    args: DemoDataArgs,
    synth: &Synthesizer<Arc<dyn Completion>>,
) -> Result<(), String> {
    let bundle = apply_demo_data(synth, &args.title, args.views)
        .await
        .map_err(|err| format!("{} ({})", err, err.cause()))?;

    if args.json {
        let payload = serde_json::to_string_pretty(&bundle)
            .map_err(|err| format!("failed to serialize metrics: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    print_bundle(&bundle);
    Ok(())
}

async fn run_duplicate(
    args: DuplicateArgs,
    config: &InsightsConfig,
    synth: &Synthesizer<Arc<dyn Completion>>,
) -> Result<(), String> {
    let raw = read_input(&args.insight)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|err| format!("failed to parse insight: {}", err))?;
    let original = parse_insight(&value).map_err(|err| err.to_string())?;
    let count = args.count.unwrap_or(config.generation.default_variations);

    let variations = duplicate_insight(synth, &original, count)
        .await
        .map_err(|err| format!("{} ({})", err, err.cause()))?;

    if args.save {
        if let Some(user) = args.user.as_deref() {
            let store = LibraryStore::load(config.store.path.clone()).await?;
            let saved = store.add_insights(user, variations.clone()).await?;
            eprintln!("Saved {} variations for {}", saved, user);
        }
    }

    let payload = serde_json::to_string_pretty(&variations)
        .map_err(|err| format!("failed to serialize variations: {}", err))?;
    println!("{}", payload);
    Ok(())
}

async fn run_create_post(
    args: CreatePostArgs,
    config: &InsightsConfig,
    synth: &Synthesizer<Arc<dyn Completion>>,
) -> Result<(), String> {
    let kind = PostType::from_str(&args.kind)
        .ok_or_else(|| format!("invalid post type: {}", args.kind))?;
    if args.image_url.trim().is_empty() {
        return Err("missing image url: pass --image-url".to_string());
    }

    let draft = PostDraft {
        image_url: args.image_url,
        image_hint: args.image_hint,
        caption: args.caption,
        kind,
    };
    let post = create_post(synth, draft).await;

    let store = LibraryStore::load(config.store.path.clone()).await?;
    let post = store.add_post(&args.user, post).await?;

    println!(
        "Created post {} for {}: views {} | likes {} | comments {}",
        post.id.as_deref().unwrap_or("-"),
        args.user,
        format_count(post.views.unwrap_or(0)),
        format_count(post.likes.unwrap_or(0)),
        format_count(post.comments.unwrap_or(0))
    );
    Ok(())
}

fn print_bundle(bundle: &MetricsBundle) {
    println!(
        "Views: {} | accounts reached {}",
        format_count(bundle.views),
        format_count(bundle.accounts_reached)
    );
    println!(
        "Interactions: {} (likes {} | comments {} | shares {} | saves {} | reposts {})",
        format_count(bundle.interactions),
        format_count(bundle.likes),
        format_count(bundle.comments),
        format_count(bundle.shares),
        format_count(bundle.saves),
        format_count(bundle.reposts)
    );
    println!(
        "Profile activity: {} | follows {}",
        format_count(bundle.profile_activity),
        format_count(bundle.follows)
    );
    println!(
        "Watch time: {} (avg {}s) | view rate {} | skip rate {}",
        bundle.watch_time,
        format_float(bundle.avg_watch_time, 1),
        format_percent(bundle.view_rate),
        format_percent(bundle.skip_rate)
    );
    println!(
        "Audience: followers {} | non-followers {}",
        format_percent(bundle.audience_breakdown.followers),
        format_percent(bundle.audience_breakdown.non_followers)
    );
    println!(
        "Gender: men {} | women {}",
        format_percent(bundle.gender_breakdown.men),
        format_percent(bundle.gender_breakdown.women)
    );

    println!("\nAge:");
    for bucket in &bundle.age_breakdown {
        println!("  {}: {}", bucket.range, format_percent(bucket.percentage));
    }
    println!("\nCountries:");
    for country in &bundle.country_breakdown {
        println!("  {}: {}", country.name, format_percent(country.percentage));
    }
    println!("\nView sources:");
    for source in &bundle.view_sources {
        println!("  {}: {}", source.source, format_percent(source.percentage));
    }
}

fn read_input(arg: &str) -> Result<String, String> {
    if arg != "-" {
        return std::fs::read_to_string(arg)
            .map_err(|err| format!("failed to read {}: {}", arg, err));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    if buffer.trim().is_empty() {
        return Err("missing insight JSON: pass --insight <file> or pipe stdin".to_string());
    }
    Ok(buffer)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reel_insights=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
