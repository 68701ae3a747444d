use anyhow::Context;
use clap::Parser;
use gathersync::{invoke, sync, SyncConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gathersync")]
#[command(about = "Mirror Gather survey submissions into an Elasticsearch index", long_about = None)]
#[command(version)]
struct Args {
    /// Configuration file (JSON with `gather` and `elasticsearch` sections)
    #[arg(short, long, env = "GATHERSYNC_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Gather API base URL
    #[arg(long, env = "GATHER_URL")]
    gather_url: Option<String>,

    /// Gather API token
    #[arg(long, env = "GATHER_TOKEN", hide_env_values = true)]
    gather_token: Option<String>,

    /// Elasticsearch base URL
    #[arg(long, env = "ES_URL")]
    es_url: Option<String>,

    /// Elasticsearch index
    #[arg(long, env = "ES_INDEX")]
    es_index: Option<String>,

    /// Elasticsearch username
    #[arg(long, env = "ES_USERNAME")]
    es_username: Option<String>,

    /// Elasticsearch password
    #[arg(long, env = "ES_PASSWORD", hide_env_values = true)]
    es_password: Option<String>,

    /// Elasticsearch ingest pipeline applied to every document
    #[arg(long, env = "ES_PIPELINE")]
    es_pipeline: Option<String>,

    /// Submissions per source page
    #[arg(long)]
    page_size: Option<u64>,

    /// Page to start from instead of estimating it from the index
    #[arg(long)]
    start_page: Option<u64>,

    /// Per-request timeout (e.g. "30s", "2m")
    #[arg(long, value_parser = humantime::parse_duration)]
    request_timeout: Option<Duration>,

    /// Run as a triggered invocation with this JSON event and print the response
    #[arg(long)]
    event: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<SyncConfig> {
        let mut config = SyncConfig::from_file(&self.config)
            .with_context(|| format!("Failed to load configuration from {:?}", self.config))?;

        override_with(&mut config.gather.url, &self.gather_url);
        override_with(&mut config.gather.token, &self.gather_token);
        override_with(&mut config.elasticsearch.url, &self.es_url);
        override_with(&mut config.elasticsearch.index, &self.es_index);
        override_with(&mut config.elasticsearch.username, &self.es_username);
        override_with(&mut config.elasticsearch.password, &self.es_password);
        if self.es_pipeline.is_some() {
            config.elasticsearch.pipeline = self.es_pipeline.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if self.request_timeout.is_some() {
            config.request_timeout = self.request_timeout;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn override_with(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

fn progress_bar() -> ProgressBar {
    if !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {pos} submissions {msg} | {elapsed_precise} elapsed")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("gathersync={}", log_level))
        .init();

    info!("🚀 GatherSync - Gather to Elasticsearch mirror");

    let config = args.load_config()?;
    info!("Source: {}", config.gather.url);
    info!(
        "Destination: {} (index {})",
        config.elasticsearch.url, config.elasticsearch.index
    );

    if let Some(raw) = &args.event {
        let event: serde_json::Value =
            serde_json::from_str(raw).context("--event is not valid JSON")?;
        let response = invoke(event, &config).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let started = Instant::now();
    let pb = progress_bar();

    match sync(&config, args.start_page, &pb).await {
        Ok(report) => {
            pb.finish_and_clear();
            info!(
                "✅ Synced {} pages from page {}: {} documents indexed, {} failed, in {}",
                report.pages,
                report.start_page,
                report.upserted,
                report.failed,
                humantime::format_duration(Duration::from_secs(started.elapsed().as_secs()))
            );
            Ok(())
        }
        Err(e) => {
            pb.finish_and_clear();
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
