use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    suggested_tags, ApiClient, CandidateSource, DecisionForwarder, DecisionRecorder,
    DiscoveryFeed, EventDraft, FixtureCandidateSource, LoggingRecorder, SessionContext,
    SwipeSession, SystemClock,
};
use shared::domain::{FeedMode, SubjectId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;

use config::{load_settings, normalize_api_url, Settings};
use prompt::{exhausted_message, parse_input, render_card, Input, HELP};

#[derive(Parser, Debug)]
#[command(name = "grounds", about = "Browse and post Common Grounds events from a terminal")]
struct Cli {
    /// Settings file; missing files are ignored.
    #[arg(long, default_value = "grounds.toml")]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    subject: Option<i64>,
    /// matcha (leisure) or coffee (professional)
    #[arg(long)]
    mode: Option<FeedMode>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Swipe through the discovery feed.
    Swipe {
        #[arg(long)]
        batch_limit: Option<usize>,
        /// Serve events from a JSON file instead of the backend.
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
    /// Create a new event on the backend.
    Brew {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long = "tag", required = true)]
        tags: Vec<String>,
    },
    /// List suggested tags for the selected mode.
    Tags,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(api_url) = &cli.api_url {
        settings.api_url = normalize_api_url(api_url);
    }
    if let Some(subject) = cli.subject {
        settings.subject_id = subject;
    }
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }

    match cli.command {
        Command::Swipe {
            batch_limit,
            fixture,
        } => {
            if let Some(batch_limit) = batch_limit {
                settings.batch_limit = batch_limit;
            }
            run_swipe(&settings, fixture).await
        }
        Command::Brew {
            title,
            description,
            tags,
        } => run_brew(&settings, title, description, tags).await,
        Command::Tags => {
            for tag in suggested_tags(settings.mode) {
                println!("{tag}");
            }
            Ok(())
        }
    }
}

async fn run_swipe(settings: &Settings, fixture: Option<PathBuf>) -> Result<()> {
    let source: Arc<dyn CandidateSource>;
    let recorder: Arc<dyn DecisionRecorder>;
    match fixture {
        Some(path) => {
            let fixture_source = FixtureCandidateSource::from_json_file(&path).await?;
            info!(
                path = %path.display(),
                events = fixture_source.len(),
                "swipe: using fixture feed"
            );
            source = Arc::new(fixture_source);
            recorder = Arc::new(LoggingRecorder);
        }
        None => {
            let api = Arc::new(ApiClient::new(
                &settings.api_url,
                settings.request_timeout(),
            )?);
            info!(api_url = %api.base_url(), "swipe: using backend feed");
            source = api.clone();
            recorder = api;
        }
    }

    let forwarder = DecisionForwarder::spawn(recorder);
    let session = SwipeSession::new(
        SessionContext {
            subject: SubjectId(settings.subject_id),
            mode: settings.mode,
        },
        Arc::new(SystemClock),
        forwarder.clone(),
    );
    let mut feed = DiscoveryFeed::new(session, source, settings.batch_limit);

    println!("{} feed for user {}. {HELP}", settings.mode, settings.subject_id);
    feed.replenish().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match feed.session().current() {
            Some(candidate) => println!("{}", render_card(candidate, feed.session().progress())),
            None => println!("{}", exhausted_message(feed.last_batch())),
        }

        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        match parse_input(&line) {
            Some(Input::Swipe(direction)) => {
                if let Err(err) = feed.decide(direction) {
                    println!("{err}");
                }
            }
            Some(Input::More) => {
                feed.replenish().await;
            }
            Some(Input::Quit) => break,
            Some(Input::Help) | None => println!("{HELP}"),
        }
    }

    forwarder.flush().await;
    let stats = forwarder.stats();
    println!(
        "{} swipes recorded, {} could not be delivered",
        stats.delivered, stats.failed
    );
    Ok(())
}

async fn run_brew(
    settings: &Settings,
    title: String,
    description: String,
    tags: Vec<String>,
) -> Result<()> {
    let mut draft = EventDraft::new();
    draft.set_mode(settings.mode);
    draft.advance()?;
    draft.set_title(title);
    draft.advance()?;
    draft.set_description(description);
    for tag in &tags {
        draft.toggle_tag(tag);
    }
    let request = draft.submit_request()?;

    let api = ApiClient::new(&settings.api_url, settings.request_timeout())?;
    let created = api
        .create_event(&request)
        .await
        .context("failed to create event")?;
    println!("created event {} in {} mode", created.id, settings.mode);
    Ok(())
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
