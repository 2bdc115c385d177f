use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use specboard::config::EngineConfig;
use specboard::loader;
use specboard::models::ActivityFilter;
use specboard::render::render_tree;
use specboard::state::{select_filtered_intents, IntentFilter, StateStore, UpdateUiStateInput};

#[derive(Parser)]
#[command(name = "specboard")]
#[command(about = "Inspect the dashboard state of a memory-bank workspace")]
struct Cli {
    /// Records file written by the memory-bank scanner
    #[arg(short, long, global = true, default_value = "memory-bank.json")]
    records: PathBuf,

    /// Workspace root (defaults to the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full dashboard snapshot as JSON
    Snapshot {
        /// Activity filter applied to the snapshot (all, stages, bolts)
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
    /// Print the intent/unit/story tree
    Tree {
        /// Status filter (all, active, complete, pending)
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
    /// Print bolts waiting to start, best candidates first
    Queue {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the activity feed, newest first
    Activity {
        /// Event filter (all, stages, bolts)
        #[arg(short, long, default_value = "all")]
        filter: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Initialize tracing with output to stderr so stdout stays clean for JSON.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "specboard=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from(path),
        None => Ok(EngineConfig::load()),
    }
}

fn parse_activity_filter(raw: &str) -> Result<ActivityFilter> {
    ActivityFilter::from_str(raw)
        .ok_or_else(|| anyhow::anyhow!("Unknown activity filter '{}'", raw))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(cli.config.as_deref())?;

    let workspace = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    let records = loader::read_records(&cli.records)?;
    let model = loader::into_model(records);
    tracing::info!(
        records = %cli.records.display(),
        intents = model.intents.len(),
        bolts = model.bolts.len(),
        "loaded records"
    );

    let mut store = StateStore::from_model(
        model,
        &workspace.to_string_lossy(),
        config.to_store_options(),
    );
    store.recompute_if_dirty();

    match cli.command.unwrap_or(Commands::Snapshot {
        filter: "all".to_string(),
    }) {
        Commands::Snapshot { filter } => {
            store.set_ui_state(UpdateUiStateInput {
                activity_filter: Some(parse_activity_filter(&filter)?),
                ..Default::default()
            });
            let snapshot = store.webview_snapshot();
            let json =
                serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
            println!("{}", json);
        }
        Commands::Tree { filter } => {
            let filter = IntentFilter::from_str(&filter)
                .ok_or_else(|| anyhow::anyhow!("Unknown intent filter '{}'", filter))?;
            let intents: Vec<_> = store.state().ordered_intents().cloned().collect();
            print!("{}", render_tree(&select_filtered_intents(&intents, filter)));
        }
        Commands::Queue { limit } => {
            let limit = limit.unwrap_or(config.up_next_limit);
            for bolt in store.pending_bolts().iter().take(limit) {
                if bolt.is_blocked {
                    println!("{}  blocked by {}", bolt.id, bolt.blocked_by.join(", "));
                } else {
                    println!("{}  unblocks {}", bolt.id, bolt.unblocks_count);
                }
            }
        }
        Commands::Activity { filter, limit } => {
            let limit = limit.unwrap_or(config.activity_limit);
            let now = chrono::Utc::now();
            for event in store
                .activity_feed(parse_activity_filter(&filter)?)
                .iter()
                .take(limit)
            {
                println!(
                    "{:>12}  {}  {}",
                    specboard::engine::activity::format_relative_time(event.timestamp, now),
                    event.text,
                    event.target
                );
            }
        }
    }

    Ok(())
}
