use anyhow::{Context, Result};
use clap::Parser;
use marquee::app::App;
use marquee::catalog::CatalogSnapshot;
use marquee::config::{Config, TOKEN_ENV_VAR};
use marquee::controller::{CatalogController, CatalogEvent};
use marquee::keybindings::KeybindingRegistry;
use marquee::source::TmdbSource;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Capacity of the fetch-result channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Get the config directory path (~/.config/marquee/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("marquee"))
}

#[derive(Parser, Debug)]
#[command(name = "marquee", about = "Browse top-rated movies in the terminal")]
struct Args {
    /// Config file (default: ~/.config/marquee/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the catalog API base URL
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Override the minimum rating a movie needs to be listed
    #[arg(long, value_name = "RATING")]
    min_rating: Option<f64>,

    /// Print the catalog to stdout instead of starting the TUI
    #[arg(long)]
    list: bool,

    /// Page limit for --list
    #[arg(long, value_name = "N", default_value_t = 5)]
    max_pages: u32,

    /// Log file for the TUI (default: ~/.config/marquee/marquee.log)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Route logs to stderr in list mode, and to a file otherwise since the TUI
/// owns the terminal.
fn init_tracing(args: &Args, config_dir: &std::path::Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info"));

    if args.list {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let log_path = match &args.log_file {
        Some(path) => path.clone(),
        None => {
            std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
            config_dir.join("marquee.log")
        }
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_dir = get_config_dir()?;
    init_tracing(&args, &config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    if let Some(base) = &args.api_base {
        config.api_base_url = base.clone();
    }
    if let Some(rating) = args.min_rating {
        config.min_vote_average = rating;
    }
    config.validate().context("Invalid command line override")?;
    tracing::debug!(?config, "Effective configuration");

    let settings = config.tmdb_settings(std::env::var(TOKEN_ENV_VAR).ok());
    if settings.api_token.is_none() {
        tracing::warn!("No API token configured; requests may be rejected");
    }
    let source = TmdbSource::new(settings).context("Failed to set up catalog source")?;

    let (event_tx, event_rx) = mpsc::channel::<CatalogEvent>(EVENT_CHANNEL_CAPACITY);
    let controller =
        CatalogController::new(Arc::new(source), event_tx, config.controller_settings());

    if args.list {
        return print_listing(controller, event_rx, args.max_pages).await;
    }

    let mut keybindings = KeybindingRegistry::new();
    let warnings = keybindings.apply_overrides(&config.keybindings);
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Keybinding override ignored");
    }

    let mut app = App::new(controller, keybindings);
    if let Some(first) = warnings.into_iter().next() {
        app.set_status(first);
    }

    marquee::ui::run(&mut app, event_rx).await?;
    Ok(())
}

/// Load genres and up to `max_pages` pages, then print the movies and the
/// genre histogram.
async fn print_listing(
    mut controller: CatalogController,
    mut event_rx: mpsc::Receiver<CatalogEvent>,
    max_pages: u32,
) -> Result<()> {
    controller.start();
    let mut pages_requested = 1;
    let mut page_failed = false;

    while controller.pending_tasks() > 0 {
        let Some(event) = event_rx.recv().await else {
            break;
        };
        if matches!(event, CatalogEvent::PageLoaded { result: Err(_), .. }) {
            page_failed = true;
        }
        if let Some(message) = controller.handle_event(event) {
            eprintln!("Warning: {}", message);
        }
        if !page_failed && pages_requested < max_pages && controller.request_next_page() {
            pages_requested += 1;
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_listing(&mut out, &controller.snapshot())?;
    Ok(())
}

fn write_listing(out: &mut impl Write, snapshot: &CatalogSnapshot<'_>) -> Result<()> {
    for visible in &snapshot.visible {
        let movie = &visible.entry.movie;
        writeln!(out, "{:>4.1}  {}", movie.vote_average, movie.title)?;
    }

    if snapshot.has_more {
        writeln!(out, "... more available")?;
    } else {
        writeln!(out, "End of list")?;
    }

    if !snapshot.genre_counts.is_empty() {
        writeln!(out)?;
        writeln!(out, "Genres:")?;
        for count in snapshot.genre_counts {
            writeln!(out, "  {:<20} {}", count.genre.name, count.count)?;
        }
    }
    Ok(())
}
