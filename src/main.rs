use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use devfeed::api::ForemClient;
use devfeed::app::{App, AppEvent};
use devfeed::config::Config;
use devfeed::feed::{FilterContext, ViewMode};
use devfeed::keybindings::KeybindingRegistry;
use devfeed::nav::{Location, Route};
use devfeed::preferences::PreferenceManager;
use devfeed::storage::{Database, DatabaseError};
use devfeed::theme::ThemeVariant;
use devfeed::ui::{self, Services};

/// Get the config directory path (~/.config/devfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("devfeed"))
}

#[derive(Parser, Debug)]
#[command(
    name = "devfeed",
    about = "Terminal client for the dev.to article feed"
)]
struct Args {
    /// Start on the feed filtered by this tag
    #[arg(long, conflicts_with = "query")]
    tag: Option<String>,

    /// Start on a title search
    #[arg(long)]
    query: Option<String>,

    /// Use the list layout instead of the card grid
    #[arg(long)]
    list: bool,

    /// Open a single article by id
    #[arg(long, value_name = "ID", conflicts_with = "author")]
    article: Option<u64>,

    /// Open an author's articles
    #[arg(long, value_name = "HANDLE")]
    author: Option<String>,

    /// Open a location such as `/?tag=rust` or `https://dev.to/blog/42`
    #[arg(long, value_name = "URL")]
    location: Option<String>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,
}

impl Args {
    /// Location requested on the command line, if any. `--location` is the
    /// base; the other flags adjust its route, filter and layout.
    fn location(&self) -> Result<Option<Location>> {
        let requested = self.location.is_some()
            || self.article.is_some()
            || self.author.is_some()
            || self.tag.is_some()
            || self.query.is_some()
            || self.list;
        if !requested {
            return Ok(None);
        }

        let mut location = match &self.location {
            Some(raw) => {
                Location::parse(raw).with_context(|| format!("Invalid --location '{raw}'"))?
            }
            None => Location::feed(),
        };

        if let Some(id) = self.article {
            location = location.carry_to(Route::Article(id));
        } else if let Some(handle) = &self.author {
            let parsed = Location::parse(&format!("/author/{handle}"))
                .with_context(|| format!("Invalid --author '{handle}'"))?;
            location = location.carry_to(parsed.route().clone());
        }

        if self.tag.is_some() || self.query.is_some() {
            location = location.with_filter(FilterContext::from_parts(
                self.tag.as_deref(),
                self.query.as_deref(),
            ));
        }
        if self.list {
            location = location.with_view(ViewMode::List);
        }
        Ok(Some(location))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; the TUI owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cli_location = args.location()?;

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // Config and database are user-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config_path = config_dir.join("config.toml");
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    tracing::info!(
        path = %config_path.display(),
        api = %config.api_base_url,
        per_page = config.per_page,
        "Configuration loaded"
    );

    let db_path = config_dir.join("devfeed.db");
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => Some(db),
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of devfeed appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open database, preferences will not be saved");
            None
        }
    };

    let prefs = match &db {
        Some(db) => match PreferenceManager::load(&config, db).await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored preferences");
                PreferenceManager::from_config(&config)
            }
        },
        None => PreferenceManager::from_config(&config),
    };

    let theme = ThemeVariant::from_str_name(prefs.theme_variant()).unwrap_or_else(|| {
        tracing::warn!(theme = prefs.theme_variant(), "Unknown theme, using dark");
        ThemeVariant::Dark
    });

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{warning}");
    }

    let client = ForemClient::new(&config.api_base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;

    let initial = cli_location
        .or_else(|| prefs.session_location())
        .unwrap_or_default();
    tracing::info!(location = %initial, "Starting");

    let mut app = App::new(&config, keybindings, theme, initial);
    let mut services = Services {
        source: Arc::new(client),
        db,
        prefs,
    };

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let result = ui::run(&mut app, &mut services, event_tx, event_rx).await;

    // Save even when the loop failed; the last location is still useful.
    if let Some(db) = &services.db {
        if let Err(e) = services.prefs.save_session(db, app.location()).await {
            tracing::warn!(error = %e, "Failed to save session location");
        }
    }

    result
}
