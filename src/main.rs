use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use byline::api::{ApiClient, NewsQuery, SessionEvent};
use byline::config::Config;
use byline::storage::{FileStore, KeyValueStore};
use byline::store::{NewsStore, SessionStore, Theme, ThemeSink, ThemeStore};
use byline::util::deduplicate;

/// Get the config directory path (~/.config/byline/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("byline"))
}

/// Presentation sink for the terminal host. There is no document root to
/// toggle a class on, so applying a theme is a log line here.
struct TerminalSink;

impl ThemeSink for TerminalSink {
    fn apply(&self, theme: Theme) {
        tracing::info!(theme = theme.as_str(), "Theme applied");
    }
}

#[derive(Parser, Debug)]
#[command(name = "byline", about = "News reader client: headlines, favorites, session")]
struct Args {
    /// Path to config.toml (defaults to ~/.config/byline/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log in with this email before fetching (password read from
    /// BYLINE_PASSWORD)
    #[arg(long, value_name = "EMAIL")]
    login: Option<String>,

    /// Clear the stored session and exit
    #[arg(long)]
    logout: bool,

    /// Flip the persisted light/dark preference and exit
    #[arg(long)]
    toggle_theme: bool,

    /// Category to browse (overrides the configured default)
    #[arg(long, value_name = "CATEGORY")]
    category: Option<String>,

    /// Search instead of listing headlines
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let config_path = args
        .config
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path).context("Failed to load configuration")?;

    let storage: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::open(config_dir.join("storage.json")));

    // Theme first: the sink must be reconciled before anything paints
    let mut theme = ThemeStore::new(
        Arc::clone(&storage),
        Box::new(TerminalSink),
        Theme::parse_or_default(&config.default_theme),
    );
    theme.rehydrate();

    if args.toggle_theme {
        let new_theme = theme.toggle();
        println!("Theme is now {}", new_theme.as_str());
        return Ok(());
    }

    let (api, mut session_events) = ApiClient::new(&config, Arc::clone(&storage));
    let mut session = SessionStore::new(Arc::clone(&storage));
    let mut news = NewsStore::new(&config.default_category);

    session.restore();

    if args.logout {
        session.logout(&mut news);
        println!("Logged out.");
        return Ok(());
    }

    if let Some(email) = &args.login {
        let password =
            std::env::var("BYLINE_PASSWORD").context("BYLINE_PASSWORD not set for --login")?;
        let payload = api
            .login(email, &password)
            .await
            .context("Login request failed")?;
        session
            .login(payload.user, payload.token, &api, &mut news)
            .await;
        println!(
            "Logged in as {} ({} saved articles)",
            session
                .user()
                .and_then(|u| u.get_str("name").map(str::to_string))
                .unwrap_or_else(|| email.clone()),
            news.favorites().len()
        );
    } else if session.is_authenticated() {
        // Refresh the saved-article collection for a restored session
        session.hydrate_favorites(&api, &mut news).await;
    }

    if let Some(category) = args.category {
        news.set_category(category);
    }

    let fetched = if let Some(query_text) = args.search {
        news.set_search_query(query_text);
        api.search_news(news.search_query(), &NewsQuery::default())
            .await
    } else {
        let query = NewsQuery {
            category: Some(news.selected_category().to_string()),
            ..NewsQuery::default()
        };
        api.get_news(&query).await
    };

    // The client may have invalidated the session behind our back (401)
    while let Ok(event) = session_events.try_recv() {
        match event {
            SessionEvent::Invalidated => {
                tracing::warn!("Session invalidated by backend, clearing local state");
                session.logout(&mut news);
            }
        }
    }

    let articles = fetched.context("Failed to fetch headlines")?;
    let articles = deduplicate(&articles);

    if articles.is_empty() {
        println!("No articles.");
        return Ok(());
    }

    for article in &articles {
        let title = article.title.as_deref().unwrap_or("(untitled)");
        match &article.source {
            Some(source) => println!("{:24} {}", source, title),
            None => println!("{:24} {}", "-", title),
        }
    }

    Ok(())
}
