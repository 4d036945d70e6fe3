//! CineScout interactive CLI.
//!
//! A thin, stateless front-end over the controller: each input line is
//! parsed into an intent, forwarded to the controller, and the resulting
//! snapshot is rendered. All state lives in the controller.

use anyhow::{Context, Result};
use chrono::Datelike;
use cinescout::controller::Controller;
use cinescout::state::{DetailState, Phase, Snapshot};
use clap::Parser;
use shared::models::{self, ChatRole, FilterOption, LanguageOption, SortOption, View};
use shared::{Config, PrefStore};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "AI-assisted movie and TV discovery in the terminal")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging. Console output would interleave with the
    // interactive prompt, so logs go to file only.
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "cinescout".to_string(),
        default_level: log_level,
        console: false,
        file: true,
        json_format: config.logging.json_format,
    })?;

    info!(config_file = %args.config.display(), "CineScout starting");

    // Open the preference store
    let store =
        PrefStore::open(config.store_path()).context("Failed to open preference store")?;

    // First run: pick the display language from the environment
    if !store.contains("language")? {
        let detected = detect_language(std::env::var("LANG").ok().as_deref());
        store.set("language", &detected.code)?;
        store.set("region", &detected.region)?;
        info!(language = detected.code, "Detected initial language");
    }

    // Initialize remote clients
    let catalog =
        tmdb_client::TmdbClient::from_config(&config.tmdb).context("Failed to create TMDb client")?;
    let assistant_client = assistant::AssistantClient::from_config(&config.assistant)
        .context("Failed to create assistant client")?;

    let mut controller = Controller::new(Arc::new(catalog), Arc::new(assistant_client), store);

    println!("CineScout - type 'help' for commands.");
    controller.load_trending().await;
    render_results(&controller.snapshot());

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !dispatch(&mut controller, line.trim()).await {
            break;
        }
    }

    info!("CineScout finished");
    Ok(())
}

/// Parse one input line into a controller intent. Returns false to quit.
async fn dispatch(controller: &mut Controller, line: &str) -> bool {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "quit" | "exit" => return false,
        "help" => print_help(),
        "search" => {
            controller.search(rest).await;
            render_results(&controller.snapshot());
        }
        "trending" => {
            controller.change_view(View::Trending).await;
            render_results(&controller.snapshot());
        }
        "favorites" => {
            controller.change_view(View::Favorites).await;
            render_results(&controller.snapshot());
        }
        "more" => {
            controller.load_more().await;
            render_results(&controller.snapshot());
        }
        "sort" => match rest.parse::<SortOption>() {
            Ok(sort) => {
                controller.set_sort(sort);
                render_results(&controller.snapshot());
            }
            Err(e) => println!("{} (try popularity, date, or rating)", e),
        },
        "filter" => match rest.parse::<FilterOption>() {
            Ok(filter) => {
                controller.set_filter(filter);
                render_results(&controller.snapshot());
            }
            Err(e) => println!("{} (try all, movie, or tv)", e),
        },
        "fav" => {
            if let Some((kind, id)) = indexed_key(controller, rest) {
                controller.toggle_favorite(kind, id);
                render_results(&controller.snapshot());
            }
        }
        "open" => {
            if let Some((kind, id)) = indexed_key(controller, rest) {
                controller.select(kind, id).await;
                render_detail(&controller.snapshot());
            }
        }
        "close" => controller.deselect(),
        "lang" => {
            controller.change_language(rest).await;
            render_results(&controller.snapshot());
        }
        "langs" => {
            for language in models::SUPPORTED_LANGUAGES {
                println!("  {}  {}", language.code, language.label);
            }
        }
        "chat" => {
            controller.send_chat(rest).await;
            render_chat(&controller.snapshot());
        }
        "history" => {
            let snapshot = controller.snapshot();
            if snapshot.history.is_empty() {
                println!("No recent searches.");
            }
            for query in &snapshot.history {
                println!("  {}", query);
            }
        }
        "clearhistory" => {
            controller.clear_history();
            println!("History cleared.");
        }
        _ => println!("Unknown command '{}', try 'help'.", command),
    }

    true
}

/// Resolve a 1-based displayed-result number to its key.
fn indexed_key(controller: &Controller, arg: &str) -> Option<(models::Kind, u64)> {
    let index: usize = match arg.parse() {
        Ok(n) if n >= 1 => n,
        _ => {
            println!("Expected a result number, e.g. 'open 3'.");
            return None;
        }
    };

    match controller.displayed().get(index - 1) {
        Some(display) => Some((display.item.kind, display.item.id)),
        None => {
            println!("No result #{} on screen.", index);
            None
        }
    }
}

fn render_results(snapshot: &Snapshot) {
    match &snapshot.phase {
        Phase::Error { message } => {
            println!("{}", message);
            if snapshot.results.is_empty() {
                return;
            }
        }
        Phase::Loading { message } => println!("{}", message),
        Phase::Idle => {}
    }

    if snapshot.results.is_empty() {
        match snapshot.view {
            View::Favorites => println!("You haven't added any favorites yet."),
            _ => println!("No results."),
        }
        return;
    }

    println!(
        "[{}] {} titles - lang {} - page {}",
        snapshot.view,
        snapshot.results.len(),
        snapshot.language,
        snapshot.pagination.page
    );

    for (index, display) in snapshot.results.iter().enumerate() {
        let item = &display.item;
        let marker = if display.favorited { "*" } else { " " };
        let year = item
            .release_date
            .map(|date| date.year().to_string())
            .unwrap_or_else(|| "----".to_string());
        println!(
            "{:>3}.{} [{}] {} ({})  rating {:.1}  pop {:.0}",
            index + 1,
            marker,
            item.kind,
            item.title,
            year,
            item.vote_average,
            item.popularity
        );
    }

    if snapshot.pagination.can_load_more {
        println!("(type 'more' for the next page)");
    }
}

fn render_detail(snapshot: &Snapshot) {
    match &snapshot.detail {
        DetailState::Closed => {}
        DetailState::Loading { .. } => println!("Loading details..."),
        DetailState::Error { message } => println!("{}", message),
        DetailState::Ready(record) => {
            let item = &record.item;
            let year = item
                .release_date
                .map(|date| date.year().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!("{} ({}) - rating {:.1}", item.title, year, item.vote_average);

            if !item.genres.is_empty() {
                let genres: Vec<&str> = item.genres.iter().map(|g| g.name.as_str()).collect();
                println!("Genres: {}", genres.join(", "));
            }
            if !item.overview.is_empty() {
                println!("{}", item.overview);
            }

            if let Some(providers) = &item.watch_providers {
                let names: Vec<&str> = providers
                    .flatrate
                    .iter()
                    .chain(&providers.rent)
                    .chain(&providers.buy)
                    .map(|p| p.provider_name.as_str())
                    .collect();
                if !names.is_empty() {
                    println!("Watch on: {}", names.join(", "));
                }
            }

            if !record.related.is_empty() {
                println!("Related:");
                for related in record.related.iter().take(10) {
                    println!("  - [{}] {}", related.kind, related.title);
                }
            }
        }
    }
}

fn render_chat(snapshot: &Snapshot) {
    for message in &snapshot.chat {
        match message.role {
            ChatRole::User => println!("You: {}", message.content),
            ChatRole::Assistant => println!("CineScout: {}", message.content),
            ChatRole::Error => println!("(error) {}", message.content),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  search <text>     search by free text (AI-assisted)");
    println!("  trending          show this week's trending titles");
    println!("  favorites         show your favorites");
    println!("  more              load the next page");
    println!("  sort <option>     popularity | date | rating");
    println!("  filter <option>   all | movie | tv");
    println!("  open <n>          show details for result n");
    println!("  close             close the detail view");
    println!("  fav <n>           toggle favorite for result n");
    println!("  lang <code>       switch language (see 'langs')");
    println!("  chat <text>       talk to the assistant");
    println!("  history           show recent searches");
    println!("  clearhistory      clear recent searches");
    println!("  quit              exit");
}

/// Match a POSIX locale string (e.g. `en_US.UTF-8`) against the supported
/// language table: exact code first, then primary subtag, else the default.
fn detect_language(locale: Option<&str>) -> &'static LanguageOption {
    let Some(locale) = locale else {
        return &models::SUPPORTED_LANGUAGES[0];
    };

    let code = locale.split('.').next().unwrap_or("").replace('_', "-");
    if let Some(language) = models::language_option(&code) {
        return language;
    }

    let primary = code.split('-').next().unwrap_or("");
    if !primary.is_empty() {
        if let Some(language) = models::SUPPORTED_LANGUAGES
            .iter()
            .find(|l| l.code.starts_with(primary))
        {
            return language;
        }
    }

    &models::SUPPORTED_LANGUAGES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language_exact_match() {
        assert_eq!(detect_language(Some("fr_FR.UTF-8")).code, "fr-FR");
        assert_eq!(detect_language(Some("en_US")).code, "en-US");
    }

    #[test]
    fn test_detect_language_primary_subtag_fallback() {
        // es_AR is unsupported; the first Spanish entry wins.
        assert_eq!(detect_language(Some("es_AR.UTF-8")).code, "es-ES");
    }

    #[test]
    fn test_detect_language_defaults_to_english() {
        assert_eq!(detect_language(Some("ja_JP.UTF-8")).code, "en-US");
        assert_eq!(detect_language(None).code, "en-US");
        assert_eq!(detect_language(Some("C")).code, "en-US");
    }
}
