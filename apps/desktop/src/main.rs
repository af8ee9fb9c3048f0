use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::config::load_settings;
use client_core::provider::HttpCatalogProvider;
use client_core::sort::{sort_cards, sort_sets, SortDirection, SortKey, SortSpec};
use client_core::state::{ViewMode, ViewerState};
use client_core::{ViewerClient, ViewerEvent, ViewerHandle};
use shared::domain::CardId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Terminal viewer for a trading-card catalog")]
struct Args {
    /// Catalog API base URL; overrides viewer.toml and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// API key sent with every catalog request.
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.api_base_url = server_url;
    }
    if let Some(api_key) = args.api_key {
        settings.api_key = Some(api_key);
    }
    info!(
        base_url = %settings.api_base_url,
        has_api_key = settings.api_key.is_some(),
        "starting card viewer"
    );

    let provider = HttpCatalogProvider::new(&settings)?;
    let client = ViewerClient::with_provider(Arc::new(provider));

    spawn_event_printer(&client);

    client.load_sets().await;

    println!("card viewer - type 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !handle_command(&client, line.trim()).await {
            break;
        }
    }

    Ok(())
}

fn spawn_event_printer(client: &Arc<ViewerClient>) {
    let mut events = client.subscribe_events();
    let client = Arc::clone(client);
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match &event {
                ViewerEvent::SetsLoaded { count } => println!("loaded {count} sets"),
                ViewerEvent::SetsLoadFailed { message } => {
                    println!("sets unavailable: {message}");
                }
                ViewerEvent::CardsLoaded { count, page } => match page {
                    Some(page) => println!("loaded {count} cards (page {page})"),
                    None => println!("loaded {count} cards"),
                },
                ViewerEvent::SearchCompleted { term, count } => {
                    println!("search '{term}' returned {count} cards");
                }
                ViewerEvent::RequestFailed { message } => println!("request failed: {message}"),
                ViewerEvent::ViewReset => println!("back to the set catalog"),
            }
            render(&client.snapshot().await);
        }
    });
}

async fn handle_command(client: &Arc<ViewerClient>, line: &str) -> bool {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "help" => print_help(),
        "quit" | "exit" => return false,
        "show" => render(&client.snapshot().await),
        "home" => client.go_home().await,
        "back" => client.back_to_sets().await,
        "open" => open_set_command(client, rest).await,
        "type" => client.set_search_term(rest).await,
        "search" => {
            if !rest.is_empty() {
                client.set_search_term(rest).await;
            }
            if !client.search().await {
                println!("search needs at least 3 characters");
            }
        }
        "next" => {
            if !client.next_page().await {
                println!("already on the last page");
            }
        }
        "prev" => {
            if !client.previous_page().await {
                println!("already on the first page");
            }
        }
        "fav" => toggle_favorite_command(client, rest).await,
        "sort" => sort_command(client, rest).await,
        other => println!("unknown command '{other}'; type 'help'"),
    }
    true
}

async fn open_set_command(client: &Arc<ViewerClient>, rest: &str) {
    let state = client.snapshot().await;
    let ordered = sort_sets(&state.sets, state.sort);
    let target = resolve_index(rest)
        .and_then(|position| ordered.get(position - 1).cloned())
        .or_else(|| {
            ordered
                .iter()
                .find(|set| set.id.as_str() == rest)
                .cloned()
        });
    match target {
        Some(set) => client.open_set(set).await,
        None => println!("no such set '{rest}'"),
    }
}

async fn toggle_favorite_command(client: &Arc<ViewerClient>, rest: &str) {
    if rest.is_empty() {
        println!("usage: fav <n|card-id>");
        return;
    }
    let state = client.snapshot().await;
    let ordered = sort_cards(state.cards.items(), state.sort);
    let card_id = resolve_index(rest)
        .and_then(|position| ordered.get(position - 1).map(|card| card.id.clone()))
        .unwrap_or_else(|| CardId::new(rest));

    client.toggle_favorite(card_id.clone()).await;
    if client.snapshot().await.is_favorite(&card_id) {
        println!("favorited {card_id}");
    } else {
        println!("unfavorited {card_id}");
    }
}

async fn sort_command(client: &Arc<ViewerClient>, rest: &str) {
    let state = client.snapshot().await;
    let mut parts = rest.split_whitespace();

    let Some(key_raw) = parts.next() else {
        let options: Vec<&str> = SortKey::options_for(&state.mode)
            .iter()
            .map(|key| key.label())
            .collect();
        println!("sort keys here: {}", options.join(", "));
        return;
    };
    let key = match key_raw.parse::<SortKey>() {
        Ok(key) => key,
        Err(err) => {
            println!("{err}");
            return;
        }
    };
    let direction = match parts.next() {
        None => SortDirection::Ascending,
        Some(raw) => match raw.parse::<SortDirection>() {
            Ok(direction) => direction,
            Err(err) => {
                println!("{err}");
                return;
            }
        },
    };
    if !SortKey::options_for(&state.mode).contains(&key) {
        println!("'{}' does not apply to this view", key.label());
        return;
    }

    client.set_sort(SortSpec { key, direction }).await;
    render(&client.snapshot().await);
}

fn resolve_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|position| *position >= 1)
}

fn render(state: &ViewerState) {
    match &state.mode {
        ViewMode::Home => render_sets(state),
        ViewMode::SetBrowse {
            set,
            page,
            total_pages,
        } => {
            println!("== {} - page {page} of {total_pages} ==", set.name);
            render_cards(state);
            let previous = if state.can_go_previous() {
                "prev"
            } else {
                "prev (disabled)"
            };
            let next = if state.can_go_next() {
                "next"
            } else {
                "next (disabled)"
            };
            println!("[{previous} | {next}]");
        }
        ViewMode::SearchResults { term } => {
            println!("== results for '{term}' ==");
            render_cards(state);
        }
    }
}

fn render_sets(state: &ViewerState) {
    if state.sets_loading {
        println!("loading sets...");
        return;
    }
    if state.sets.is_empty() {
        println!("no sets available");
        return;
    }
    for (position, set) in sort_sets(&state.sets, state.sort).iter().enumerate() {
        println!(
            "{:>3}. {} ({}) released {}",
            position + 1,
            set.name,
            set.id,
            set.release_date
        );
    }
}

fn render_cards(state: &ViewerState) {
    if state.loading {
        println!("searching...");
        return;
    }
    if let Some(message) = state.cards.error() {
        println!("! {message}");
        return;
    }
    if state.shows_empty_search_notice() {
        println!("no cards found");
        return;
    }
    for (position, card) in sort_cards(state.cards.items(), state.sort).iter().enumerate() {
        let favorite = if state.is_favorite(&card.id) { "*" } else { " " };
        let set_name = card
            .set
            .as_ref()
            .map(|set| set.name.as_str())
            .unwrap_or("-");
        let types = card
            .types
            .as_deref()
            .map(|types| types.join("/"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}.{favorite}{} [{}] {types} ({set_name})",
            position + 1,
            card.name,
            card.id
        );
    }
}

fn print_help() {
    println!("commands:");
    println!("  show                   render the current view");
    println!("  open <n|set-id>        browse a set's cards");
    println!("  type <text>            edit the search box");
    println!("  search [term]          search cards by name (min 3 chars)");
    println!("  next / prev            page through the open set");
    println!("  back                   leave the open set");
    println!("  home                   reset to the set catalog");
    println!("  fav <n|card-id>        toggle a favorite");
    println!("  sort <key> [asc|desc]  reorder the current view");
    println!("  quit");
}
