//! Terminal front end for a running gateway: loads the home rows, optionally searches
//! and opens a movie, then prints the screen.
//! Usage:
//!   cargo run --bin marquee_browse
//!   cargo run --bin marquee_browse -- --search "alien" --open 1
//! Reads MARQUEE_API_BASE (default http://localhost:5000; .env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use marquee::gateway::GatewayClient;
use marquee::models::Movie;
use marquee::session::{Session, SessionState, SEARCH_DEBOUNCE};
use marquee::view::{self, HeroSlot};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[derive(Debug, Default)]
struct Args {
    search: Option<String>,
    open: Option<usize>,
}

fn parse_args() -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--search" => parsed.search = args.next(),
            "--open" => {
                let raw = args.next().context("--open needs a card number")?;
                let index = raw
                    .parse::<usize>()
                    .with_context(|| format!("--open expects a number, got '{}'", raw))?;
                parsed.open = Some(index.max(1));
            }
            other => anyhow::bail!("unknown argument '{}'", other),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();
    let args = parse_args()?;

    let session = Session::new(Arc::new(GatewayClient::from_env()?));
    let mut hero = HeroSlot::default();
    let mut rng = rand::thread_rng();

    session.load_home().await.context("home load task panicked")?;

    if let Some(query) = args.search.as_deref() {
        info!("Searching for '{}'", query);
        session.set_query(query);
        tokio::time::sleep(SEARCH_DEBOUNCE).await;
        while session.snapshot().searching {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    if let Some(position) = args.open {
        let state = session.snapshot();
        let picked = view::rows(&state)
            .first()
            .and_then(|row| row.cards.get(position - 1))
            .map(|card| card.id)
            .and_then(|id| find_movie(&state, id));
        match picked {
            Some(movie) => {
                if let Some(task) = session.select(Some(movie)) {
                    task.await.context("trailer task panicked")?;
                }
            }
            None => println!("No card #{} in the first row", position),
        }
    }

    let state = session.snapshot();
    let hero = hero.current(&state, &mut rng).cloned();
    print!("{}", view::screen(&state, hero.as_ref()));
    session.teardown();
    Ok(())
}

/// The first row is either the search results or trending.
fn find_movie(state: &SessionState, id: i64) -> Option<Movie> {
    let home = state.home.as_ref();
    state
        .search
        .iter()
        .flatten()
        .chain(home.into_iter().flat_map(|h| h.trending.iter()))
        .find(|m| m.id == id)
        .cloned()
}
