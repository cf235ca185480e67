//! Presentation layer: turns a [`SessionState`] into the screen the user sees.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Movie;
use crate::session::{LoadStatus, SessionState, TrailerState};

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const DEFAULT_IMAGE_SIZE: &str = "w500";
pub const POSTER_SIZE: &str = "w342";
pub const BACKDROP_SIZE: &str = "w1280";
pub const FALLBACK_TITLE: &str = "Marquee";

pub fn image_url(path: &str, size: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    format!("{IMAGE_BASE}/{size}{path}")
}

pub fn trailer_embed_url(key: &str) -> String {
    format!("https://www.youtube.com/embed/{key}?autoplay=1&mute=1&controls=1&rel=0")
}

pub fn pick_hero<'a, R: Rng + ?Sized>(trending: &'a [Movie], rng: &mut R) -> Option<&'a Movie> {
    trending.choose(rng)
}

/// Holds the hero for the current home bundle and re-rolls it when the bundle changes.
#[derive(Debug, Default)]
pub struct HeroSlot {
    generation: Option<u64>,
    hero: Option<Movie>,
}

impl HeroSlot {
    pub fn current<R: Rng + ?Sized>(
        &mut self,
        state: &SessionState,
        rng: &mut R,
    ) -> Option<&Movie> {
        if self.generation != Some(state.home_generation) {
            let trending = state
                .home
                .as_ref()
                .map(|h| h.trending.as_slice())
                .unwrap_or_default();
            self.hero = pick_hero(trending, rng).cloned();
            self.generation = Some(state.home_generation);
        }
        self.hero.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeroBanner {
    pub title: String,
    pub overview: String,
    pub backdrop: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub poster: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub title: String,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalMedia {
    Loading,
    Trailer(String),
    Fallback { backdrop: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    pub title: String,
    pub meta: String,
    pub overview: String,
    pub media: ModalMedia,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub hero: HeroBanner,
    pub status: Vec<String>,
    pub rows: Vec<Row>,
    pub modal: Option<ModalView>,
}

pub fn hero_banner(hero: Option<&Movie>) -> HeroBanner {
    match hero {
        Some(movie) => HeroBanner {
            title: non_empty_or(movie.display_title(), FALLBACK_TITLE),
            overview: movie.overview.clone().unwrap_or_default(),
            backdrop: image_url(movie.backdrop_path.as_deref().unwrap_or_default(), BACKDROP_SIZE),
        },
        None => HeroBanner {
            title: FALLBACK_TITLE.to_string(),
            overview: String::new(),
            backdrop: String::new(),
        },
    }
}

/// Rows are hidden while the home load runs. An active search replaces the four home
/// rows with a single results row.
pub fn rows(state: &SessionState) -> Vec<Row> {
    if state.home_status == LoadStatus::Loading {
        return Vec::new();
    }
    if let Some(results) = &state.search {
        return vec![row(format!("Search results ({})", results.len()), results)];
    }

    let home = state.home.clone().unwrap_or_default();
    vec![
        row("Trending Now".to_string(), &home.trending),
        row("Top Rated".to_string(), &home.top_rated),
        row("Action".to_string(), &home.action),
        row("Comedy".to_string(), &home.comedy),
    ]
}

fn row(title: String, movies: &[Movie]) -> Row {
    Row {
        title,
        cards: movies
            .iter()
            .map(|m| Card {
                id: m.id,
                title: m.display_title().to_string(),
                poster: image_url(m.poster_path.as_deref().unwrap_or_default(), POSTER_SIZE),
            })
            .collect(),
    }
}

pub fn modal(movie: &Movie, trailer: &TrailerState) -> ModalView {
    let rating = movie
        .vote_average
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "—".to_string());
    let released = movie
        .release_date
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or("—");
    let media = match trailer {
        TrailerState::Loading => ModalMedia::Loading,
        TrailerState::Loaded(key) => ModalMedia::Trailer(trailer_embed_url(key)),
        TrailerState::Idle | TrailerState::Unavailable => ModalMedia::Fallback {
            backdrop: image_url(movie.backdrop_path.as_deref().unwrap_or_default(), BACKDROP_SIZE),
        },
    };
    ModalView {
        title: movie.display_title().to_string(),
        meta: format!("⭐ {} • {}", rating, released),
        overview: movie.overview.clone().unwrap_or_default(),
        media,
    }
}

pub fn screen(state: &SessionState, hero: Option<&Movie>) -> Screen {
    let mut status = Vec::new();
    if let Some(err) = &state.error {
        status.push(err.clone());
    }
    if state.searching {
        status.push("Searching…".to_string());
    }
    if state.home_status == LoadStatus::Loading {
        status.push("Loading…".to_string());
    }

    Screen {
        hero: hero_banner(hero),
        status,
        rows: rows(state),
        modal: state
            .selection
            .as_ref()
            .map(|movie| modal(movie, &state.trailer)),
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.hero.title)?;
        if !self.hero.overview.is_empty() {
            writeln!(f, "{}", self.hero.overview)?;
        }
        for line in &self.status {
            writeln!(f, "[{}]", line)?;
        }
        for row in &self.rows {
            writeln!(f)?;
            writeln!(f, "{}", row.title)?;
            for (index, card) in row.cards.iter().enumerate() {
                writeln!(f, "  {:>2}. {} (#{})", index + 1, card.title, card.id)?;
            }
        }
        if let Some(modal) = &self.modal {
            writeln!(f)?;
            writeln!(f, "-- {} --", modal.title)?;
            writeln!(f, "{}", modal.meta)?;
            match &modal.media {
                ModalMedia::Loading => writeln!(f, "Loading trailer…")?,
                ModalMedia::Trailer(url) => writeln!(f, "Trailer: {}", url)?,
                ModalMedia::Fallback { .. } => writeln!(f, "Trailer not available")?,
            }
            writeln!(f, "{}", modal.overview)?;
        }
        Ok(())
    }
}
