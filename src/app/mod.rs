mod drama;
mod episode;
mod history;
mod pager;
mod playback;
mod recorder;
mod resolver;
mod route;
mod source;
mod tui;
mod watch;


use anyhow::{Result, bail};
use tracing::warn;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::db::SqliteKv;

use self::episode::{
    episode_number, format_quality_menu, format_updated_at, now_ms, truncate,
};
use self::history::{HistoryStore, HistoryView};
use self::playback::{PlaybackOutcome, PlaybackRequest, Player};
use self::route::Route;
use self::source::{DramaSource, HttpDramaSource};
use self::watch::WatchSession;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(&cli.global)?;
    let store = open_history(&config);
    let source = HttpDramaSource::new(&config.api_base, config.http.clone());
    let player = Player::new(config.player_bin.clone());

    match cli.command {
        Some(Command::Watch {
            target,
            ep,
            quality,
            autoplay,
        }) => {
            let Some(route) = Route::parse(&target) else {
                bail!("cannot read a drama id from '{target}'");
            };
            let (id, route_ep) = match route {
                Route::Watch { id, ep } => (id, ep),
                Route::Detail { id } => (id, 0),
                Route::History => bail!("'{target}' is not a watch route"),
            };
            let options = WatchOptions {
                start_ep: ep.unwrap_or(route_ep),
                quality,
                autoplay,
            };
            run_watch(&store, &source, &player, &id, &options)?
        }
        Some(Command::Episodes { id, page }) => run_episodes(&source, &id, page)?,
        Some(Command::Resume { position }) => run_resume(&store, &source, &player, position)?,
        Some(Command::History) => run_history(&store),
        Some(Command::Clear) => run_clear(&store)?,
        Some(Command::Tui) | None => tui::run_tui(&store, &source, &player)?,
    }

    Ok(())
}

fn open_history(config: &Config) -> HistoryStore {
    match SqliteKv::open(&config.db_path) {
        Ok(kv) => HistoryStore::new(Box::new(kv)),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "history storage unavailable; history disabled");
            HistoryStore::unavailable()
        }
    }
}

pub(crate) fn load_session<S: DramaSource>(
    source: &S,
    id: &str,
    start_ep: usize,
) -> Result<WatchSession> {
    let detail = source.fetch_detail(id)?;
    let episodes = source.fetch_episodes(id)?;
    Ok(WatchSession::new(id, detail, episodes, start_ep))
}

#[derive(Debug, Clone, Default)]
struct WatchOptions {
    start_ep: usize,
    quality: Option<u32>,
    autoplay: bool,
}

fn run_watch<S: DramaSource>(
    store: &HistoryStore,
    source: &S,
    player: &Player,
    id: &str,
    options: &WatchOptions,
) -> Result<()> {
    let mut session = load_session(source, id, options.start_ep)?;
    if session.is_not_found() {
        println!("Drama not found: {id}");
        return Ok(());
    }
    if let Some(quality) = options.quality {
        session.set_quality(quality);
        if session.resolution().quality != quality {
            println!(
                "{quality}p is not offered; playing {}p instead.",
                session.quality()
            );
        }
    }

    loop {
        if let Err(err) = session.record_history(store, now_ms()) {
            warn!(error = %format!("{err:#}"), "failed to record history");
        }
        let Some(request) = playback_request(&mut session) else {
            let number = episode_number(session.current());
            if session.current_episode().is_some() {
                println!("Nothing to play for episode {number}.");
            } else {
                println!(
                    "Episode {number} not found ({} episodes available).",
                    session.episodes().len()
                );
            }
            return Ok(());
        };

        let resolution = session.resolution();
        println!("{}", request.title);
        println!(
            "  Quality: {}",
            format_quality_menu(&resolution.qualities, resolution.quality)
        );
        println!("  Route:   {}", Route::watch(id, session.current()));

        let outcome = match player.play(&request) {
            Ok(outcome) => outcome,
            Err(err) => {
                println!("Player launch failed: {err:#}");
                return Ok(());
            }
        };
        if !outcome.success {
            println!("{}", playback_failure_message(&outcome));
            return Ok(());
        }
        if !options.autoplay {
            return Ok(());
        }
        match session.on_video_ended() {
            Some(route) => println!("\nUp next: {route}"),
            None => {
                println!("\nLast episode finished.");
                return Ok(());
            }
        }
    }
}

/// The playable request for the session's current episode, if any.
pub(crate) fn playback_request(session: &mut WatchSession) -> Option<PlaybackRequest> {
    let label = session.episode_label();
    let book_name = session
        .book()
        .map(|book| book.book_name.clone())
        .unwrap_or_default();
    let resolution = session.resolution();
    if !resolution.is_playable() {
        return None;
    }
    Some(PlaybackRequest {
        url: resolution.video_url,
        title: format!("{book_name} - {label}"),
    })
}

fn run_episodes<S: DramaSource>(source: &S, id: &str, page: usize) -> Result<()> {
    let mut session = load_session(source, id, 0)?;
    if session.is_not_found() {
        println!("Drama not found: {id}");
        return Ok(());
    }
    session.pager_mut().set_page(page);

    let pager = *session.pager();
    if let Some(book) = session.book() {
        println!("{} ({} episodes)", book.book_name, session.episodes().len());
    }
    println!(
        "Page {}/{}  [{}]",
        pager.page() + 1,
        pager.page_count(),
        pager.range_label()
    );
    println!("{:<6} {:<24} {:<20}", "EP", "CHAPTER", "QUALITIES");
    for (index, episode) in pager.page_range().zip(session.page_episodes()) {
        let qualities = resolver::available_qualities(resolver::active_cdn(episode));
        let qualities = qualities
            .iter()
            .map(|quality| format!("{quality}p"))
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:<6} {:<24} {:<20}",
            episode_number(index),
            truncate(&episode.chapter_id, 24),
            qualities
        );
    }
    Ok(())
}

fn run_resume<S: DramaSource>(
    store: &HistoryStore,
    source: &S,
    player: &Player,
    position: usize,
) -> Result<()> {
    let view = HistoryView::load(store);
    let Some(entry) = position.checked_sub(1).and_then(|idx| view.get(idx)) else {
        println!("No history entry at position {position}. Run `dramawatch history` to list.");
        return Ok(());
    };
    let Route::Watch { id, ep } = Route::for_history(entry) else {
        return Ok(());
    };
    println!("Resuming {} at episode {}", entry.title, episode_number(ep));
    let options = WatchOptions {
        start_ep: ep,
        ..WatchOptions::default()
    };
    run_watch(store, source, player, &id, &options)
}

fn run_history(store: &HistoryStore) {
    let view = HistoryView::load(store);
    if view.is_empty() {
        println!("No watch history yet. Run `dramawatch watch <id>` first.");
        return;
    }

    println!(
        "{:<4} {:<40} {:<6} {:<18} {:<28}",
        "#", "TITLE", "EP", "LAST WATCHED", "ROUTE"
    );
    for (idx, entry) in view.entries().iter().enumerate() {
        println!(
            "{:<4} {:<40} {:<6} {:<18} {:<28}",
            idx + 1,
            truncate(&entry.title, 40),
            episode_number(entry.episode),
            format_updated_at(entry.updated_at),
            Route::for_history(entry)
        );
    }
}

fn run_clear(store: &HistoryStore) -> Result<()> {
    store.clear()?;
    println!("Watch history cleared.");
    Ok(())
}

fn playback_failure_message(outcome: &PlaybackOutcome) -> String {
    match outcome.failure_detail.as_deref() {
        Some(detail) => format!("Playback failed/interrupted: {detail}."),
        None => "Playback failed/interrupted.".to_string(),
    }
}
