use std::sync::mpsc;

use anyhow::Result;

use super::super::episode::{episode_number, now_ms};
use super::super::history::HistoryStore;
use super::super::playback::Player;
use super::super::playback_request;
use super::super::source::DramaSource;
use super::super::watch::WatchSession;
use super::super::load_session;
use super::session::TerminalGuard;
use super::{Screen, SessionFetchResult, TuiState, WatchScreen, WatchState};

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

/// Reloads the history snapshot, keeping the selection on `preferred_id` when present.
pub(super) fn refresh_history(store: &HistoryStore, state: &mut TuiState, preferred_id: Option<&str>) {
    state.view.refresh(store);
    if state.view.is_empty() {
        state.table_state.select(None);
        return;
    }

    if let Some(id) = preferred_id
        && let Some(idx) = state
            .view
            .entries()
            .iter()
            .position(|entry| entry.drama_id == id)
    {
        state.table_state.select(Some(idx));
        return;
    }

    match state.table_state.selected() {
        Some(selected) => state
            .table_state
            .select(Some(selected.min(state.view.len() - 1))),
        None => state.table_state.select(Some(0)),
    }
}

/// Switches to the watch screen and loads detail and episodes off the UI thread.
pub(super) fn open_watch<S>(
    state: &mut TuiState,
    source: &S,
    tx: &mpsc::Sender<SessionFetchResult>,
    id: &str,
    ep: usize,
) where
    S: DramaSource + Clone + Send + 'static,
{
    state.screen = Screen::Watch(WatchScreen {
        id: id.to_string(),
        start_ep: ep,
        state: WatchState::Loading,
    });
    state.status = status_info(&format!("Loading drama {id}..."));

    let source = source.clone();
    let id = id.to_string();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let result = load_session(&source, &id, ep).map_err(|err| format!("{err:#}"));
        let _ = tx.send(SessionFetchResult { id, result });
    });
}

/// Applies finished fetches; results for a screen that is no longer shown are dropped.
pub(super) fn drain_session_fetches(rx: &mpsc::Receiver<SessionFetchResult>, state: &mut TuiState) {
    while let Ok(fetched) = rx.try_recv() {
        let Screen::Watch(watch) = &mut state.screen else {
            continue;
        };
        if watch.id != fetched.id || !matches!(watch.state, WatchState::Loading) {
            continue;
        }
        match fetched.result {
            Ok(session) if session.is_not_found() => {
                state.status = status_error(&format!("Drama not found: {}", fetched.id));
                watch.state = WatchState::Ready(Box::new(session));
            }
            Ok(session) => {
                state.status = status_info(&session.episode_label());
                watch.state = WatchState::Ready(Box::new(session));
            }
            Err(err) => {
                state.status = status_error("Loading failed. Press r to retry.");
                watch.state = WatchState::Failed(err);
            }
        }
    }
}

/// Records the active episode; the session's recorder drops repeats.
pub(super) fn sync_history(store: &HistoryStore, state: &mut TuiState) {
    let Screen::Watch(WatchScreen {
        state: WatchState::Ready(session),
        ..
    }) = &mut state.screen
    else {
        return;
    };
    if let Err(err) = session.record_history(store, now_ms()) {
        state.status = status_error(&format!("History not saved: {err:#}"));
    }
}

pub(super) fn move_selection(session: &mut WatchSession, index: usize) -> String {
    let route = session.select_episode(index);
    status_info(&format!("{}  {route}", session.episode_label()))
}

pub(super) fn play_current(
    guard: &mut TerminalGuard,
    player: &Player,
    session: &mut WatchSession,
) -> Result<String> {
    let Some(request) = playback_request(session) else {
        return Ok(format!(
            "Nothing to play for episode {}.",
            episode_number(session.current())
        ));
    };

    let outcome = guard.paused(|| player.play(&request))??;
    if !outcome.success {
        let detail = outcome
            .failure_detail
            .unwrap_or_else(|| "player did not exit cleanly".to_string());
        return Ok(format!("Playback interrupted: {detail}."));
    }

    let finished = episode_number(session.current());
    match session.on_video_ended() {
        Some(_) => Ok(format!(
            "Finished episode {finished}. Up next: episode {}, Enter to play.",
            episode_number(session.current())
        )),
        None => Ok(format!("Finished episode {finished}, the last one.")),
    }
}
