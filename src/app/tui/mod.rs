mod actions;
mod render;
mod session;

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;

use super::history::{HistoryStore, HistoryView};
use super::playback::Player;
use super::route::Route;
use super::source::DramaSource;
use super::watch::WatchSession;

use self::actions::{
    drain_session_fetches, move_selection, open_watch, play_current, refresh_history,
    status_error, status_info, sync_history,
};
use self::render::draw_tui;
use self::session::TerminalGuard;

/// Episodes per row in the picker grid.
pub(super) const GRID_COLUMNS: usize = 5;

#[derive(Debug)]
pub(super) enum WatchState {
    Loading,
    Ready(Box<WatchSession>),
    Failed(String),
}

#[derive(Debug)]
pub(super) struct WatchScreen {
    pub(super) id: String,
    pub(super) start_ep: usize,
    pub(super) state: WatchState,
}

#[derive(Debug)]
pub(super) enum Screen {
    History,
    Watch(WatchScreen),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Prompt {
    ConfirmClear,
    DramaId(String),
}

#[derive(Debug)]
pub(super) struct SessionFetchResult {
    pub(super) id: String,
    pub(super) result: Result<WatchSession, String>,
}

pub(super) struct TuiState {
    pub(super) view: HistoryView,
    pub(super) table_state: TableState,
    pub(super) screen: Screen,
    pub(super) prompt: Option<Prompt>,
    pub(super) status: String,
}

pub(crate) fn run_tui<S>(store: &HistoryStore, source: &S, player: &Player) -> Result<()>
where
    S: DramaSource + Clone + Send + 'static,
{
    let mut guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let view = HistoryView::load(store);
    let mut table_state = TableState::default();
    table_state.select((!view.is_empty()).then_some(0));
    let status = if !store.is_available() {
        status_error("History storage unavailable; progress will not be saved.")
    } else if view.is_empty() {
        status_info("No watch history yet. Press `w` to open a drama by id.")
    } else {
        status_info("Ready.")
    };
    let mut state = TuiState {
        view,
        table_state,
        screen: Screen::History,
        prompt: None,
        status,
    };
    let (fetch_tx, fetch_rx) = mpsc::channel::<SessionFetchResult>();

    loop {
        drain_session_fetches(&fetch_rx, &mut state);
        sync_history(store, &mut state);
        terminal.draw(|frame| draw_tui(frame, &mut state))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(prompt) = state.prompt.take() {
            match prompt {
                Prompt::ConfirmClear => match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        match state.view.clear(store) {
                            Ok(()) => state.status = status_info("Watch history cleared."),
                            Err(err) => {
                                state.status = status_error(&format!("Clear failed: {err:#}"))
                            }
                        }
                        state.table_state.select(None);
                    }
                    KeyCode::Esc | KeyCode::Char('n') => {
                        state.status = status_info("Clear canceled.");
                    }
                    _ => state.prompt = Some(Prompt::ConfirmClear),
                },
                Prompt::DramaId(mut input) => match key.code {
                    KeyCode::Enter => match Route::parse(&input) {
                        Some(Route::Watch { id, ep }) => {
                            open_watch(&mut state, source, &fetch_tx, &id, ep)
                        }
                        Some(Route::Detail { id }) => {
                            open_watch(&mut state, source, &fetch_tx, &id, 0)
                        }
                        Some(Route::History) | None => {
                            state.status =
                                status_error(&format!("Not a drama id or watch route: {input}"));
                        }
                    },
                    KeyCode::Esc => state.status = status_info("Open canceled."),
                    KeyCode::Backspace => {
                        input.pop();
                        state.prompt = Some(Prompt::DramaId(input));
                    }
                    KeyCode::Char(ch) => {
                        input.push(ch);
                        state.prompt = Some(Prompt::DramaId(input));
                    }
                    _ => state.prompt = Some(Prompt::DramaId(input)),
                },
            }
            continue;
        }

        if matches!(state.screen, Screen::History) {
            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Up => {
                    if let Some(selected) = state.table_state.selected() {
                        state.table_state.select(Some(selected.saturating_sub(1)));
                    }
                }
                KeyCode::Down => {
                    if let Some(selected) = state.table_state.selected()
                        && !state.view.is_empty()
                    {
                        let next = (selected + 1).min(state.view.len() - 1);
                        state.table_state.select(Some(next));
                    }
                }
                KeyCode::Char('r') => {
                    refresh_history(store, &mut state, None);
                    state.status = status_info("History reloaded.");
                }
                KeyCode::Char('w') => {
                    state.prompt = Some(Prompt::DramaId(String::new()));
                    state.status = status_info("Enter a drama id or /watch/<id>?ep=<n>.");
                }
                KeyCode::Char('c') => {
                    if state.view.is_empty() {
                        state.status = status_info("History is already empty.");
                    } else {
                        state.prompt = Some(Prompt::ConfirmClear);
                        state.status =
                            status_info("Confirm clear: y/Enter to clear, n/Esc to cancel.");
                    }
                }
                KeyCode::Enter => {
                    let route = state
                        .table_state
                        .selected()
                        .and_then(|idx| state.view.get(idx))
                        .map(Route::for_history);
                    if let Some(Route::Watch { id, ep }) = route {
                        open_watch(&mut state, source, &fetch_tx, &id, ep);
                    }
                }
                _ => {}
            }
            continue;
        }

        let Screen::Watch(watch) = &mut state.screen else {
            continue;
        };
        let mut back_to_history = false;
        let mut retry = None;
        match (&mut watch.state, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q')) => back_to_history = true,
            (WatchState::Failed(_), KeyCode::Char('r')) => {
                retry = Some((watch.id.clone(), watch.start_ep));
            }
            (WatchState::Ready(session), code) => match code {
                KeyCode::Left if session.current() > 0 => {
                    let target = session.current() - 1;
                    state.status = move_selection(session, target);
                }
                KeyCode::Right if session.has_next() => {
                    let target = session.current() + 1;
                    state.status = move_selection(session, target);
                }
                KeyCode::Up => {
                    let target = session.current().saturating_sub(GRID_COLUMNS);
                    state.status = move_selection(session, target);
                }
                KeyCode::Down => {
                    let last = session.episodes().len().saturating_sub(1);
                    let target = session.current().saturating_add(GRID_COLUMNS).min(last);
                    state.status = move_selection(session, target);
                }
                KeyCode::PageUp | KeyCode::Char('[') => session.pager_mut().prev_page(),
                KeyCode::PageDown | KeyCode::Char(']') => session.pager_mut().next_page(),
                KeyCode::Char('v') => {
                    let quality = session.cycle_quality();
                    state.status = status_info(&format!("Quality set to {quality}p."));
                }
                KeyCode::Enter => {
                    state.status = match play_current(&mut guard, player, session) {
                        Ok(message) => status_info(&message),
                        Err(err) => status_error(&format!("Playback failed: {err:#}")),
                    };
                    terminal.clear()?;
                }
                _ => {}
            },
            _ => {}
        }

        if let Some((id, ep)) = retry {
            open_watch(&mut state, source, &fetch_tx, &id, ep);
        } else if back_to_history {
            let previous = std::mem::replace(&mut state.screen, Screen::History);
            let watched_id = match previous {
                Screen::Watch(watch) => Some(watch.id),
                Screen::History => None,
            };
            refresh_history(store, &mut state, watched_id.as_deref());
        }
    }

    terminal.show_cursor()?;
    guard.leave()?;
    Ok(())
}
