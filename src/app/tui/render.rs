use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, Wrap,
};

use super::super::episode::{
    episode_number, format_episode_cell, format_quality_menu, format_updated_at, truncate,
};
use super::super::route::Route;
use super::super::watch::WatchSession;
use super::{GRID_COLUMNS, Prompt, Screen, TuiState, WatchScreen, WatchState};

const ACCENT: Color = Color::Rgb(240, 190, 60);
const MUTED: Color = Color::Rgb(185, 195, 210);

pub(super) fn draw_tui(frame: &mut Frame, state: &mut TuiState) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    if let Screen::Watch(watch) = &mut state.screen {
        draw_watch(frame, watch, chunks[0], chunks[1], chunks[2]);
    } else {
        draw_history(frame, state, chunks[0], chunks[1], chunks[2]);
    }

    let status_widget = Paragraph::new(state.status.clone())
        .style(status_style(&state.status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[3]);

    match &state.prompt {
        Some(Prompt::ConfirmClear) => {
            let text = format!(
                "Clear all watch history?\n\n{} entries will be removed.\n\n[y / Enter] Clear   [n / Esc] Cancel",
                state.view.len()
            );
            render_modal(frame, "Confirm Clear", &text);
        }
        Some(Prompt::DramaId(input)) => {
            let text = format!(
                "Drama id or watch route\n\n> {input}_\n\n[Enter] Open   [Esc] Cancel"
            );
            render_modal(frame, "Open Drama", &text);
        }
        None => {}
    }
}

fn draw_history(frame: &mut Frame, state: &mut TuiState, header: Rect, body: Rect, controls: Rect) {
    let header_widget = Paragraph::new(Line::from(vec![
        title_span("DRAMAWATCH"),
        Span::styled("   ", Style::default()),
        Span::styled("Continue Watching", Style::default().fg(MUTED)),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} entries", state.view.len()),
            Style::default().fg(MUTED),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("History"));
    frame.render_widget(header_widget, header);

    if state.view.is_empty() {
        let empty = Paragraph::new(
            "No watch history yet.\n\nDramas you watch will appear here.\nPress w to open a drama by id.",
        )
        .alignment(Alignment::Center)
        .style(Style::default().fg(MUTED))
        .block(panel_block("Library"));
        frame.render_widget(empty, body);
    } else {
        let rows: Vec<Row> = state
            .view
            .entries()
            .iter()
            .map(|entry| {
                Row::new(vec![
                    Cell::from(truncate(&entry.title, 48)),
                    Cell::from(episode_number(entry.episode).to_string()),
                    Cell::from(format_updated_at(entry.updated_at)),
                    Cell::from(Route::for_history(entry).to_string()),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(44),
                Constraint::Length(8),
                Constraint::Length(18),
                Constraint::Min(20),
            ],
        )
        .header(
            Row::new(vec!["Title", "Last Ep", "Last Watched", "Route"]).style(
                Style::default()
                    .fg(ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(panel_block("Library"))
        .row_highlight_style(
            Style::default()
                .bg(ACCENT)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
        frame.render_stateful_widget(table, body, &mut state.table_state);
    }

    let help = Paragraph::new(Span::styled(
        "↑/↓ move  Enter resume  w open id  r reload  c clear all  q quit",
        Style::default().fg(MUTED),
    ))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(help, controls);
}

fn draw_watch(frame: &mut Frame, watch: &mut WatchScreen, header: Rect, body: Rect, controls: Rect) {
    let help = Paragraph::new(Span::styled(
        "←/→ episode  ↑/↓ row  [/] page  v quality  Enter play  Esc back",
        Style::default().fg(MUTED),
    ))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(help, controls);

    let session = match &mut watch.state {
        WatchState::Loading => {
            render_header(frame, header, &watch.id, "loading");
            let loading = Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(ACCENT))
                .block(panel_block("Watch"));
            frame.render_widget(loading, body);
            return;
        }
        WatchState::Failed(err) => {
            render_header(frame, header, &watch.id, "error");
            let failed = Paragraph::new(format!("Could not load drama.\n\n{err}\n\nPress r to retry."))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(panel_block("Watch"));
            frame.render_widget(failed, body);
            return;
        }
        WatchState::Ready(session) => session,
    };

    if session.is_not_found() {
        render_header(frame, header, &watch.id, "not found");
        let missing = Paragraph::new("Drama not found.")
            .alignment(Alignment::Center)
            .block(panel_block("Watch"));
        frame.render_widget(missing, body);
        return;
    }

    let title = session
        .book()
        .map(|book| book.book_name.clone())
        .unwrap_or_default();
    render_header(frame, header, &title, &session.episode_label());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body);
    frame.render_widget(episode_grid(session), columns[0]);
    frame.render_widget(stream_details(session), columns[1]);
}

fn render_header(frame: &mut Frame, area: Rect, title: &str, detail: &str) {
    let header = Paragraph::new(Line::from(vec![
        title_span("DRAMAWATCH"),
        Span::styled("   ", Style::default()),
        Span::styled(
            truncate(title, 48),
            Style::default()
                .fg(Color::Rgb(230, 230, 230))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(detail.to_string(), Style::default().fg(ACCENT)),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Watch"));
    frame.render_widget(header, area);
}

fn episode_grid(session: &WatchSession) -> Paragraph<'static> {
    let pager = session.pager();
    let current = session.current();
    let mut lines = vec![Line::from(vec![
        Span::styled(
            if pager.has_prev() { "◂ " } else { "  " },
            Style::default().fg(MUTED),
        ),
        Span::styled(pager.range_label(), Style::default().fg(Color::White)),
        Span::styled(
            if pager.has_next() { " ▸" } else { "  " },
            Style::default().fg(MUTED),
        ),
    ])];
    lines.push(Line::default());

    let indices: Vec<usize> = pager.page_range().collect();
    for chunk in indices.chunks(GRID_COLUMNS) {
        let spans: Vec<Span> = chunk
            .iter()
            .map(|&index| {
                let style = if index == current {
                    Style::default()
                        .bg(ACCENT)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Rgb(230, 235, 242))
                };
                Span::styled(format_episode_cell(index, current), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel_block("Episodes"))
}

fn stream_details(session: &mut WatchSession) -> Paragraph<'static> {
    let route = Route::watch(session.id(), session.current()).to_string();
    let back = session.back_route().to_string();
    let chapter = session
        .current_episode()
        .map(|episode| format!("{} (index {})", episode.chapter_id, episode.chapter_index));
    let resolution = session.resolution();
    let text = match chapter {
        Some(chapter) => format!(
            "Chapter\n{}\n\nQuality\n{}\n\nStream\n{}\n\nRoute\n{route}\nBack: {back}",
            truncate(&chapter, 40),
            format_quality_menu(&resolution.qualities, resolution.quality),
            if resolution.is_playable() {
                truncate(&resolution.video_url, 60)
            } else {
                "nothing to play".to_string()
            },
        ),
        None => format!("Episode not found.\n\nRoute\n{route}\nBack: {back}"),
    };
    Paragraph::new(text)
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .wrap(Wrap { trim: false })
        .block(panel_block("Now Playing"))
}

fn title_span(text: &'static str) -> Span<'static> {
    Span::styled(
        text,
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn modal_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}

fn render_modal(frame: &mut Frame, title: &'static str, text: &str) {
    let area = popup_rect_for_text(frame.area(), text);
    frame.render_widget(Clear, area);
    let popup = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(modal_block(title));
    frame.render_widget(popup, area);
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let widest = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let width = widest
        .saturating_add(8)
        .clamp(40.min(area.width), 72.min(area.width));
    let height = line_count
        .saturating_add(4)
        .clamp(8.min(area.height), 16.min(area.height));

    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_fits_inside_small_terminals() {
        let area = Rect::new(0, 0, 30, 6);
        let popup = popup_rect_for_text(area, "a very long line that would not fit anywhere at all");
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
    }

    #[test]
    fn popup_is_centered() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = popup_rect_for_text(area, "short");
        assert_eq!(popup.width, 40);
        assert_eq!(popup.x, 30);
        assert_eq!(popup.y, (40 - popup.height) / 2);
    }
}
