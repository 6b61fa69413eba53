use chrono::{Local, TimeZone};

/// One-based episode number as shown to viewers.
pub(crate) fn episode_number(index: usize) -> usize {
    index.saturating_add(1)
}

/// Grid cell for the episode at `index`; the current one is bracketed.
pub(crate) fn format_episode_cell(index: usize, current: usize) -> String {
    let number = episode_number(index);
    if index == current {
        format!("[{number:>3}]")
    } else {
        format!(" {number:>3} ")
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

pub(crate) fn format_updated_at(updated_at_ms: i64) -> String {
    match Local.timestamp_millis_opt(updated_at_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

pub(crate) fn format_quality_menu(qualities: &[u32], active: u32) -> String {
    qualities
        .iter()
        .map(|quality| {
            if *quality == active {
                format!("{quality}p ✓")
            } else {
                format!("{quality}p")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_adds_ellipsis_on_char_boundary() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Cinta Sang Pewaris", 10), "Cinta S...");
        assert_eq!(truncate("ドラマのタイトル長い", 6), "ドラマ...");
    }

    #[test]
    fn quality_menu_marks_active_entry() {
        assert_eq!(format_quality_menu(&[1080, 720, 480], 720), "1080p  720p ✓  480p");
    }

    #[test]
    fn episode_cell_brackets_current_episode() {
        assert_eq!(format_episode_cell(4, 4), "[  5]");
        assert_eq!(format_episode_cell(4, 0), "   5 ");
        assert_eq!(format_episode_cell(usize::MAX, 0), format!(" {} ", usize::MAX));
    }

    #[test]
    fn updated_at_out_of_range_renders_placeholder() {
        assert_eq!(format_updated_at(i64::MAX), "-");
        assert!(!format_updated_at(1_700_000_000_000).is_empty());
    }
}
