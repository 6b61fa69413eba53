use anyhow::Result;

use super::drama::{BookSummary, DetailPayload, Episode};
use super::episode::episode_number;
use super::history::HistoryStore;
use super::pager::{EPISODES_PER_PAGE, EpisodePager};
use super::recorder::HistoryRecorder;
use super::resolver::{DEFAULT_QUALITY, Resolution, cycle_quality, resolve};
use super::route::Route;

/// Selection state for one drama: current episode, quality and picker page.
#[derive(Debug)]
pub(crate) struct WatchSession {
    id: String,
    book: Option<BookSummary>,
    episodes: Vec<Episode>,
    current: usize,
    quality: u32,
    pager: EpisodePager,
    recorder: HistoryRecorder,
}

impl WatchSession {
    pub(crate) fn new(
        id: &str,
        detail: DetailPayload,
        episodes: Vec<Episode>,
        start_ep: usize,
    ) -> Self {
        let mut pager = EpisodePager::new(EPISODES_PER_PAGE, episodes.len());
        pager.sync_to_episode(start_ep);
        Self {
            id: id.to_string(),
            book: detail.into_book(),
            episodes,
            current: start_ep,
            quality: DEFAULT_QUALITY,
            pager,
            recorder: HistoryRecorder::default(),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn book(&self) -> Option<&BookSummary> {
        self.book.as_ref()
    }

    pub(crate) fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub(crate) fn current(&self) -> usize {
        self.current
    }

    pub(crate) fn quality(&self) -> u32 {
        self.quality
    }

    pub(crate) fn pager(&self) -> &EpisodePager {
        &self.pager
    }

    pub(crate) fn pager_mut(&mut self) -> &mut EpisodePager {
        &mut self.pager
    }

    pub(crate) fn is_not_found(&self) -> bool {
        self.book.is_none() || self.episodes.is_empty()
    }

    pub(crate) fn current_episode(&self) -> Option<&Episode> {
        self.episodes.get(self.current)
    }

    pub(crate) fn page_episodes(&self) -> &[Episode] {
        self.pager.slice(&self.episodes)
    }

    /// Selects `index`, keeps the picker on its page and returns the route to push.
    pub(crate) fn select_episode(&mut self, index: usize) -> Route {
        self.current = index;
        self.pager.sync_to_episode(index);
        Route::watch(&self.id, index)
    }

    pub(crate) fn set_quality(&mut self, quality: u32) {
        self.quality = quality;
    }

    pub(crate) fn cycle_quality(&mut self) -> u32 {
        let qualities = self.resolution().qualities;
        self.quality = cycle_quality(self.quality, &qualities);
        self.quality
    }

    /// Resolves the playable stream and adopts the auto-corrected quality.
    pub(crate) fn resolution(&mut self) -> Resolution<'_> {
        let corrected = resolve(&self.episodes, self.current, self.quality).quality;
        self.quality = corrected;
        resolve(&self.episodes, self.current, self.quality)
    }

    pub(crate) fn record_history(&mut self, store: &HistoryStore, now_ms: i64) -> Result<bool> {
        self.recorder.observe(
            store,
            self.book.as_ref(),
            self.episodes.get(self.current),
            self.current,
            now_ms,
        )
    }

    pub(crate) fn has_next(&self) -> bool {
        self.current.saturating_add(1) < self.episodes.len()
    }

    /// Advances to the next episode once playback ends, if there is one.
    pub(crate) fn on_video_ended(&mut self) -> Option<Route> {
        if !self.has_next() {
            return None;
        }
        Some(self.select_episode(self.current + 1))
    }

    pub(crate) fn episode_label(&self) -> String {
        format!(
            "Ep.{} / {} Episodes",
            episode_number(self.current),
            self.episodes.len()
        )
    }

    pub(crate) fn back_route(&self) -> Route {
        Route::Detail {
            id: self.id.clone(),
        }
    }
}
