use super::drama::{CdnSource, Episode};

pub(crate) const DEFAULT_QUALITY: u32 = 720;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution<'a> {
    pub(crate) episode: Option<&'a Episode>,
    pub(crate) qualities: Vec<u32>,
    pub(crate) quality: u32,
    pub(crate) video_url: String,
}

impl Resolution<'_> {
    pub(crate) fn is_playable(&self) -> bool {
        !self.video_url.is_empty()
    }
}

pub(crate) fn active_episode(episodes: &[Episode], index: usize) -> Option<&Episode> {
    episodes.get(index)
}

pub(crate) fn active_cdn(episode: &Episode) -> Option<&CdnSource> {
    episode
        .cdn_list
        .iter()
        .find(|cdn| cdn.is_default())
        .or_else(|| episode.cdn_list.first())
}

/// Distinct qualities offered by `cdn`, highest first. Falls back to 720p.
pub(crate) fn available_qualities(cdn: Option<&CdnSource>) -> Vec<u32> {
    let mut qualities: Vec<u32> = cdn
        .map(|cdn| {
            cdn.video_path_list
                .iter()
                .filter_map(|variant| variant.quality)
                .collect()
        })
        .unwrap_or_default();
    if qualities.is_empty() {
        qualities.push(DEFAULT_QUALITY);
    }
    qualities.sort_unstable_by(|a, b| b.cmp(a));
    qualities.dedup();
    qualities
}

pub(crate) fn correct_quality(selected: u32, available: &[u32]) -> u32 {
    if available.contains(&selected) {
        return selected;
    }
    available.first().copied().unwrap_or(DEFAULT_QUALITY)
}

pub(crate) fn video_url(cdn: Option<&CdnSource>, quality: u32) -> String {
    let Some(cdn) = cdn else {
        return String::new();
    };
    let variants = &cdn.video_path_list;
    variants
        .iter()
        .find(|variant| variant.quality == Some(quality))
        .or_else(|| variants.iter().find(|variant| variant.is_default()))
        .or_else(|| variants.first())
        .map(|variant| variant.video_path.clone())
        .unwrap_or_default()
}

pub(crate) fn resolve(episodes: &[Episode], index: usize, selected_quality: u32) -> Resolution<'_> {
    let episode = active_episode(episodes, index);
    let cdn = episode.and_then(active_cdn);
    let qualities = available_qualities(cdn);
    let quality = correct_quality(selected_quality, &qualities);
    let video_url = video_url(cdn, quality);
    Resolution {
        episode,
        qualities,
        quality,
        video_url,
    }
}

/// The quality after `current` in the descending list, wrapping around.
pub(crate) fn cycle_quality(current: u32, available: &[u32]) -> u32 {
    match available.iter().position(|quality| *quality == current) {
        Some(idx) => available[(idx + 1) % available.len()],
        None => correct_quality(current, available),
    }
}
