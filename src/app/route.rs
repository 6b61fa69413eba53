use std::fmt;

use url::Url;

use super::history::HistoryEntry;

// Relative routes resolve against this; only path and query are read.
const ROUTE_BASE: &str = "http://dramawatch.local/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Watch { id: String, ep: usize },
    Detail { id: String },
    History,
}

impl Route {
    pub(crate) fn watch(id: &str, ep: usize) -> Self {
        Self::Watch {
            id: id.to_string(),
            ep,
        }
    }

    pub(crate) fn for_history(entry: &HistoryEntry) -> Self {
        Self::watch(&entry.slug, entry.episode)
    }

    /// Parses `/watch/<id>?ep=<n>`, `/detail/<id>` or `/history`, also as a
    /// full URL. A bare id is taken as a watch route at episode 0.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let url = Url::parse(ROUTE_BASE).ok()?.join(trimmed).ok()?;
        let segments: Vec<String> = url
            .path_segments()?
            .filter(|seg| !seg.is_empty())
            .map(decode_segment)
            .collect();
        let ep = parse_ep_param(&url);
        match segments.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["watch", id] => Some(Self::watch(id, ep)),
            ["detail", id] => Some(Self::Detail { id: id.to_string() }),
            ["history"] => Some(Self::History),
            [id] if !trimmed.starts_with('/') => Some(Self::watch(id, ep)),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Watch { id, ep } => write!(f, "/watch/{id}?ep={ep}"),
            Self::Detail { id } => write!(f, "/detail/{id}"),
            Self::History => f.write_str("/history"),
        }
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

// Missing, negative or non-numeric `ep` starts from the first episode.
fn parse_ep_param(url: &Url) -> usize {
    url.query_pairs()
        .find(|(key, _)| key == "ep")
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_route_round_trips_through_display() {
        let route = Route::watch("41000102", 12);
        assert_eq!(route.to_string(), "/watch/41000102?ep=12");
        assert_eq!(Route::parse("/watch/41000102?ep=12"), Some(route));
    }

    #[test]
    fn ep_param_defaults_to_zero() {
        assert_eq!(Route::parse("/watch/abc"), Some(Route::watch("abc", 0)));
        assert_eq!(Route::parse("/watch/abc?ep=-3"), Some(Route::watch("abc", 0)));
        assert_eq!(Route::parse("/watch/abc?ep=two"), Some(Route::watch("abc", 0)));
        assert_eq!(
            Route::parse("/watch/abc?autoplay=1&ep=4"),
            Some(Route::watch("abc", 4))
        );
    }

    #[test]
    fn percent_encoded_parts_are_decoded() {
        assert_eq!(Route::parse("/watch/a%20b?ep=%33"), Some(Route::watch("a b", 3)));
        assert_eq!(
            Route::parse("https://example.test/watch/41000?ep=2"),
            Some(Route::watch("41000", 2))
        );
    }

    #[test]
    fn huge_ep_values_parse_without_overflow() {
        assert_eq!(
            Route::parse("/watch/1?ep=18446744073709551615"),
            Some(Route::watch("1", usize::MAX))
        );
        assert_eq!(
            Route::parse("/watch/1?ep=99999999999999999999999"),
            Some(Route::watch("1", 0))
        );
    }

    #[test]
    fn bare_id_is_a_watch_route() {
        assert_eq!(Route::parse("41000102"), Some(Route::watch("41000102", 0)));
        assert_eq!(Route::parse("   "), None);
        assert_eq!(Route::parse("/unknown/a/b"), None);
    }

    #[test]
    fn detail_and_history_routes() {
        assert_eq!(
            Route::parse("/detail/9").map(|route| route.to_string()),
            Some("/detail/9".to_string())
        );
        assert_eq!(Route::parse("/history"), Some(Route::History));
    }

    #[test]
    fn history_entry_links_to_stored_episode() {
        let entry = HistoryEntry {
            drama_id: "9".to_string(),
            slug: "9".to_string(),
            title: "T".to_string(),
            poster: String::new(),
            episode: 7,
            updated_at: 0,
        };
        assert_eq!(Route::for_history(&entry).to_string(), "/watch/9?ep=7");
    }
}
