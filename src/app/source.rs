use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::HttpSettings;
use crate::http::get_json_with_retries;

use super::drama::{DetailPayload, Episode, parse_episode_list};

/// Remote collaborator supplying drama detail and episode lists.
pub(crate) trait DramaSource {
    fn fetch_detail(&self, id: &str) -> Result<DetailPayload>;
    fn fetch_episodes(&self, id: &str) -> Result<Vec<Episode>>;
}

#[derive(Debug, Clone)]
pub(crate) struct HttpDramaSource {
    base: String,
    settings: HttpSettings,
}

impl HttpDramaSource {
    pub(crate) fn new(base: &str, settings: HttpSettings) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            settings,
        }
    }

    fn endpoint(&self, resource: &str, id: &str) -> String {
        format!("{}/{resource}/{}", self.base, urlencoding::encode(id.trim()))
    }

    fn get(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching");
        get_json_with_retries(url, &self.settings).map_err(|err| anyhow!(err))
    }
}

impl DramaSource for HttpDramaSource {
    fn fetch_detail(&self, id: &str) -> Result<DetailPayload> {
        let url = self.endpoint("detail", id);
        let raw = self
            .get(&url)
            .with_context(|| format!("failed to fetch detail for {id}"))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("detail response for {id} is not JSON"))?;
        let payload = DetailPayload::classify(&value);
        if payload.book().is_none() {
            warn!(drama = %id, "detail response has an unrecognized shape");
        }
        Ok(payload)
    }

    fn fetch_episodes(&self, id: &str) -> Result<Vec<Episode>> {
        let url = self.endpoint("episodes", id);
        let raw = self
            .get(&url)
            .with_context(|| format!("failed to fetch episodes for {id}"))?;
        parse_episode_list(&raw).with_context(|| format!("failed to decode episodes for {id}"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::drama::BookSummary;
    use crate::http::tests::{Reply, StubApi};

    fn source(api: &StubApi) -> HttpDramaSource {
        HttpDramaSource::new(
            &format!("{}/api/", api.base_url),
            HttpSettings {
                connect_timeout: Duration::from_millis(200),
                read_timeout: Duration::from_millis(200),
                attempts: 2,
                retry_delay: Duration::from_millis(1),
            },
        )
    }

    #[test]
    fn fetch_detail_classifies_legacy_envelope() {
        let api = StubApi::serve(vec![Reply::new(
            200,
            r#"{"data":{"book":{"bookId":"41000","bookName":"Hidden Heir"}}}"#,
        )]);

        let payload = source(&api).fetch_detail("41000").expect("detail");
        assert_eq!(
            payload,
            DetailPayload::Legacy(BookSummary {
                book_id: "41000".to_string(),
                book_name: "Hidden Heir".to_string(),
            })
        );
        assert_eq!(api.request_paths(), vec!["/api/detail/41000".to_string()]);
    }

    #[test]
    fn fetch_detail_reports_unrecognized_without_failing() {
        let api = StubApi::serve(vec![Reply::new(200, "{}")]);
        let payload = source(&api).fetch_detail("1").expect("detail");
        assert_eq!(payload, DetailPayload::Unrecognized);
    }

    #[test]
    fn fetch_episodes_retries_then_decodes() {
        let api = StubApi::serve(vec![
            Reply::new(503, "busy"),
            Reply::new(
                200,
                r#"[{"chapterId":"b","chapterIndex":1},{"chapterId":"a","chapterIndex":0}]"#,
            ),
        ]);

        let episodes = source(&api).fetch_episodes("a b").expect("episodes");
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].chapter_id, "b");
        assert_eq!(api.request_count(), 2);
        assert!(
            api
                .request_paths()
                .iter()
                .all(|path| path == "/api/episodes/a%20b")
        );
    }

    #[test]
    fn fetch_episodes_surfaces_http_failure() {
        let api = StubApi::serve(vec![Reply::new(404, "missing")]);
        let err = source(&api)
            .fetch_episodes("9")
            .expect_err("404 should fail");
        assert!(
            format!("{err:#}").contains("HTTP status 404"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn fetch_episodes_fails_on_error_envelope() {
        let api = StubApi::serve(vec![Reply::new(200, r#"{"error":"rate limited"}"#)]);
        let err = source(&api)
            .fetch_episodes("9")
            .expect_err("an object without data is not an episode list");
        assert!(
            format!("{err:#}").contains("failed to decode episodes for 9"),
            "unexpected error: {err:#}"
        );
    }
}
