use std::thread;

use tracing::debug;

use crate::config::HttpSettings;

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// GETs `url` expecting a JSON body, retrying throttling, server errors and
/// transport failures up to `settings.attempts` times.
pub(crate) fn get_json_with_retries(url: &str, settings: &HttpSettings) -> Result<String, String> {
    let attempts = settings.attempts.max(1);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(settings.connect_timeout)
        .timeout_read(settings.read_timeout)
        .timeout_write(settings.read_timeout)
        .build();

    for attempt in 1..=attempts {
        let request = agent.get(url).set("Accept", "application/json");

        match request.call() {
            Ok(response) => match response.into_string() {
                Ok(body) => return Ok(body),
                Err(err) => {
                    return Err(format!("request failed: response decode failed: {err}"));
                }
            },
            Err(ureq::Error::Status(status, response)) => {
                let response_body = response.into_string().ok().unwrap_or_default();
                let body = response_body.trim();
                let status_error = if body.is_empty() {
                    format!("HTTP status {status}")
                } else {
                    let truncated = body.chars().take(240).collect::<String>();
                    format!("HTTP status {status} ({truncated})")
                };

                if should_retry_http_status(status) && attempt < attempts {
                    debug!(%url, attempt, status, "retrying after retryable status");
                    thread::sleep(settings.retry_delay);
                    continue;
                }

                if should_retry_http_status(status) {
                    return Err(format!(
                        "request failed after {attempts} attempt(s): {status_error}"
                    ));
                }

                return Err(format!("request failed: {status_error}"));
            }
            Err(ureq::Error::Transport(err)) => {
                let transport_error = format!("transport error: {err}");
                if attempt < attempts {
                    debug!(%url, attempt, error = %err, "retrying after transport error");
                    thread::sleep(settings.retry_delay);
                    continue;
                }
                return Err(format!(
                    "request failed after {attempts} attempt(s): {transport_error}"
                ));
            }
        }
    }

    Err("request failed: exhausted attempts without a concrete error".to_string())
}
