use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::paths::database_file_path;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_PLAYER: &str = "mpv";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub attempts: usize,
    pub retry_delay: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(15),
            attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub player_bin: PathBuf,
    pub db_path: PathBuf,
    pub http: HttpSettings,
}

impl Config {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let db_path = match &args.db {
            Some(path) => path.clone(),
            None => database_file_path()?,
        };
        Ok(Self {
            api_base: resolve_api_base(args.api_base.as_deref()),
            player_bin: resolve_player_bin(args.player.clone()),
            db_path,
            http: HttpSettings::default(),
        })
    }
}

pub(crate) fn resolve_api_base(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(base) if !base.is_empty() => base.trim_end_matches('/').to_string(),
        _ => DEFAULT_API_BASE.to_string(),
    }
}

pub(crate) fn resolve_player_bin(value: Option<PathBuf>) -> PathBuf {
    match value {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => PathBuf::from(DEFAULT_PLAYER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_strips_trailing_slash_and_falls_back_when_blank() {
        assert_eq!(
            resolve_api_base(Some("http://localhost:8080/api/")),
            "http://localhost:8080/api"
        );
        assert_eq!(resolve_api_base(Some("   ")), DEFAULT_API_BASE);
        assert_eq!(resolve_api_base(None), DEFAULT_API_BASE);
    }

    #[test]
    fn player_bin_defaults_to_mpv_for_empty_value() {
        assert_eq!(resolve_player_bin(None), PathBuf::from("mpv"));
        assert_eq!(resolve_player_bin(Some(PathBuf::new())), PathBuf::from("mpv"));
        assert_eq!(
            resolve_player_bin(Some(PathBuf::from("/usr/bin/vlc"))),
            PathBuf::from("/usr/bin/vlc")
        );
    }
}
