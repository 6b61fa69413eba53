mod process;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command as ProcessCommand, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

use self::process::run_in_foreground;

#[derive(Debug, Clone)]
pub(crate) struct PlaybackRequest {
    pub(crate) url: String,
    pub(crate) title: String,
}

#[derive(Debug, Clone)]
pub(crate) struct PlaybackOutcome {
    pub(crate) success: bool,
    pub(crate) failure_detail: Option<String>,
}

/// External video player standing in for the page's `<video>` element.
#[derive(Debug, Clone)]
pub(crate) struct Player {
    bin: PathBuf,
}

impl Player {
    pub(crate) fn new(bin: PathBuf) -> Self {
        Self { bin }
    }

    pub(crate) fn play(&self, request: &PlaybackRequest) -> Result<PlaybackOutcome> {
        let args = player_args(&self.bin, request);
        debug!(player = %self.bin.display(), url = %request.url, "launching player");

        let mut cmd = ProcessCommand::new(&self.bin);
        cmd.args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        let status = run_in_foreground(cmd)
            .with_context(|| format!("failed to launch {}", self.bin.display()))?;

        Ok(PlaybackOutcome {
            success: status.success(),
            failure_detail: (!status.success()).then(|| format!("player exited with {status}")),
        })
    }
}

pub(crate) fn player_args(bin: &Path, request: &PlaybackRequest) -> Vec<OsString> {
    let mut args = Vec::new();
    let is_mpv = bin
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.eq_ignore_ascii_case("mpv"));
    if is_mpv && !request.title.is_empty() {
        args.push(OsString::from(format!(
            "--force-media-title={}",
            request.title
        )));
    }
    args.push(OsString::from(&request.url));
    args
}
