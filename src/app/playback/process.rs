use std::process::{Command as ProcessCommand, ExitStatus};

use anyhow::{Context, Result};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

#[cfg(unix)]
fn set_disposition(signum: libc::c_int, handler: libc::sighandler_t) -> Result<libc::sigaction> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler;
        libc::sigemptyset(&mut action.sa_mask);

        let mut previous: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(signum, &action, &mut previous) != 0 {
            return Err(std::io::Error::last_os_error())
                .with_context(|| format!("failed to change disposition of signal {signum}"));
        }
        Ok(previous)
    }
}

/// Parent-side state while a player owns the terminal. Dropping it gives the
/// terminal back and restores SIGINT/SIGTTOU in that order.
#[cfg(unix)]
struct PlayerSession {
    tty_fd: libc::c_int,
    own_pgrp: libc::pid_t,
    player_has_tty: bool,
    saved: Vec<(libc::c_int, libc::sigaction)>,
}

#[cfg(unix)]
impl PlayerSession {
    fn begin(tty_fd: libc::c_int, own_pgrp: libc::pid_t) -> Result<Self> {
        let mut session = Self {
            tty_fd,
            own_pgrp,
            player_has_tty: false,
            saved: Vec::with_capacity(2),
        };
        for signum in [libc::SIGINT, libc::SIGTTOU] {
            let previous = set_disposition(signum, libc::SIG_IGN)?;
            session.saved.push((signum, previous));
        }
        Ok(session)
    }

    fn hand_tty_to(&mut self, pgrp: libc::pid_t) {
        self.player_has_tty = unsafe { libc::tcsetpgrp(self.tty_fd, pgrp) == 0 };
    }
}

#[cfg(unix)]
impl Drop for PlayerSession {
    fn drop(&mut self) {
        unsafe {
            if self.player_has_tty {
                let _ = libc::tcsetpgrp(self.tty_fd, self.own_pgrp);
            }
            for (signum, previous) in self.saved.drain(..).rev() {
                let _ = libc::sigaction(signum, &previous, std::ptr::null_mut());
            }
        }
    }
}

/// Runs the player in its own process group in the terminal foreground, so
/// Ctrl-C stops playback without taking dramawatch down with it. Without a
/// controlling terminal only SIGINT is ignored on this side.
#[cfg(unix)]
pub(crate) fn run_in_foreground(mut cmd: ProcessCommand) -> Result<ExitStatus> {
    let tty_fd = libc::STDIN_FILENO;
    let own_pgrp = unsafe { libc::tcgetpgrp(tty_fd) };
    if own_pgrp == -1 {
        let previous = set_disposition(libc::SIGINT, libc::SIG_IGN)?;
        unsafe {
            cmd.pre_exec(|| {
                libc::signal(libc::SIGINT, libc::SIG_DFL);
                Ok(())
            });
        }
        let status = cmd.status().context("failed to launch player");
        unsafe {
            let _ = libc::sigaction(libc::SIGINT, &previous, std::ptr::null_mut());
        }
        return status;
    }

    let mut session = PlayerSession::begin(tty_fd, own_pgrp)?;
    unsafe {
        cmd.pre_exec(|| {
            for signum in [libc::SIGINT, libc::SIGQUIT, libc::SIGTSTP, libc::SIGTTOU] {
                libc::signal(signum, libc::SIG_DFL);
            }
            if libc::setpgid(0, 0) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let mut child = cmd.spawn().context("failed to spawn player")?;
    session.hand_tty_to(child.id() as libc::pid_t);
    child.wait().context("failed waiting on player")
}

#[cfg(not(unix))]
pub(crate) fn run_in_foreground(mut cmd: ProcessCommand) -> Result<ExitStatus> {
    cmd.status().context("failed to launch player")
}
