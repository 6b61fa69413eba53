use std::io;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Raw-mode alternate screen that can be handed to the player and taken back.
pub(super) struct TerminalGuard {
    raw: bool,
}

impl TerminalGuard {
    pub(super) fn enter() -> Result<Self> {
        let mut guard = Self { raw: false };
        guard.activate()?;
        Ok(guard)
    }

    fn activate(&mut self) -> Result<()> {
        if self.raw {
            return Ok(());
        }
        execute!(io::stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;
        enable_raw_mode().context("failed to enable raw mode")?;
        self.raw = true;
        Ok(())
    }

    fn deactivate(&mut self) -> Result<()> {
        if !self.raw {
            return Ok(());
        }
        disable_raw_mode().context("failed to disable raw mode")?;
        execute!(io::stdout(), LeaveAlternateScreen).context("failed to leave alternate screen")?;
        self.raw = false;
        Ok(())
    }

    /// Runs `f` on the plain terminal, restoring the TUI afterwards even if `f` fails.
    pub(super) fn paused<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        self.deactivate()?;
        let result = f();
        self.activate()?;
        Ok(result)
    }

    pub(super) fn leave(mut self) -> Result<()> {
        self.deactivate()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}
