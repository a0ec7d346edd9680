//! Terminal setup with RAII restoration.
//!
//! [`Tui`] enables raw mode (and optionally the alternate screen) on
//! creation and restores the terminal on drop, so the exit summary always
//! prints into a usable shell. [`install_panic_hook`] covers the panic
//! path the same way.

use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

/// Restore the terminal before the panic message prints, then delegate to
/// the previous hook. Call once, before the first [`Tui::new`].
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        previous(info);
    }));
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    alt_screen: bool,
    restored: bool,
}

impl Tui {
    /// Put the terminal into raw mode and hide the cursor. With
    /// `alt_screen` the whole UI lives in the alternate buffer and the
    /// scrollback survives; without it we draw over the current screen.
    ///
    /// # Errors
    /// Returns an error if terminal setup fails; partial setup is undone
    /// first.
    pub fn new(alt_screen: bool) -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        let setup = if alt_screen {
            execute!(stdout, EnterAlternateScreen, Hide)
        } else {
            execute!(stdout, Hide)
        };
        if let Err(err) = setup {
            let _ = disable_raw_mode();
            return Err(err);
        }

        let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = restore_terminal(alt_screen);
                return Err(err);
            }
        };

        if !alt_screen {
            if let Err(err) = terminal.clear() {
                let _ = restore_terminal(alt_screen);
                return Err(err);
            }
        }

        Ok(Self {
            terminal,
            alt_screen,
            restored: false,
        })
    }

    /// Render one frame.
    ///
    /// # Errors
    /// Returns an error if drawing to the backend fails.
    pub fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Put the terminal back into its normal state. Drop does the same,
    /// but going through here surfaces errors and lets the caller print
    /// to a clean screen right after.
    ///
    /// # Errors
    /// Returns an error if restoration fails.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        restore_terminal(self.alt_screen)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if !self.restored {
            // Ignore errors: we may be unwinding and the terminal may
            // already be gone.
            let _ = restore_terminal(self.alt_screen);
        }
    }
}

fn restore_terminal(alt_screen: bool) -> io::Result<()> {
    if alt_screen {
        execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    } else {
        execute!(io::stdout(), Show)?;
    }
    disable_raw_mode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tui_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Tui>();
    }

    #[test]
    fn panic_hook_chains_without_panicking() {
        install_panic_hook();
        install_panic_hook();
    }
}
