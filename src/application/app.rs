use crate::application::form::{Form, FormOutcome};
use crate::entities::{DateValue, Viewport};
use crossterm::ExecutableCommand;
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, poll,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::tty::IsTty;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout, stdout};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppResult {
    /// User finished with `q`; labelled values in form order
    Submitted(Vec<(String, DateValue)>),
    /// User cancelled with Ctrl+C or Escape
    Cancelled,
}

/// Owns the terminal while a form is on screen.
pub struct PickerApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl PickerApp {
    pub fn new() -> io::Result<Self> {
        if !IsTty::is_tty(&std::io::stdout()) {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Not running in a TTY, cannot initialize terminal interface",
            ));
        }

        enable_raw_mode().map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to enable raw mode: {}", e),
            )
        })?;

        let entered = stdout()
            .execute(EnterAlternateScreen)
            .and_then(|out| out.execute(EnableMouseCapture))
            .and_then(|out| out.execute(EnableFocusChange))
            .map(|_| ());
        if let Err(e) = entered {
            let _ = disable_raw_mode(); // Clean up on failure
            let _ = stdout().execute(LeaveAlternateScreen);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to enter alternate screen: {}", e),
            ));
        }

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).map_err(|e| {
            let _ = disable_raw_mode();
            let _ = stdout().execute(LeaveAlternateScreen);
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to create terminal: {}", e),
            )
        })?;

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Size of the screen the form is laid out in
    pub fn viewport(&self) -> io::Result<Viewport> {
        let size = self.terminal.size()?;
        Ok(Viewport::new(size.width as i32, size.height as i32))
    }

    /// Draw and feed events to `form` until it is submitted or cancelled.
    pub fn run(&mut self, form: &mut Form) -> io::Result<AppResult> {
        log::info!("Form started with {} field(s)", form.fields().len());

        let outcome = loop {
            self.terminal.draw(|frame| form.draw(frame))?;

            if !poll(POLL_INTERVAL)? {
                continue;
            }
            match form.handle_event(event::read()?) {
                FormOutcome::Continue => {}
                outcome => break outcome,
            }
        };

        self.cleanup()?;

        match outcome {
            FormOutcome::Submit => {
                log::info!("Form submitted");
                Ok(AppResult::Submitted(form.values()))
            }
            _ => {
                log::info!("Form cancelled");
                Ok(AppResult::Cancelled)
            }
        }
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        let backend = self.terminal.backend_mut();
        backend.execute(DisableFocusChange)?;
        backend.execute(DisableMouseCapture)?;
        backend.execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for PickerApp {
    fn drop(&mut self) {
        // Fallback cleanup if explicit cleanup wasn't called
        let _ = self.cleanup();
    }
}
