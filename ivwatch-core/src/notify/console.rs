//! Console notifier — prints the message instead of sending it.
//!
//! Used for `--dry-run` and whenever Telegram credentials are not configured.

use super::{Notifier, NotifyError};
use std::io::Write;
use std::sync::Mutex;

pub struct ConsoleNotifier<W: Write + Send = std::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleNotifier {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(out, "Message that would have been sent:\n{text}")?;
        out.flush()?;
        Ok(())
    }
}
