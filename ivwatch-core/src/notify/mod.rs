//! Outbound notification: the Notifier trait and its implementations.
//!
//! Delivery is fire-and-forget from the engine's point of view: failures
//! are logged by [`deliver`] and never returned to the scheduler.

pub mod console;
pub mod telegram;

pub use console::ConsoleNotifier;
pub use telegram::TelegramNotifier;

use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier transport error: {0}")]
    Transport(String),

    #[error("notifier rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("notifier output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Delivers composed alert text to a recipient.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Send once and log the outcome. Returns whether delivery succeeded.
pub fn deliver(notifier: &dyn Notifier, text: &str) -> bool {
    match notifier.send(text) {
        Ok(()) => {
            info!(notifier = notifier.name(), bytes = text.len(), "message delivered");
            true
        }
        Err(e) => {
            error!(notifier = notifier.name(), error = %e, "message delivery failed");
            false
        }
    }
}
