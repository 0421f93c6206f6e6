use super::{Bubble, Notifier};

/// Notifier for headless runs: every bubble becomes a log line.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn show(&self, bubble: Bubble) {
        let action = if bubble.offer_auto_save {
            " [save now available]"
        } else {
            ""
        };
        match bubble.program.as_deref() {
            Some(program) => log::info!(
                "[{program}] {}{action} ({}ms)",
                bubble.message.replace('\n', " | "),
                bubble.duration.as_millis()
            ),
            None => log::info!(
                "{}{action} ({}ms)",
                bubble.message.replace('\n', " | "),
                bubble.duration.as_millis()
            ),
        }
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn chime(&self) {
        log::debug!("reminder chime");
    }
}
