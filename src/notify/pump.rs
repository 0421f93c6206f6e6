use std::sync::Arc;

use tokio::sync::mpsc;

use super::{Bubble, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Bubble(Bubble),
    Warning(String),
    Chime,
}

/// Producer side of the notification queue. Sends never block and a closed
/// queue (monitor shutting down) is ignored.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

pub fn notice_channel() -> (NoticeSender, NoticeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NoticeSender { tx }, rx)
}

impl NoticeSender {
    pub fn show(&self, bubble: Bubble) {
        self.send(Notice::Bubble(bubble));
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.send(Notice::Warning(message.into()));
    }

    pub fn chime(&self) {
        self.send(Notice::Chime);
    }

    fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            log::debug!("notification queue closed; dropping notice");
        }
    }
}

/// Drains the queue into the notifier until every sender is dropped.
pub async fn notification_pump(mut rx: NoticeReceiver, notifier: Arc<dyn Notifier>) {
    while let Some(notice) = rx.recv().await {
        match notice {
            Notice::Bubble(bubble) => notifier.show(bubble),
            Notice::Warning(message) => notifier.warn(&message),
            Notice::Chime => notifier.chime(),
        }
    }
    log::debug!("notification pump drained");
}
