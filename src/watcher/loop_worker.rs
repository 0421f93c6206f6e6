use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::diff::{ProcessWatcher, WatchEvent};
use super::source::ProcessSource;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// Polls `source` every `poll_interval` and forwards watcher events in
/// order. Exits when cancelled or when the receiving side is gone.
pub async fn watch_loop(
    mut watcher: ProcessWatcher,
    source: Box<dyn ProcessSource>,
    events: mpsc::UnboundedSender<WatchEvent>,
    poll_interval: Duration,
    log_every_scans: u64,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Shared with the blocking worker so a listing that panics leaves the
    // source in place for the next tick.
    let source = Arc::new(Mutex::new(source));

    log_info!(
        "process watcher started for {} target(s), polling every {:?}",
        watcher.targets().len(),
        poll_interval
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let current = Arc::clone(&source);

                // Enumeration touches every process on the box; keep it off the runtime threads.
                let listing = tokio::task::spawn_blocking(move || {
                    let entries = current
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .snapshot();
                    entries
                })
                .await;

                let entries = match listing {
                    Ok(entries) => entries,
                    Err(err) => {
                        log_error!("process listing worker failed, skipping scan: {err}");
                        continue;
                    }
                };

                let scan_events = watcher.scan(&entries, Utc::now());
                if log_every_scans > 0 && (watcher.scans() - 1) % log_every_scans == 0 {
                    log_debug!(
                        "scan #{}: {} processes, {} target(s) running",
                        watcher.scans(),
                        entries.len(),
                        watcher.running_count()
                    );
                }

                for event in scan_events {
                    match &event {
                        WatchEvent::Started { instance, .. } => {
                            log_info!("{} started (pid {})", instance.program, instance.pid)
                        }
                        WatchEvent::Stopped { program } => log_info!("{program} stopped"),
                    }
                    if events.send(event).is_err() {
                        log_info!("watch event receiver dropped; stopping watcher");
                        return;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("process watcher shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetList;
    use crate::watcher::ProcessEntry;
    use std::sync::{Arc, Mutex};

    struct ScriptedSource {
        listing: Arc<Mutex<Vec<ProcessEntry>>>,
    }

    impl ProcessSource for ScriptedSource {
        fn snapshot(&mut self) -> Vec<ProcessEntry> {
            self.listing.lock().unwrap().clone()
        }
    }

    /// Panics on its first listing, then reports `editor.exe`.
    struct FlakySource {
        calls: u32,
    }

    impl ProcessSource for FlakySource {
        fn snapshot(&mut self) -> Vec<ProcessEntry> {
            self.calls += 1;
            if self.calls == 1 {
                panic!("process table read failed");
            }
            vec![ProcessEntry::new(1, "editor.exe")]
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_loop_survives_panicking_listing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let watcher = ProcessWatcher::new(TargetList::from_names(["editor.exe"]));

        let handle = tokio::spawn(watch_loop(
            watcher,
            Box::new(FlakySource { calls: 0 }),
            tx,
            Duration::from_secs(2),
            0,
            token.clone(),
        ));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.program(), "editor.exe");
        assert!(!handle.is_finished());

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_loop_emits_and_cancels() {
        let listing = Arc::new(Mutex::new(vec![ProcessEntry::new(1, "editor.exe")]));
        let source = Box::new(ScriptedSource {
            listing: Arc::clone(&listing),
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let watcher = ProcessWatcher::new(TargetList::from_names(["editor.exe"]));

        let handle = tokio::spawn(watch_loop(
            watcher,
            source,
            tx,
            Duration::from_secs(2),
            0,
            token.clone(),
        ));

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, WatchEvent::Started { at_startup: true, .. }));

        listing.lock().unwrap().clear();
        let second = rx.recv().await.unwrap();
        assert_eq!(
            second,
            WatchEvent::Stopped {
                program: "editor.exe".into()
            }
        );

        token.cancel();
        handle.await.unwrap();
    }
}
