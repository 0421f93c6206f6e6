use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::autosave::{FocusCorrelator, SaveOutcome};
use crate::config::ReminderConfig;
use crate::error::{ConfigError, PlatformError};
use crate::models::TargetList;
use crate::notify::{notice_channel, notification_pump, HistorySink, Notifier, Translator};
use crate::platform::DesktopBackend;
use crate::watcher::{watch_loop, ProcessSource, ProcessWatcher};

use super::loops::{focus_loop, hourly_loop, scheduler_loop, Announcer};
use super::state::{MonitorState, SharedState};

/// Loop cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub process_poll: Duration,
    pub focus_poll: Duration,
    pub reminder_tick: Duration,
    pub hourly_check: Duration,
    /// Log a scan summary every N watcher scans; 0 turns it off.
    pub log_every_scans: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            process_poll: Duration::from_secs(2),
            focus_poll: Duration::from_secs(1),
            reminder_tick: Duration::from_millis(250),
            hourly_check: Duration::from_secs(30),
            log_every_scans: 30,
        }
    }
}

impl Timing {
    /// Defaults, with `SAVEGUARD_DEBUG=1` logging every watcher scan.
    pub fn from_env() -> Self {
        let debug_mode = std::env::var("SAVEGUARD_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            log_every_scans: if debug_mode { 1 } else { 30 },
            ..Self::default()
        }
    }
}

/// Inputs to [`Monitor::start`].
pub struct MonitorContext {
    pub config: ReminderConfig,
    pub targets: TargetList,
    pub notifier: Arc<dyn Notifier>,
    pub history: Arc<dyn HistorySink>,
    pub translator: Arc<dyn Translator>,
    pub backend: Arc<dyn DesktopBackend>,
    pub timing: Timing,
}

/// A running monitoring session: watcher, scheduler, focus and hourly
/// loops plus the notification pump.
pub struct Monitor {
    state: SharedState,
    targets: Arc<TargetList>,
    correlator: Arc<Mutex<FocusCorrelator>>,
    auto_save: Arc<AtomicBool>,
    cancel_token: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    pump: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Spawns every loop on the current tokio runtime.
    pub fn start(ctx: MonitorContext, source: Box<dyn ProcessSource>) -> Result<Self, ConfigError> {
        ctx.config.validate()?;

        let MonitorContext {
            config,
            targets,
            notifier,
            history,
            translator,
            backend,
            timing,
        } = ctx;

        let config = Arc::new(config);
        let targets = Arc::new(targets);
        let state = MonitorState::shared(config.interval(), config.frequency);
        let auto_save = Arc::new(AtomicBool::new(config.focus_auto_save_enabled));
        let cancel_token = CancellationToken::new();

        let (notices, notice_rx) = notice_channel();
        let pump = tokio::spawn(notification_pump(notice_rx, notifier));

        log::info!(
            "monitoring {} program(s) with {} backend, reminder every {:?}",
            targets.len(),
            backend.name(),
            config.interval()
        );

        let correlator = Arc::new(Mutex::new(FocusCorrelator::new(
            backend,
            Arc::clone(&history),
            Arc::clone(&translator),
            notices.clone(),
            Arc::clone(&auto_save),
        )));

        let announcer = Announcer {
            config: Arc::clone(&config),
            targets: Arc::clone(&targets),
            translator,
            history,
            notices,
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut tasks = Vec::new();

        tasks.push((
            "watcher",
            tokio::spawn(watch_loop(
                ProcessWatcher::new(targets.as_ref().clone()),
                source,
                event_tx,
                timing.process_poll,
                timing.log_every_scans,
                cancel_token.clone(),
            )),
        ));

        tasks.push((
            "scheduler",
            tokio::spawn(scheduler_loop(
                Arc::clone(&state),
                announcer.clone(),
                Arc::clone(&auto_save),
                event_rx,
                timing.reminder_tick,
                cancel_token.clone(),
            )),
        ));

        if config.focus_auto_save_enabled {
            tasks.push((
                "focus",
                tokio::spawn(focus_loop(
                    Arc::clone(&correlator),
                    Arc::clone(&state),
                    timing.focus_poll,
                    cancel_token.clone(),
                )),
            ));
        }

        if config.hourly_reminder_enabled {
            tasks.push((
                "hourly",
                tokio::spawn(hourly_loop(
                    announcer,
                    timing.hourly_check,
                    cancel_token.clone(),
                )),
            ));
        }

        Ok(Self {
            state,
            targets,
            correlator,
            auto_save,
            cancel_token,
            tasks,
            pump: Some(pump),
        })
    }

    /// Saves a program now on behalf of its reminder bubble.
    pub async fn save_now(&self, program: &str) -> Result<SaveOutcome, PlatformError> {
        let id = self.resolve(program);
        self.correlator.lock().await.save_now(&id, &self.state).await
    }

    /// Drops a program's pending save without saving.
    pub async fn dismiss(&self, program: &str) -> bool {
        let id = self.resolve(program);
        self.state.lock().await.pending.remove(&id)
    }

    pub async fn pending(&self) -> Vec<String> {
        self.state.lock().await.pending.to_vec()
    }

    /// Programs with an active reminder entry, sorted.
    pub async fn running(&self) -> Vec<String> {
        self.state.lock().await.scheduler.programs()
    }

    pub fn auto_save_active(&self) -> bool {
        self.auto_save.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> &TargetList {
        &self.targets
    }

    /// Stops every loop, clears timers and pending saves, then waits for
    /// queued notifications to be delivered. Every task is joined even when
    /// one of them panicked; the first failure is returned afterwards.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel_token.cancel();

        let mut first_error: Option<anyhow::Error> = None;
        for (name, handle) in self.tasks.drain(..) {
            if let Err(err) = handle.await {
                log::error!("{name} loop failed: {err}");
                if first_error.is_none() {
                    first_error =
                        Some(anyhow::Error::new(err).context(format!("{name} loop panicked")));
                }
            }
        }

        self.state.lock().await.clear();

        // The correlator holds the last notice sender; the pump finishes once
        // it is gone.
        drop(self.correlator);
        if let Some(pump) = self.pump.take() {
            if let Err(err) = pump.await {
                log::error!("notification pump failed: {err}");
                if first_error.is_none() {
                    first_error =
                        Some(anyhow::Error::new(err).context("notification pump panicked"));
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                log::info!("monitor stopped");
                Ok(())
            }
        }
    }

    fn resolve(&self, program: &str) -> String {
        self.targets
            .resolve(program)
            .map(|target| target.id.clone())
            .unwrap_or_else(|| program.to_lowercase())
    }
}
