use chrono::{Local, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::autosave::{FocusCorrelator, FocusOutcome};
use crate::config::ReminderConfig;
use crate::models::{ReminderKind, TargetList, TargetProgram};
use crate::notify::{Bubble, HistorySink, MessageComposer, NoticeSender, Translator};
use crate::scheduler::{DueReminder, HourlyReminder};
use crate::watcher::WatchEvent;
use crate::{log_debug, log_info};

use super::state::SharedState;

const ENABLE_LOGS: bool = true;

/// Everything the loops need to turn state changes into bubbles and
/// history entries.
#[derive(Clone)]
pub(crate) struct Announcer {
    pub config: Arc<ReminderConfig>,
    pub targets: Arc<TargetList>,
    pub translator: Arc<dyn Translator>,
    pub history: Arc<dyn HistorySink>,
    pub notices: NoticeSender,
}

impl Announcer {
    fn composer(&self) -> MessageComposer<'_> {
        MessageComposer::new(&self.config, self.translator.as_ref())
    }

    fn target(&self, program: &str) -> TargetProgram {
        self.targets
            .get(program)
            .cloned()
            .unwrap_or_else(|| TargetProgram::new(program))
    }

    fn show(&self, message: String, program: Option<String>, offer_auto_save: bool) {
        self.notices.show(Bubble {
            message,
            program,
            duration: self.config.bubble_duration(),
            offer_auto_save,
        });
    }

    fn announce_starts(&self, at_startup: &[String], later: &[String]) {
        if !self.config.welcome_message_enabled {
            return;
        }
        let composer = self.composer();
        if !at_startup.is_empty() {
            let names: Vec<String> = at_startup
                .iter()
                .map(|program| self.target(program).display_name)
                .collect();
            self.show(composer.startup(&names), None, false);
        }
        for program in later {
            let target = self.target(program);
            self.show(composer.welcome(&target), Some(target.display_name), false);
        }
    }

    fn announce_reminder(&self, due: &DueReminder) {
        self.history
            .record(&due.program, ReminderKind::Save, Utc::now());
        if self.config.sound_enabled {
            self.notices.chime();
        }
        let target = self.target(&due.program);
        let message = self.composer().reminder(&target);
        self.show(message, Some(target.display_name), true);
    }

    fn announce_hour(&self, hour: u32) {
        self.history.record("", ReminderKind::Hourly, Utc::now());
        if self.config.sound_enabled {
            self.notices.chime();
        }
        let message = self.composer().hourly(hour);
        self.show(message, None, false);
    }
}

/// Applies watcher events and fires due reminders.
///
/// Events are drained in batches so one watcher tick's stops are applied
/// before its starts, and all programs found on the first scan share a
/// single startup bubble.
pub(crate) async fn scheduler_loop(
    state: SharedState,
    announcer: Announcer,
    auto_save: Arc<AtomicBool>,
    mut events: mpsc::UnboundedReceiver<WatchEvent>,
    tick: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut events_open = true;

    loop {
        tokio::select! {
            received = events.recv(), if events_open => {
                let Some(first) = received else {
                    log_info!("watch event channel closed; reminders continue for tracked programs");
                    events_open = false;
                    continue;
                };
                let mut batch = vec![first];
                while let Ok(event) = events.try_recv() {
                    batch.push(event);
                }
                apply_events(&state, &announcer, batch).await;
            }
            _ = ticker.tick() => {
                fire_due(&state, &announcer, &auto_save).await;
            }
            _ = cancel_token.cancelled() => {
                log_info!("reminder scheduler shutting down");
                break;
            }
        }
    }
}

async fn apply_events(state: &SharedState, announcer: &Announcer, batch: Vec<WatchEvent>) {
    let now = Instant::now();
    let mut at_startup: Vec<String> = Vec::new();
    let mut later: Vec<String> = Vec::new();

    {
        let mut guard = state.lock().await;
        for event in batch {
            match event {
                WatchEvent::Stopped { program } => {
                    if guard.forget(&program) {
                        log_debug!("reminder for {} cancelled", program);
                    }
                    at_startup.retain(|name| name != &program);
                    later.retain(|name| name != &program);
                }
                WatchEvent::Started {
                    instance,
                    at_startup: first_scan,
                } => {
                    let armed = guard.scheduler.on_started(
                        &instance.program,
                        instance.pid,
                        instance.started_at,
                        now,
                    );
                    if !armed {
                        continue;
                    }
                    if first_scan {
                        at_startup.push(instance.program);
                    } else {
                        later.push(instance.program);
                    }
                }
            }
        }
    }

    announcer.announce_starts(&at_startup, &later);
}

async fn fire_due(state: &SharedState, announcer: &Announcer, auto_save: &AtomicBool) {
    let due = {
        let mut guard = state.lock().await;
        let due = guard.scheduler.take_due(Instant::now());
        if auto_save.load(Ordering::SeqCst) {
            for reminder in &due {
                guard.pending.insert(&reminder.program);
            }
        }
        due
    };

    for reminder in &due {
        log_info!(
            "reminder #{} for {} (pid {})",
            reminder.fire_index,
            reminder.program,
            reminder.pid
        );
        announcer.announce_reminder(reminder);
    }
}

pub(crate) async fn focus_loop(
    correlator: Arc<Mutex<FocusCorrelator>>,
    state: SharedState,
    tick: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = correlator.lock().await.tick(&state).await;
                if outcome == FocusOutcome::Disabled {
                    log_info!("focus auto-save off; stopping focus loop");
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("focus loop shutting down");
                break;
            }
        }
    }
}

pub(crate) async fn hourly_loop(
    announcer: Announcer,
    check_every: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(check_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut hourly = HourlyReminder::starting_at(Local::now().naive_local());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(hour) = hourly.check(Local::now().naive_local()) {
                    log_info!("hourly reminder for {}:00", hour);
                    announcer.announce_hour(hour);
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("hourly reminder shutting down");
                break;
            }
        }
    }
}
