use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Duration;

use crate::error::PlatformError;
use crate::models::{names_match, ReminderKind};
use crate::monitor::SharedState;
use crate::notify::i18n::fill;
use crate::notify::{HistorySink, NoticeSender, Translator};
use crate::platform::DesktopBackend;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Pause between asking the desktop to focus a window and typing into it.
pub const FOCUS_SETTLE: Duration = Duration::from_millis(500);

/// What one focus tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Focus auto-save is off for this session.
    Disabled,
    /// Nothing is waiting for a save.
    Idle,
    /// The foreground process could not be determined this tick.
    Unknown,
    /// The focused process is not pending.
    NoMatch,
    Saved(String),
    /// The keystroke failed; the program stays pending.
    SaveFailed(String),
}

/// How an explicit "save now" request was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The program already had focus.
    SavedInPlace,
    SwitchedAndSaved,
    /// Focus could not be moved; the shortcut went to whatever was focused.
    SentWithoutSwitch,
}

/// Watches which program the user is looking at and sends the save shortcut
/// when it is one with a pending reminder.
pub struct FocusCorrelator {
    backend: Arc<dyn DesktopBackend>,
    history: Arc<dyn HistorySink>,
    translator: Arc<dyn Translator>,
    notices: NoticeSender,
    auto_save: Arc<AtomicBool>,
    keystrokes_available: bool,
    settle: Duration,
}

impl FocusCorrelator {
    pub fn new(
        backend: Arc<dyn DesktopBackend>,
        history: Arc<dyn HistorySink>,
        translator: Arc<dyn Translator>,
        notices: NoticeSender,
        auto_save: Arc<AtomicBool>,
    ) -> Self {
        Self {
            backend,
            history,
            translator,
            notices,
            auto_save,
            keystrokes_available: true,
            settle: FOCUS_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn auto_save_active(&self) -> bool {
        self.auto_save.load(Ordering::SeqCst)
    }

    pub async fn tick(&mut self, state: &SharedState) -> FocusOutcome {
        if !self.auto_save_active() {
            return FocusOutcome::Disabled;
        }
        if state.lock().await.pending.is_empty() {
            return FocusOutcome::Idle;
        }

        let focused = match self.foreground().await {
            Ok(Some(name)) => name,
            Ok(None) => return FocusOutcome::Unknown,
            Err(err) if err.is_capability_missing() => {
                self.disable(state, &err).await;
                return FocusOutcome::Disabled;
            }
            Err(err) => {
                log::debug!("foreground probe failed: {err}");
                return FocusOutcome::Unknown;
            }
        };

        let Some(program) = state.lock().await.pending.find_match(&focused) else {
            return FocusOutcome::NoMatch;
        };

        match self.press_save().await {
            Ok(()) => {
                self.complete(&program, state).await;
                log_info!("auto-saved {} on focus", program);
                FocusOutcome::Saved(program)
            }
            Err(err) => {
                self.handle_save_error(state, &err).await;
                FocusOutcome::SaveFailed(program)
            }
        }
    }

    /// Saves `program` right away, bringing it to the front first when it
    /// is not already focused.
    pub async fn save_now(
        &mut self,
        program: &str,
        state: &SharedState,
    ) -> Result<SaveOutcome, PlatformError> {
        if !self.keystrokes_available {
            return Err(PlatformError::Unsupported {
                capability: "keystroke simulation",
            });
        }

        let focused = self.foreground().await.ok().flatten();
        let outcome = if focused.is_some_and(|name| names_match(&name, program)) {
            SaveOutcome::SavedInPlace
        } else {
            match self.switch_focus(program).await {
                Ok(true) => {
                    tokio::time::sleep(self.settle).await;
                    SaveOutcome::SwitchedAndSaved
                }
                Ok(false) => {
                    self.warn_switch_failed(program);
                    SaveOutcome::SentWithoutSwitch
                }
                Err(err) => {
                    log_warn!("switching focus to {} failed: {}", program, err);
                    self.warn_switch_failed(program);
                    SaveOutcome::SentWithoutSwitch
                }
            }
        };

        if let Err(err) = self.press_save().await {
            self.handle_save_error(state, &err).await;
            return Err(err);
        }
        self.complete(program, state).await;
        log_info!("saved {} on request ({:?})", program, outcome);
        Ok(outcome)
    }

    async fn complete(&self, program: &str, state: &SharedState) {
        state.lock().await.pending.remove(program);
        self.history.record(program, ReminderKind::AutoSave, Utc::now());
    }

    async fn handle_save_error(&mut self, state: &SharedState, err: &PlatformError) {
        if err.is_capability_missing() {
            self.keystrokes_available = false;
            self.disable(state, err).await;
        } else {
            log_warn!("save keystroke failed: {}", err);
        }
    }

    /// Turns focus auto-save off for the rest of the session. Warns once.
    async fn disable(&self, state: &SharedState, err: &PlatformError) {
        let was_active = self.auto_save.swap(false, Ordering::SeqCst);
        state.lock().await.pending.clear();
        if was_active {
            log_warn!("focus auto-save disabled: {}", err);
            self.notices.warn(
                self.translator
                    .translate("warnings.auto_save_unavailable", None),
            );
        }
    }

    fn warn_switch_failed(&self, program: &str) {
        let template = self
            .translator
            .translate("warnings.focus_switch_failed", None);
        self.notices.warn(fill(&template, &[("program", program)]));
    }

    async fn foreground(&self) -> Result<Option<String>, PlatformError> {
        run_blocking(&self.backend, |backend| backend.foreground_process_name()).await
    }

    async fn press_save(&self) -> Result<(), PlatformError> {
        run_blocking(&self.backend, |backend| backend.simulate_save_keystroke()).await
    }

    async fn switch_focus(&self, program: &str) -> Result<bool, PlatformError> {
        let program = program.to_string();
        run_blocking(&self.backend, move |backend| backend.switch_focus_to(&program)).await
    }
}

/// Desktop calls can block on the display server, so they run off the
/// async workers.
async fn run_blocking<T, F>(backend: &Arc<dyn DesktopBackend>, call: F) -> Result<T, PlatformError>
where
    T: Send + 'static,
    F: FnOnce(&dyn DesktopBackend) -> Result<T, PlatformError> + Send + 'static,
{
    let backend = Arc::clone(backend);
    tokio::task::spawn_blocking(move || call(backend.as_ref()))
        .await
        .unwrap_or_else(|err| Err(PlatformError::Query(format!("desktop call panicked: {err}"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrequencyMode;
    use crate::monitor::MonitorState;
    use crate::notify::{notice_channel, Catalog, Notice, NoticeReceiver, ReminderHistory};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted desktop: each probe pops the next answer, the last one sticks.
    struct FakeBackend {
        pub foreground: Mutex<VecDeque<Result<Option<String>, PlatformError>>>,
        pub save_result: Mutex<Result<(), PlatformError>>,
        pub switch_result: Result<bool, PlatformError>,
        pub saves: Mutex<u32>,
        pub switches: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn focused(name: &str) -> Self {
            Self::probes(vec![Ok(Some(name.to_string()))])
        }

        fn probes(answers: Vec<Result<Option<String>, PlatformError>>) -> Self {
            Self {
                foreground: Mutex::new(answers.into()),
                save_result: Mutex::new(Ok(())),
                switch_result: Ok(true),
                saves: Mutex::new(0),
                switches: Mutex::new(Vec::new()),
            }
        }

        fn saves(&self) -> u32 {
            *self.saves.lock().unwrap()
        }
    }

    impl DesktopBackend for FakeBackend {
        fn foreground_process_name(&self) -> Result<Option<String>, PlatformError> {
            let mut answers = self.foreground.lock().unwrap();
            if answers.len() > 1 {
                answers.pop_front().unwrap()
            } else {
                answers.front().cloned().unwrap_or(Ok(None))
            }
        }

        fn simulate_save_keystroke(&self) -> Result<(), PlatformError> {
            *self.saves.lock().unwrap() += 1;
            self.save_result.lock().unwrap().clone()
        }

        fn switch_focus_to(&self, program: &str) -> Result<bool, PlatformError> {
            self.switches.lock().unwrap().push(program.to_string());
            self.switch_result.clone()
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    struct Harness {
        correlator: FocusCorrelator,
        backend: Arc<FakeBackend>,
        history: Arc<ReminderHistory>,
        state: SharedState,
        notices: NoticeReceiver,
    }

    fn harness(backend: FakeBackend) -> Harness {
        let backend = Arc::new(backend);
        let history = Arc::new(ReminderHistory::new());
        let (tx, rx) = notice_channel();
        let correlator = FocusCorrelator::new(
            backend.clone(),
            history.clone(),
            Arc::new(Catalog::new("en_US")),
            tx,
            Arc::new(AtomicBool::new(true)),
        )
        .with_settle(Duration::ZERO);
        Harness {
            correlator,
            backend,
            history,
            state: MonitorState::shared(Duration::from_secs(10), FrequencyMode::Repeat),
            notices: rx,
        }
    }

    fn warnings(rx: &mut NoticeReceiver) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            if let Notice::Warning(text) = notice {
                out.push(text);
            }
        }
        out
    }

    #[tokio::test]
    async fn test_focus_on_pending_program_saves_once() {
        let mut h = harness(FakeBackend::focused("Editor.exe"));
        h.state.lock().await.pending.insert("editor.exe");

        let outcome = h.correlator.tick(&h.state).await;
        assert_eq!(outcome, FocusOutcome::Saved("editor.exe".into()));
        assert!(h.state.lock().await.pending.is_empty());
        assert_eq!(h.backend.saves(), 1);

        // Nothing pending any more, so no second save.
        assert_eq!(h.correlator.tick(&h.state).await, FocusOutcome::Idle);
        assert_eq!(h.backend.saves(), 1);

        let recent = h.history.recent(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, ReminderKind::AutoSave);
    }

    #[tokio::test]
    async fn test_other_program_in_focus_leaves_pending() {
        let mut h = harness(FakeBackend::focused("bash"));
        h.state.lock().await.pending.insert("editor.exe");

        assert_eq!(h.correlator.tick(&h.state).await, FocusOutcome::NoMatch);
        assert!(h.state.lock().await.pending.contains("editor.exe"));
        assert_eq!(h.backend.saves(), 0);
    }

    #[tokio::test]
    async fn test_failed_probes_change_nothing() {
        let denied = || Err(PlatformError::Query("permission denied".into()));
        let mut h = harness(FakeBackend::probes(vec![
            denied(),
            denied(),
            denied(),
            denied(),
            denied(),
            Ok(Some("editor.exe".into())),
        ]));
        h.state.lock().await.pending.insert("editor.exe");

        for _ in 0..5 {
            assert_eq!(h.correlator.tick(&h.state).await, FocusOutcome::Unknown);
            assert!(h.state.lock().await.pending.contains("editor.exe"));
        }
        assert_eq!(h.backend.saves(), 0);
        assert!(warnings(&mut h.notices).is_empty());

        assert_eq!(
            h.correlator.tick(&h.state).await,
            FocusOutcome::Saved("editor.exe".into())
        );
    }

    #[tokio::test]
    async fn test_missing_keystroke_capability_disables_with_one_warning() {
        let backend = FakeBackend::focused("code");
        *backend.save_result.lock().unwrap() = Err(PlatformError::Unsupported {
            capability: "key injection",
        });
        let mut h = harness(backend);
        h.state.lock().await.pending.insert("code");

        assert_eq!(
            h.correlator.tick(&h.state).await,
            FocusOutcome::SaveFailed("code".into())
        );
        assert!(!h.correlator.auto_save_active());
        assert!(h.state.lock().await.pending.is_empty());

        h.state.lock().await.pending.insert("code");
        assert_eq!(h.correlator.tick(&h.state).await, FocusOutcome::Disabled);
        assert!(h.correlator.save_now("code", &h.state).await.is_err());

        let warned = warnings(&mut h.notices);
        assert_eq!(
            warned,
            vec!["Automatic saving is unavailable on this system and has been turned off."]
        );
    }

    #[tokio::test]
    async fn test_transient_save_error_keeps_pending() {
        let backend = FakeBackend::focused("code");
        *backend.save_result.lock().unwrap() = Err(PlatformError::Input("busy".into()));
        let mut h = harness(backend);
        h.state.lock().await.pending.insert("code");

        assert_eq!(
            h.correlator.tick(&h.state).await,
            FocusOutcome::SaveFailed("code".into())
        );
        assert!(h.correlator.auto_save_active());
        assert!(h.state.lock().await.pending.contains("code"));

        *h.backend.save_result.lock().unwrap() = Ok(());
        assert_eq!(
            h.correlator.tick(&h.state).await,
            FocusOutcome::Saved("code".into())
        );
    }

    #[tokio::test]
    async fn test_save_now_switches_focus_first() {
        let mut h = harness(FakeBackend::focused("bash"));
        h.state.lock().await.pending.insert("figma");

        let outcome = h.correlator.save_now("figma", &h.state).await.unwrap();
        assert_eq!(outcome, SaveOutcome::SwitchedAndSaved);
        assert_eq!(*h.backend.switches.lock().unwrap(), vec!["figma".to_string()]);
        assert_eq!(h.backend.saves(), 1);
        assert!(h.state.lock().await.pending.is_empty());
    }

    #[tokio::test]
    async fn test_save_now_in_place_and_failed_switch() {
        let mut h = harness(FakeBackend::focused("figma"));
        let outcome = h.correlator.save_now("figma", &h.state).await.unwrap();
        assert_eq!(outcome, SaveOutcome::SavedInPlace);
        assert!(h.backend.switches.lock().unwrap().is_empty());

        let mut backend = FakeBackend::focused("bash");
        backend.switch_result = Ok(false);
        let mut h = harness(backend);
        let outcome = h.correlator.save_now("code", &h.state).await.unwrap();
        assert_eq!(outcome, SaveOutcome::SentWithoutSwitch);
        assert_eq!(h.backend.saves(), 1);
        assert_eq!(
            warnings(&mut h.notices),
            vec!["Could not switch to code; sent the save shortcut to the current window."]
        );
    }
}
