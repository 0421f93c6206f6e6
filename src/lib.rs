pub mod autosave;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod platform;
pub mod scheduler;
pub mod settings;
pub mod utils;
pub mod watcher;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use cli::{Cli, Commands};
use models::catalog::{running_common_apps, COMMON_APPS};
use monitor::{Monitor, MonitorContext, Timing};
use notify::{Catalog, LogNotifier, ReminderHistory};
use settings::SettingsStore;
use watcher::{ProcessSource, SysinfoSource};

/// History entries echoed to the log on exit.
const HISTORY_ON_EXIT: usize = 10;

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let path = match cli.config {
        Some(path) => path,
        None => SettingsStore::default_path()?,
    };

    match cli.command.unwrap_or(Commands::Run {
        programs: Vec::new(),
    }) {
        Commands::Run { programs } => {
            let store = SettingsStore::new(path)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start the async runtime")?;
            runtime.block_on(run_monitor(store, programs))
        }
        Commands::Apps => {
            let running = running_process_names();
            let found = running_common_apps(running.iter().map(String::as_str));
            for app in COMMON_APPS {
                let marker = if found.contains(app) { "running" } else { "-" };
                println!("{app:<24} {marker}");
            }
            Ok(())
        }
        Commands::Config => {
            let store = SettingsStore::new(path)?;
            println!("# {}", store.path().display());
            println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
            Ok(())
        }
    }
}

async fn run_monitor(store: SettingsStore, extra_programs: Vec<String>) -> Result<()> {
    log::info!("SaveGuard starting up...");

    let settings = store.snapshot();
    let mut targets = settings.targets();
    for program in &extra_programs {
        targets.add(program);
    }

    if settings.reminder.auto_select_apps {
        let running = tokio::task::spawn_blocking(running_process_names)
            .await
            .context("Process listing worker failed")?;
        let found = running_common_apps(running.iter().map(String::as_str));
        let added = store.add_target_programs(&found)?;
        for app in &found {
            targets.add(app);
        }
        if added > 0 {
            log::info!("Auto-selected {added} running application(s): {found:?}");
        }
    }

    if targets.is_empty() {
        log::warn!(
            "No programs selected; pass --program or edit {}",
            store.path().display()
        );
    }

    let history = Arc::new(ReminderHistory::new());
    let ctx = MonitorContext {
        translator: Arc::new(Catalog::new(&settings.reminder.language)),
        config: settings.reminder,
        targets,
        notifier: Arc::new(LogNotifier::new()),
        history: history.clone(),
        backend: platform::native_backend(),
        timing: Timing::from_env(),
    };

    let monitor = Monitor::start(ctx, Box::new(SysinfoSource::new()))?;
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    log::info!("Shutting down...");
    monitor.shutdown().await?;

    for entry in history.recent(HISTORY_ON_EXIT) {
        log::info!(
            "{} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.kind.as_str(),
            entry.program
        );
    }
    Ok(())
}

fn running_process_names() -> Vec<String> {
    SysinfoSource::new()
        .snapshot()
        .into_iter()
        .map(|process| process.name)
        .collect()
}
