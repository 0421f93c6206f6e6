use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::TargetList;

use super::source::ProcessEntry;

/// A target program the watcher currently sees running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningInstance {
    pub program: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Started {
        instance: RunningInstance,
        /// Seen on the very first scan, i.e. already running when monitoring began.
        at_startup: bool,
    },
    Stopped {
        program: String,
    },
}

impl WatchEvent {
    pub fn program(&self) -> &str {
        match self {
            WatchEvent::Started { instance, .. } => &instance.program,
            WatchEvent::Stopped { program } => program,
        }
    }
}

/// Diffs successive process listings against the target list.
///
/// Only the first pid seen for a target is tracked; later processes with the
/// same name fold into that instance until every one of them is gone.
pub struct ProcessWatcher {
    targets: TargetList,
    running: HashMap<String, RunningInstance>,
    scans: u64,
}

impl ProcessWatcher {
    pub fn new(targets: TargetList) -> Self {
        Self {
            targets,
            running: HashMap::new(),
            scans: 0,
        }
    }

    /// Applies one listing. Stop events come before start events.
    pub fn scan(&mut self, processes: &[ProcessEntry], now: DateTime<Utc>) -> Vec<WatchEvent> {
        let at_startup = self.scans == 0;
        self.scans = self.scans.saturating_add(1);

        if self.targets.is_empty() {
            return Vec::new();
        }

        let mut present: HashMap<&str, u32> = HashMap::new();
        for process in processes {
            if let Some(target) = self.targets.match_process(&process.name) {
                present.entry(target.id.as_str()).or_insert(process.pid);
            }
        }

        let mut stopped: Vec<String> = self
            .running
            .keys()
            .filter(|program| !present.contains_key(program.as_str()))
            .cloned()
            .collect();
        stopped.sort();

        let mut events: Vec<WatchEvent> = Vec::with_capacity(stopped.len());
        for program in stopped {
            self.running.remove(&program);
            events.push(WatchEvent::Stopped { program });
        }

        // Start events follow target-list order.
        for target in self.targets.iter() {
            let Some(&pid) = present.get(target.id.as_str()) else {
                continue;
            };
            if self.running.contains_key(&target.id) {
                continue;
            }
            let instance = RunningInstance {
                program: target.id.clone(),
                pid,
                started_at: now,
            };
            self.running.insert(target.id.clone(), instance.clone());
            events.push(WatchEvent::Started {
                instance,
                at_startup,
            });
        }

        events
    }

    pub fn instance(&self, program: &str) -> Option<&RunningInstance> {
        self.running.get(program)
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn targets(&self) -> &TargetList {
        &self.targets
    }
}
