use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// One row of an OS process listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Produces process listings for the watcher. Called from a blocking worker.
pub trait ProcessSource: Send + 'static {
    /// Processes that could be read this tick. Entries that vanish or deny
    /// access mid-listing are simply left out.
    fn snapshot(&mut self) -> Vec<ProcessEntry>;
}

/// Live process table via `sysinfo`.
pub struct SysinfoSource {
    system: System,
    own_pid: u32,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            own_pid: std::process::id(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoSource {
    fn snapshot(&mut self) -> Vec<ProcessEntry> {
        // Names are always populated; nothing else is needed.
        self.system
            .refresh_processes_specifics(ProcessesToUpdate::All, ProcessRefreshKind::new());

        self.system
            .processes()
            .iter()
            .filter_map(|(pid, process)| {
                let pid = pid.as_u32();
                if pid == self.own_pid {
                    return None;
                }
                let name = process.name().to_string_lossy();
                if name.is_empty() {
                    return None;
                }
                Some(ProcessEntry::new(pid, name.into_owned()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_snapshot_excludes_self() {
        let mut source = SysinfoSource::new();
        let own = std::process::id();
        let entries = source.snapshot();
        assert!(entries.iter().all(|e| e.pid != own && !e.name.is_empty()));
    }
}
