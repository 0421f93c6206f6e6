use std::collections::BTreeSet;

use crate::models::names_match;

/// Programs owed an automatic save, by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSaveSet {
    programs: BTreeSet<String>,
}

impl PendingSaveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, program: &str) -> bool {
        self.programs.insert(program.to_string())
    }

    pub fn remove(&mut self, program: &str) -> bool {
        self.programs.remove(program)
    }

    pub fn contains(&self, program: &str) -> bool {
        self.programs.contains(program)
    }

    /// Pending program the focused process belongs to, if any.
    pub fn find_match(&self, focused_process: &str) -> Option<String> {
        self.programs
            .iter()
            .find(|program| names_match(focused_process, program))
            .cloned()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.programs.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn clear(&mut self) {
        self.programs.clear();
    }
}
