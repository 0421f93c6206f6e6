use serde::{Deserialize, Serialize};

/// Substring matches only count when the contained name is longer than this.
const MIN_SUBSTRING_MATCH_LEN: usize = 3;

const CODE_KEYWORDS: &[&str] = &[
    "code", "notepad++", "sublime", "atom", "vim", "emacs", "idea", "pycharm", "webstorm",
    "clion", "rider", "typora", "obsidian",
];
const DESIGN_KEYWORDS: &[&str] = &["photoshop", "illustrator", "figma", "sketch", "blender"];
const DOCUMENT_KEYWORDS: &[&str] = &["word", "excel", "powerpoint", "wps"];
const BROWSER_KEYWORDS: &[&str] = &["chrome", "firefox", "edge", "safari"];

/// Picks which reminder template a program gets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Code,
    Document,
    Design,
    Browser,
    Other,
}

impl Category {
    /// Infers a category from an executable name.
    ///
    /// Keyword groups are checked in a fixed order (code, design, document,
    /// browser), so `vscode-word-helper` is still a code editor.
    pub fn infer(executable: &str) -> Self {
        let lower = executable.to_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if hit(CODE_KEYWORDS) {
            Category::Code
        } else if hit(DESIGN_KEYWORDS) {
            Category::Design
        } else if hit(DOCUMENT_KEYWORDS) {
            Category::Document
        } else if hit(BROWSER_KEYWORDS) {
            Category::Browser
        } else {
            Category::Other
        }
    }

    /// Key used for message templates and translations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Code => "code",
            Category::Document => "document",
            Category::Design => "design",
            Category::Browser => "browser",
            Category::Other => "default",
        }
    }
}

/// An application the user asked us to watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProgram {
    /// Lower-cased executable name; the identity used everywhere in the core.
    pub id: String,
    pub display_name: String,
    pub category: Category,
}

impl TargetProgram {
    pub fn new(executable: &str) -> Self {
        let display_name = executable.trim().to_string();
        Self {
            id: display_name.to_lowercase(),
            category: Category::infer(&display_name),
            display_name,
        }
    }

    pub fn matches(&self, process_name: &str) -> bool {
        names_match(process_name, &self.id)
    }
}

fn strip_exe(name: &str) -> &str {
    name.strip_suffix(".exe").unwrap_or(name)
}

/// Case-insensitive executable name comparison.
///
/// Names are equal when they agree ignoring a trailing `.exe`. Either name
/// containing the other also counts, provided the contained one has more than
/// three characters.
pub fn names_match(process_name: &str, target: &str) -> bool {
    let process = process_name.trim().to_lowercase();
    let target = target.trim().to_lowercase();
    if process.is_empty() || target.is_empty() {
        return false;
    }

    if strip_exe(&process) == strip_exe(&target) {
        return true;
    }

    (target.chars().count() > MIN_SUBSTRING_MATCH_LEN && process.contains(&target))
        || (process.chars().count() > MIN_SUBSTRING_MATCH_LEN && target.contains(&process))
}

/// Ordered target selection. Duplicate names collapse into the first entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    programs: Vec<TargetProgram>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for name in names {
            list.add(name.as_ref());
        }
        list
    }

    /// Appends a program; returns false for blanks and duplicates.
    /// `code` and `code.exe` are the same program.
    pub fn add(&mut self, executable: &str) -> bool {
        let program = TargetProgram::new(executable);
        if program.id.is_empty() || self.get(&program.id).is_some() {
            return false;
        }
        self.programs.push(program);
        true
    }

    /// Looks up by identifier, ignoring a trailing `.exe` on either side.
    pub fn get(&self, id: &str) -> Option<&TargetProgram> {
        let stem = strip_exe(id);
        self.programs.iter().find(|p| strip_exe(&p.id) == stem)
    }

    /// First target (in list order) that a running process name matches.
    pub fn match_process(&self, process_name: &str) -> Option<&TargetProgram> {
        self.programs.iter().find(|p| p.matches(process_name))
    }

    /// Resolves a user-typed name: exact identifier first, then fuzzy.
    pub fn resolve(&self, name: &str) -> Option<&TargetProgram> {
        let lower = name.trim().to_lowercase();
        self.get(&lower).or_else(|| self.match_process(&lower))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetProgram> {
        self.programs.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.programs.iter().map(|p| p.display_name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
