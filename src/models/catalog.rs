//! Well-known applications offered for selection and used by auto-selection.

pub const COMMON_APPS: &[&str] = &[
    "notepad.exe",
    "notepad++.exe",
    "code.exe",
    "sublime_text.exe",
    "atom.exe",
    "vim.exe",
    "emacs.exe",
    "chrome.exe",
    "firefox.exe",
    "edge.exe",
    "photoshop.exe",
    "illustrator.exe",
    "figma.exe",
    "sketch.exe",
    "blender.exe",
    "word.exe",
    "excel.exe",
    "powerpoint.exe",
    "wps.exe",
    "typora.exe",
    "obsidian.exe",
    "vscode.exe",
    "idea64.exe",
    "pycharm64.exe",
    "webstorm64.exe",
    "clion64.exe",
    "rider64.exe",
];

fn stem(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Catalog entries with a running process of the same name, in catalog order.
///
/// Only exact names count here (ignoring case and `.exe`), so a helper
/// process like `code-tunnel` does not select `code.exe`.
pub fn running_common_apps<'a, I>(running: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let running: Vec<String> = running.into_iter().map(stem).collect();
    COMMON_APPS
        .iter()
        .copied()
        .filter(|app| running.contains(&stem(app)))
        .collect()
}
