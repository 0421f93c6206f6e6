use std::collections::HashMap;

use crate::models::Category;

use super::Translator;

const FALLBACK_LANGUAGE: &str = "en_US";

const EN_US: &[(&str, &str)] = &[
    ("messages.default", "Remember to save your work!"),
    ("messages.code", "Save your code before you lose it!"),
    ("messages.document", "Don't forget to save your document!"),
    ("messages.design", "Save your design work now!"),
    ("messages.browser", "Save any drafts open in your browser!"),
    ("messages.welcome", "{program} is open. Remember to save regularly!"),
    ("messages.hourly", "It's {hour}:00. Time to save your work!"),
    (
        "bubble.running_for_minutes",
        "'{program}' has been running for over {minutes} minutes",
    ),
    (
        "bubble.running_for_seconds",
        "'{program}' has been running for over {seconds} seconds",
    ),
    (
        "bubble.startup_single",
        "{programs} is already open. Remember to save your work!",
    ),
    (
        "bubble.startup_many",
        "{programs} are already open. Remember to save your work!",
    ),
    (
        "warnings.auto_save_unavailable",
        "Automatic saving is unavailable on this system and has been turned off.",
    ),
    (
        "warnings.focus_switch_failed",
        "Could not switch to {program}; sent the save shortcut to the current window.",
    ),
];

const ZH_CN: &[(&str, &str)] = &[
    ("messages.default", "记得保存您的工作！"),
    ("messages.code", "记得保存代码，避免丢失！"),
    ("messages.document", "别忘了保存文档！"),
    ("messages.design", "请及时保存设计文件！"),
    ("messages.browser", "记得保存浏览器中的草稿！"),
    ("messages.welcome", "{program} 已打开，请记得定期保存！"),
    ("messages.hourly", "整点提醒：{hour}:00，记得保存工作！"),
    (
        "bubble.running_for_minutes",
        "程序 '{program}' 已运行超过 {minutes} 分钟",
    ),
    (
        "bubble.running_for_seconds",
        "程序 '{program}' 已运行超过 {seconds} 秒",
    ),
    (
        "bubble.startup_single",
        "检测到已打开 {programs} 程序，请记得及时保存劳动成果！",
    ),
    (
        "bubble.startup_many",
        "检测到已打开 {programs} 等程序，请记得及时保存劳动成果！",
    ),
    (
        "warnings.auto_save_unavailable",
        "当前系统无法模拟按键，已关闭聚焦时自动保存。",
    ),
    (
        "warnings.focus_switch_failed",
        "无法切换到 {program}，已向当前窗口发送保存快捷键。",
    ),
];

/// Built-in string tables. Languages without a table fall back to English,
/// and unknown keys come back unchanged.
pub struct Catalog {
    language: String,
    tables: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Catalog {
    pub fn new(language: &str) -> Self {
        let mut tables = HashMap::new();
        tables.insert("en_US", EN_US.iter().copied().collect());
        tables.insert("zh_CN", ZH_CN.iter().copied().collect());
        Self {
            language: language.to_string(),
            tables,
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        [self.language.as_str(), FALLBACK_LANGUAGE]
            .iter()
            .find_map(|lang| self.tables.get(lang).and_then(|t| t.get(key)).copied())
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, category: Option<Category>) -> String {
        let found = match category {
            Some(category) => self
                .lookup(&format!("{key}.{}", category.as_str()))
                .or_else(|| self.lookup(&format!("{key}.default"))),
            None => self.lookup(key),
        };
        found.map(str::to_string).unwrap_or_else(|| key.to_string())
    }
}

/// Replaces `{name}` placeholders.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_by_category() {
        let catalog = Catalog::new("en_US");
        assert_eq!(
            catalog.translate("messages", Some(Category::Code)),
            "Save your code before you lose it!"
        );
        assert_eq!(
            catalog.translate("messages", Some(Category::Other)),
            "Remember to save your work!"
        );
    }

    #[test]
    fn test_translate_falls_back_to_english_then_key() {
        let catalog = Catalog::new("ja_JP");
        assert_eq!(
            catalog.translate("messages", Some(Category::Design)),
            "Save your design work now!"
        );
        assert_eq!(catalog.translate("missing.key", None), "missing.key");

        let zh = Catalog::new("zh_CN");
        assert_eq!(zh.translate("messages.default", None), "记得保存您的工作！");
    }

    #[test]
    fn test_fill_placeholders() {
        assert_eq!(
            fill("{program} ran {minutes}m, {program}!", &[("program", "vim"), ("minutes", "5")]),
            "vim ran 5m, vim!"
        );
        assert_eq!(fill("no vars", &[]), "no vars");
    }
}
