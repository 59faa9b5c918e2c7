//! 本地化文案模块
//!
//! 文案文件按语言存放为 `<dir>/<locale>.json`，内容按命名空间分组：
//!
//! ```json
//! { "Index": { "prompt": "...", "placeholder": "..." } }
//! ```
use crate::config::Config;
use crate::error::{ReportError, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 首页文案所在的命名空间
pub const INDEX: &str = "Index";

const BUILTIN_EN: &[(&str, &str)] = &[
    ("title", "Weekly Report Generator"),
    (
        "prompt",
        "Generate a weekly report from the following work notes, using markdown headings and lists: ",
    ),
    ("placeholder", "e.g. Fixed the login bug, reviewed two pull requests"),
    ("openaiApiKeyPlaceholder", "Your API key"),
    ("simplifierButton", "Generate"),
    ("simplifiedContent", "Your weekly report"),
];

/// 某一语言的全部文案
#[derive(Debug, Clone, Default)]
pub struct Messages {
    locale: String,
    namespaces: HashMap<String, HashMap<String, String>>,
}

impl Messages {
    /// 内置英文文案，未配置文案目录时使用
    pub fn builtin() -> Self {
        let index = BUILTIN_EN
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            locale: "en".into(),
            namespaces: HashMap::from([(INDEX.to_string(), index)]),
        }
    }

    /// 解析一份 JSON 文案
    pub fn from_json(locale: &str, json: &str) -> Result<Self> {
        let namespaces: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)
            .map_err(|e| ReportError::Messages(format!("{}: {}", locale, e)))?;
        Ok(Self {
            locale: locale.to_string(),
            namespaces,
        })
    }

    /// 从 `<dir>/<locale>.json` 加载文案
    pub fn load(dir: &Path, locale: &str) -> Result<Self> {
        if locale.is_empty() || locale.contains(['/', '\\', '.']) {
            return Err(ReportError::Messages(format!("非法的语言标识: {:?}", locale)));
        }
        let path = dir.join(format!("{}.json", locale));
        debug!("Loading messages from {}", path.display());
        let json = fs::read_to_string(&path)
            .map_err(|e| ReportError::Messages(format!("{}: {}", path.display(), e)))?;
        Self::from_json(locale, &json)
    }

    /// 按配置加载：有文案目录时读取文件，否则使用内置文案
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.messages_dir() {
            Some(dir) => Self::load(dir, config.locale()),
            None => Ok(Self::builtin()),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .map(String::as_str)
    }

    /// 取首页文案，缺失时回退为键名本身
    pub fn index<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(INDEX, key).unwrap_or_else(|| {
            warn!("Missing message {}.{} for locale {}", INDEX, key, self.locale);
            key
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_has_prompt() {
        let messages = Messages::builtin();
        assert!(messages.get(INDEX, "prompt").is_some());
        assert_eq!(messages.locale(), "en");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("zh.json"),
            r#"{"Index": {"prompt": "请根据以下内容生成周报：", "title": "周报生成器"}}"#,
        )
        .unwrap();

        let messages = Messages::load(dir.path(), "zh").unwrap();
        assert_eq!(messages.index("title"), "周报生成器");
        assert_eq!(messages.get(INDEX, "prompt"), Some("请根据以下内容生成周报："));
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let messages = Messages::from_json("en", r#"{"Index": {}}"#).unwrap();
        assert_eq!(messages.index("slogan"), "slogan");
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let result = Messages::load(dir.path(), "fr");
        assert!(matches!(result, Err(ReportError::Messages(_))));
    }

    #[test]
    fn test_rejects_path_like_locale() {
        let dir = tempdir().unwrap();
        let result = Messages::load(dir.path(), "../secrets");
        assert!(matches!(result, Err(ReportError::Messages(_))));
    }

    #[test]
    fn test_from_config_without_dir_is_builtin() {
        let messages = Messages::from_config(&Config::default()).unwrap();
        assert_eq!(messages.index("simplifierButton"), "Generate");
    }
}
