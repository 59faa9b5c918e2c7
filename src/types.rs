//! 数据结构模块

use serde::{Deserialize, Serialize};
use std::fmt;

// ================================================================================================
// 请求结构
// ================================================================================================

/// 提示词
///
/// 由模板与用户输入拼接而成，构造后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    pub(crate) fn new(text: String) -> Self {
        Prompt(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 请求体
///
/// 只在构造请求期间存在；`api_key` 为空时整个字段不出现在 JSON 中
#[derive(Debug, Serialize)]
pub struct RequestPayload<'a> {
    /// 提示词
    pub prompt: &'a str,
    /// 用户提供的密钥
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
}

/// 表单模式，决定使用哪一个提示模板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormType {
    /// 段落式周报
    #[default]
    #[serde(rename = "paragraphForm")]
    Paragraph,
    /// 提纲式周报
    #[serde(rename = "outlineForm")]
    Outline,
}

// ================================================================================================
// 界面提示
// ================================================================================================

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// 短暂显示的通知（toast）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub icon: Option<&'static str>,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            icon: None,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            icon: None,
            message: message.into(),
        }
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.icon {
            Some(icon) => write!(f, "{} {}", icon, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_omits_missing_key() {
        let payload = RequestPayload {
            prompt: "hi",
            api_key: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "prompt": "hi" }));
    }

    #[test]
    fn test_payload_with_key() {
        let payload = RequestPayload {
            prompt: "hi",
            api_key: Some("sk-1"),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "prompt": "hi", "api_key": "sk-1" }));
    }

    #[test]
    fn test_form_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&FormType::Paragraph).unwrap(),
            "\"paragraphForm\""
        );
        let form: FormType = serde_json::from_str("\"outlineForm\"").unwrap();
        assert_eq!(form, FormType::Outline);
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::info("Chat copied to clipboard").with_icon("✂️");
        assert_eq!(notice.to_string(), "✂️ Chat copied to clipboard");
    }
}
