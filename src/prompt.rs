//! 提示词构建模块
use crate::i18n::{INDEX, Messages};
use crate::types::{FormType, Prompt};

/// 拼接模板与用户输入
///
/// 原样拼接，不做校验、转义或长度限制
pub fn build_prompt(template: &str, text: &str) -> Prompt {
    let mut prompt = String::with_capacity(template.len() + text.len());
    prompt.push_str(template);
    prompt.push_str(text);
    Prompt::new(prompt)
}

/// 按表单模式选择模板
///
/// 提纲模式优先使用 `outlinePrompt`，文案缺失时回退到 `prompt`
pub fn template_for(messages: &Messages, form: FormType) -> &str {
    match form {
        FormType::Paragraph => messages.index("prompt"),
        FormType::Outline => messages
            .get(INDEX, "outlinePrompt")
            .unwrap_or_else(|| messages.index("prompt")),
    }
}

/// 直接由文案、表单模式和用户输入构建提示词
pub fn prompt_for(messages: &Messages, form: FormType, text: &str) -> Prompt {
    build_prompt(template_for(messages, form), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_is_verbatim() {
        let prompt = build_prompt("Summarize: ", "  <b>raw</b>\n");
        assert_eq!(prompt.as_str(), "Summarize:   <b>raw</b>\n");
    }

    #[test]
    fn test_build_prompt_empty_parts() {
        assert_eq!(build_prompt("", "").as_str(), "");
        assert_eq!(build_prompt("T:", "").as_str(), "T:");
    }

    #[test]
    fn test_outline_falls_back_to_prompt() {
        let messages = Messages::from_json("en", r#"{"Index": {"prompt": "P:"}}"#).unwrap();
        assert_eq!(template_for(&messages, FormType::Outline), "P:");
        assert_eq!(prompt_for(&messages, FormType::Paragraph, "x").as_str(), "P:x");
    }

    #[test]
    fn test_builtin_modes_share_prompt() {
        let messages = Messages::builtin();
        assert_eq!(
            template_for(&messages, FormType::Outline),
            template_for(&messages, FormType::Paragraph)
        );
    }

    #[test]
    fn test_outline_uses_own_template() {
        let messages = Messages::from_json(
            "en",
            r#"{"Index": {"prompt": "P:", "outlinePrompt": "O:"}}"#,
        )
        .unwrap();
        assert_eq!(prompt_for(&messages, FormType::Outline, "x").as_str(), "O:x");
    }
}
