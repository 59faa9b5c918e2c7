//! Markdown 渲染模块
use pulldown_cmark::{Event, Options, Parser, html};

/// 渲染用的解析选项：GFM 表格、删除线、任务列表和智能标点
pub fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
}

/// 将完整缓冲区转换为 HTML
///
/// 单个换行也输出为 `<br />`；模型输出中的原始 HTML 作为文本转义
pub fn to_html(text: &str) -> String {
    let parser = Parser::new_ext(text, options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold() {
        assert!(to_html("**bold**").contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_heading_and_list() {
        let html = to_html("# Week 42\n\n- shipped\n- reviewed");
        assert!(html.contains("<h1>Week 42</h1>"));
        assert!(html.contains("<li>shipped</li>"));
    }

    #[test]
    fn test_single_newline_is_line_break() {
        let html = to_html("line one\nline two");
        assert!(html.contains("line one<br />"));
    }

    #[test]
    fn test_smart_punctuation() {
        let html = to_html("\"done\" -- mostly");
        assert!(html.contains("\u{201c}done\u{201d}"));
        assert!(html.contains('\u{2013}'));
    }

    #[test]
    fn test_table() {
        let html = to_html("| task | state |\n|---|---|\n| login | done |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>login</td>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = to_html("<script>alert(1)</script>\n\nok <b>x</b>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_html(""), "");
    }
}
