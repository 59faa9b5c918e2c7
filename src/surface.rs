//! 渲染界面与复制模块
use crate::{
    error::{ReportError, Result},
    markdown,
    session::Session,
    types::Notice,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::Write;

/// 复制成功后的提示文案
pub const COPIED_MESSAGE: &str = "Chat copied to clipboard";

/// 每次缓冲区变化时交给界面的一帧
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// 当前完整的缓冲区内容
    pub text: &'a str,
    /// 本次新增的内容
    pub delta: &'a str,
    /// 是否仍在加载
    pub loading: bool,
}

impl<'a> Frame<'a> {
    pub fn new(text: &'a str, delta: &'a str, loading: bool) -> Self {
        Self { text, delta, loading }
    }

    /// 完整重新渲染整个缓冲区
    pub fn html(&self) -> String {
        markdown::to_html(self.text)
    }
}

/// 展示生成结果的界面
pub trait RenderSurface {
    fn render(&mut self, frame: &Frame<'_>);

    /// 显示一条短暂通知
    fn notify(&mut self, _notice: &Notice) {}
}

/// 在内存中保存最新 HTML 的界面
#[derive(Debug, Default)]
pub struct HtmlSurface {
    html: String,
    loading: bool,
    renders: usize,
    notices: Vec<Notice>,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

impl RenderSurface for HtmlSurface {
    fn render(&mut self, frame: &Frame<'_>) {
        self.html = frame.html();
        self.loading = frame.loading;
        self.renders += 1;
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

// ================================================================================================
// 剪贴板
// ================================================================================================

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// 内存剪贴板
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// 通过 OSC 52 转义序列写入终端剪贴板
#[derive(Debug)]
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text))
            .and_then(|_| self.out.flush())
            .map_err(|e| ReportError::Clipboard(e.to_string()))
    }
}

/// 复制去掉首尾空白的原始文本（不是 HTML），并显示确认通知
pub fn copy_output<C, R>(session: &Session, clipboard: &mut C, surface: &mut R) -> Result<String>
where
    C: Clipboard + ?Sized,
    R: RenderSurface + ?Sized,
{
    let text = session.copy_text();
    clipboard.set_text(&text)?;
    surface.notify(&Notice::info(COPIED_MESSAGE).with_icon("✂️"));
    Ok(text)
}
