//! # weekly-report - 流式周报生成客户端
//!
//! 收集用户的工作记录，拼接成提示词发送到文本生成接口，并把流式返回的内容
//! 实时渲染为 Markdown。
//!
//! ## 主要特性
//!
//! - 🔄 **流式响应**：逐块读取响应体，每块都会重新渲染。
//! - 🧩 **增量解码**：跨块的多字节字符会被正确拼接，结束标记 `<|im_end|>` 会被去掉。
//! - 🧵 **会话隔离**：输出缓冲区属于会话，新的提交会让旧的响应流失效。
//! - 🔧 **灵活配置**：支持环境变量、`.env` 文件和 Builder 模式。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use weekly_report::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     let messages = Messages::from_config(&config)?;
//!     let prompt = prompt_for(&messages, FormType::Paragraph, "修复了登录问题");
//!
//!     let client = ReportClient::new(config);
//!     let session = Session::new();
//!     let mut surface = HtmlSurface::new();
//!     client.submit(&session, &mut surface, &prompt, None).await?;
//!
//!     println!("{}", surface.html());
//!     Ok(())
//! }
//! ```

// 模块定义
pub mod client;
pub mod config;
pub mod error;
pub mod i18n;
pub mod markdown;
pub mod prompt;
pub mod session;
pub mod stream;
pub mod surface;
pub mod types;

pub use client::ReportClient;
pub use config::Config;
pub use error::{ReportError, Result};
pub use session::{Session, Submission};
pub use stream::Outcome;

/// 常用类型一次性导入
pub mod prelude {
    pub use crate::client::ReportClient;
    pub use crate::config::Config;
    pub use crate::error::{ReportError, Result};
    pub use crate::i18n::Messages;
    pub use crate::prompt::{build_prompt, prompt_for};
    pub use crate::session::{Phase, Session};
    pub use crate::stream::Outcome;
    pub use crate::surface::{Frame, HtmlSurface, RenderSurface, copy_output};
    pub use crate::types::{FormType, Notice, Prompt};
}
