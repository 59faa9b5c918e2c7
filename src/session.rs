//! 会话状态模块
//!
//! 输出缓冲区与加载标记属于某一个会话，而不是全局状态。每次提交都会递增会话的
//! 代数（generation），旧提交持有的 [`Submission`] 在代数变化后不再能修改状态。
use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 会话所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// 尚未提交
    #[default]
    Idle,
    /// 正在读取响应流
    Streaming,
    /// 流已结束（正常结束或失败）
    Done,
}

/// 只追加的生成文本缓冲区
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedText(String);

impl GeneratedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.0.push_str(text);
    }

    pub(crate) fn reset(&mut self) {
        self.0.clear();
    }
}

#[derive(Debug, Default)]
struct SessionState {
    text: GeneratedText,
    loading: bool,
    phase: Phase,
    error: Option<String>,
    generation: u64,
}

/// 某一时刻的会话快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub text: String,
    pub loading: bool,
    pub phase: Phase,
    pub error: Option<String>,
    pub generation: u64,
}

/// 一个页面会话
///
/// 克隆得到的是同一个会话的句柄
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 开始一次新的提交：清空缓冲区、置加载标记，并让之前的提交失效
    pub fn begin(&self) -> Submission {
        let mut state = self.lock();
        state.generation += 1;
        state.text.reset();
        state.loading = true;
        state.phase = Phase::Streaming;
        state.error = None;
        debug!("Submission {} started", state.generation);
        Submission {
            session: self.clone(),
            generation: state.generation,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            text: state.text.as_str().to_string(),
            loading: state.loading,
            phase: state.phase,
            error: state.error.clone(),
            generation: state.generation,
        }
    }

    pub fn text(&self) -> String {
        self.lock().text.as_str().to_string()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// 复制用的文本：去掉首尾空白的原始缓冲区内容
    pub fn copy_text(&self) -> String {
        self.lock().text.as_str().trim().to_string()
    }
}

/// 一次提交的凭据
///
/// 只有当前代数的提交才能修改会话
#[derive(Debug, Clone)]
pub struct Submission {
    session: Session,
    generation: u64,
}

impl Submission {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 追加文本，返回追加后的完整缓冲区；提交已过期时返回 `None`
    pub fn append(&self, text: &str) -> Option<String> {
        let mut state = self.session.lock();
        if state.generation != self.generation {
            warn!(
                "Dropping chunk from stale submission {} (current {})",
                self.generation, state.generation
            );
            return None;
        }
        state.text.push_str(text);
        Some(state.text.as_str().to_string())
    }

    /// 流正常结束，返回最终文本；提交已过期时返回 `None`
    pub fn finish(&self) -> Option<String> {
        let mut state = self.session.lock();
        if state.generation != self.generation {
            return None;
        }
        state.loading = false;
        state.phase = Phase::Done;
        Some(state.text.as_str().to_string())
    }

    /// 流失败：保留已收到的部分内容，记录原因
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        let mut state = self.session.lock();
        if state.generation != self.generation {
            return false;
        }
        state.loading = false;
        state.phase = Phase::Done;
        state.error = Some(reason.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(!snapshot.loading);
        assert!(snapshot.text.is_empty());
        assert_eq!(snapshot.generation, 0);
    }

    #[test]
    fn test_begin_resets_buffer() {
        let session = Session::new();
        let first = session.begin();
        first.append("old text");
        first.finish();

        let _second = session.begin();
        assert_eq!(session.text(), "");
        assert!(session.is_loading());
        assert_eq!(session.phase(), Phase::Streaming);
    }

    #[test]
    fn test_stale_submission_cannot_mutate() {
        let session = Session::new();
        let first = session.begin();
        first.append("A1");
        let second = session.begin();

        assert!(first.append("A2").is_none());
        assert_eq!(second.append("B1").as_deref(), Some("B1"));
        assert!(first.finish().is_none());
        assert!(!first.fail("late"));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.text, "B1");
        assert!(snapshot.loading);
        assert!(snapshot.error.is_none());
        assert_eq!(session.generation(), second.generation());
        assert_ne!(first.generation(), second.generation());
    }

    #[test]
    fn test_fail_keeps_partial_text() {
        let session = Session::new();
        let submission = session.begin();
        submission.append("partial");
        assert!(submission.fail("connection reset"));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.text, "partial");
        assert!(!snapshot.loading);
        assert_eq!(snapshot.phase, Phase::Done);
        assert_eq!(snapshot.error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let session = Session::new();
        session.begin().fail("boom");
        session.begin();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_copy_text_is_trimmed() {
        let session = Session::new();
        let submission = session.begin();
        submission.append("\n  # Report\n\ndone  \n");
        assert_eq!(session.copy_text(), "# Report\n\ndone");
    }

    #[test]
    fn test_generated_text_append_only() {
        let mut text = GeneratedText::default();
        text.push_str("ab");
        text.push_str("c");
        assert_eq!(text.as_str(), "abc");
        assert_eq!(text.len(), 3);
        text.reset();
        assert!(text.is_empty());
    }
}
