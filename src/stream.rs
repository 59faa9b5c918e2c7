//! 流式响应处理模块
//!
//! 响应体是一串原始字节块。每个块先经过增量 UTF-8 解码（跨块的多字节字符会被缓存
//! 到下一块再拼接），再去掉模型输出的结束标记 `<|im_end|>`，最后按到达顺序追加到
//! 会话的输出缓冲区。
use crate::{
    error::{ReportError, Result},
    session::Submission,
    surface::{Frame, RenderSurface},
    types::Notice,
};
use async_stream::try_stream;
use bytes::{Buf, Bytes, BytesMut};
use futures::{Stream, StreamExt};
use log::{debug, warn};

// ================================================================================================
// 解码
// ================================================================================================

/// 上游模型输出的回合结束标记
pub const SENTINEL: &str = "<|im_end|>";

/// 增量 UTF-8 解码器
///
/// 不完整的尾部字节会留到下一块；真正非法的字节替换为 U+FFFD
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: BytesMut,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解码一个字节块，返回本次可以确定的文本
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.advance(valid + invalid);
                        }
                        // 尾部是被截断的多字节序列，等待下一块
                        None => {
                            self.pending.advance(valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// 流结束时调用；残留的不完整序列输出为一个 U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        debug!("Leftover bytes at end of stream: {:?}", &self.pending[..]);
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }
}

/// 结束标记过滤器
///
/// 删除所有出现的 [`SENTINEL`]，并暂存末尾可能是半个标记的文本
#[derive(Debug, Default)]
pub struct SentinelFilter {
    pending: String,
}

impl SentinelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输入一段文本，返回可以安全输出的部分
    pub fn push(&mut self, text: &str) -> String {
        self.pending.push_str(text);
        // 删除后两侧可能拼出新的标记，所以重复直到没有为止
        while let Some(pos) = self.pending.find(SENTINEL) {
            self.pending.replace_range(pos..pos + SENTINEL.len(), "");
        }
        let split = self.pending.len() - partial_sentinel_len(&self.pending);
        let held = self.pending.split_off(split);
        std::mem::replace(&mut self.pending, held)
    }

    /// 流结束时输出暂存的文本
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }
}

/// 文本末尾与标记前缀重合的最大长度（不含完整标记）
fn partial_sentinel_len(text: &str) -> usize {
    (1..SENTINEL.len())
        .rev()
        .find(|&n| text.ends_with(&SENTINEL[..n]))
        .unwrap_or(0)
}

/// 字节块到干净文本的完整解码管线
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    utf8: Utf8Decoder,
    sentinel: SentinelFilter,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> String {
        let text = self.utf8.decode(chunk);
        self.sentinel.push(&text)
    }

    pub fn finish(&mut self) -> String {
        let tail = self.utf8.finish();
        let mut out = self.sentinel.push(&tail);
        out.push_str(&self.sentinel.finish());
        out
    }
}

// ================================================================================================
// 流消费
// ================================================================================================

/// 一次提交的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 流正常结束，携带最终文本
    Completed(String),
    /// 读取过程中有新的提交开始，本次提交被放弃
    Superseded,
}

/// 将字节块流转换为干净文本增量的流
///
/// 空增量不会产出；流结束或读取失败时都会先冲刷解码器中暂存的内容
pub fn text_stream<S, E>(chunks: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<ReportError>,
{
    try_stream! {
        futures::pin_mut!(chunks);
        let mut decoder = ChunkDecoder::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    let tail = decoder.finish();
                    if !tail.is_empty() {
                        yield tail;
                    }
                    Err::<Bytes, ReportError>(e.into())?
                }
            };
            debug!("Received chunk of {} bytes", chunk.len());
            let text = decoder.feed(&chunk);
            if !text.is_empty() {
                yield text;
            }
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            yield tail;
        }
    }
}

/// 读取响应流直到结束，每收到一块就追加到会话并重新渲染
///
/// 读取失败时保留已收到的内容，清除加载标记并发出错误通知，然后返回该错误。
/// 提交过期后立即停止读取。
///
/// 整块都被暂存的字节块（例如单独的 `<` 或半个多字节字符）不会触发渲染，
/// 暂存内容会随下一块或流结束一起输出。
pub async fn consume<S, E, R>(chunks: S, submission: &Submission, surface: &mut R) -> Result<Outcome>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<ReportError>,
    R: RenderSurface + ?Sized,
{
    let deltas = text_stream(chunks);
    futures::pin_mut!(deltas);

    while let Some(item) = deltas.next().await {
        match item {
            Ok(delta) => match submission.append(&delta) {
                Some(text) => surface.render(&Frame::new(&text, &delta, true)),
                None => return Ok(Outcome::Superseded),
            },
            Err(e) => {
                warn!("Stream for submission {} failed: {}", submission.generation(), e);
                if !submission.fail(e.to_string()) {
                    return Ok(Outcome::Superseded);
                }
                let text = submission.session().text();
                surface.notify(&Notice::error(e.to_string()));
                surface.render(&Frame::new(&text, "", false));
                return Err(e);
            }
        }
    }

    match submission.finish() {
        Some(text) => {
            debug!(
                "Submission {} finished with {} bytes",
                submission.generation(),
                text.len()
            );
            surface.render(&Frame::new(&text, "", false));
            Ok(Outcome::Completed(text))
        }
        None => Ok(Outcome::Superseded),
    }
}
