//! 生成接口客户端模块
use crate::{
    config::Config,
    error::{ReportError, Result},
    session::Session,
    stream::{Outcome, consume},
    surface::{Frame, RenderSurface},
    types::{Notice, Prompt, RequestPayload},
};
use bytes::Bytes;
use futures::Stream;
use log::{debug, error, warn};
use reqwest::{
    Client, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::sync::Arc;

// ================================================================================================
// 核心客户端模块
// ================================================================================================

/// 周报生成客户端
///
/// 每次提交只发送一个 POST 请求，不做重试，也不限制并发提交
#[derive(Debug, Clone)]
pub struct ReportClient {
    client: Arc<Client>,
    config: Arc<Config>,
}

impl ReportClient {
    /// 创建一个新的 `ReportClient` 实例
    pub fn new(config: Config) -> Self {
        let mut builder = Client::builder()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .tcp_keepalive(config.tcp_keepalive)
            .tcp_nodelay(config.tcp_nodelay);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            error!("Failed to build reqwest client: {}", e);
            Client::new()
        });

        Self {
            client: Arc::new(client),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// 构建请求体
    ///
    /// 只有部署开启了用户密钥时才携带 `api_key`，未提供时发送空字符串，由后端校验
    pub fn payload<'a>(&self, prompt: &'a Prompt, credential: Option<&'a str>) -> RequestPayload<'a> {
        let api_key = self
            .config
            .use_user_key
            .then(|| credential.unwrap_or_default());
        RequestPayload {
            prompt: prompt.as_str(),
            api_key,
        }
    }

    /// 发送请求并返回尚未读取的响应
    ///
    /// 状态码非成功时返回 [`ReportError::Status`]
    pub async fn dispatch(&self, prompt: &Prompt, credential: Option<&str>) -> Result<Response> {
        let payload = self.payload(prompt, credential);
        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(self.build_headers())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        debug!("Generation endpoint returned {}", status);
        if status.is_success() {
            Ok(response)
        } else {
            Err(ReportError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            })
        }
    }

    /// 发送请求并返回响应体的字节块流
    pub async fn stream(
        &self,
        prompt: &Prompt,
        credential: Option<&str>,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>>> {
        Ok(self.dispatch(prompt, credential).await?.bytes_stream())
    }

    /// 完整的一次提交：重置会话、发送请求、消费响应流
    ///
    /// 传输失败时清除加载标记并发出错误通知，然后返回该错误
    pub async fn submit<R>(
        &self,
        session: &Session,
        surface: &mut R,
        prompt: &Prompt,
        credential: Option<&str>,
    ) -> Result<Outcome>
    where
        R: RenderSurface + ?Sized,
    {
        let submission = session.begin();
        surface.render(&Frame::new("", "", true));

        match self.stream(prompt, credential).await {
            Ok(body) => consume(body, &submission, surface).await,
            Err(e) => {
                warn!("Submission {} failed: {}", submission.generation(), e);
                if !submission.fail(e.to_string()) {
                    return Ok(Outcome::Superseded);
                }
                surface.notify(&Notice::error(e.to_string()));
                surface.render(&Frame::new("", "", false));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_prompt;

    #[test]
    fn test_payload_without_user_key_ignores_credential() {
        let client = ReportClient::new(Config::default());
        let prompt = build_prompt("T:", "x");
        let payload = client.payload(&prompt, Some("sk-ignored"));
        assert_eq!(payload.prompt, "T:x");
        assert!(payload.api_key.is_none());
    }

    #[test]
    fn test_payload_with_user_key() {
        let client = ReportClient::new(Config::default().with_use_user_key(true));
        let prompt = build_prompt("T:", "x");
        let payload = client.payload(&prompt, Some("sk-1"));
        assert_eq!(payload.api_key, Some("sk-1"));
    }

    #[test]
    fn test_payload_sends_empty_key_when_enabled_but_missing() {
        let client = ReportClient::new(Config::default().with_use_user_key(true));
        let prompt = build_prompt("T:", "x");
        assert_eq!(client.payload(&prompt, None).api_key, Some(""));
        assert_eq!(client.payload(&prompt, Some("")).api_key, Some(""));
    }
}
