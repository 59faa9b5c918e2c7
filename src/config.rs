//! 配置模块
use crate::error::{ReportError, Result};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ===============================================================================================
// 配置模块
// ===============================================================================================

pub const ENV_ENDPOINT: &str = "WEEKLY_REPORT_ENDPOINT";
pub const ENV_USE_USER_KEY: &str = "USE_USER_KEY";
pub const ENV_API_KEY: &str = "WEEKLY_REPORT_API_KEY";
pub const ENV_LOCALE: &str = "WEEKLY_REPORT_LOCALE";
pub const ENV_MESSAGES_DIR: &str = "WEEKLY_REPORT_MESSAGES_DIR";

const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/generate";
const DEFAULT_LOCALE: &str = "en";

/// 客户端部署配置
///
/// 支持 Builder 模式和环境变量配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 生成接口地址
    pub(crate) endpoint: String,
    /// 是否由用户提供密钥并随请求转发
    pub(crate) use_user_key: bool,
    /// 用户密钥
    pub(crate) api_key: Option<String>,
    /// 界面语言
    pub(crate) locale: String,
    /// 文案目录（`<dir>/<locale>.json`）
    pub(crate) messages_dir: Option<PathBuf>,
    /// 请求超时时间，默认不设置
    pub(crate) timeout: Option<Duration>,
    /// 连接池空闲超时时间
    pub(crate) pool_idle_timeout: Duration,
    /// 每个主机的最大空闲连接数
    pub(crate) pool_max_idle_per_host: usize,
    /// TCP Keepalive
    pub(crate) tcp_keepalive: Duration,
    /// TCP Nodelay
    pub(crate) tcp_nodelay: bool,
}

impl Default for Config {
    /// 创建默认配置
    ///
    /// 默认连接本地的生成接口，由后端自行提供密钥
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            use_user_key: false,
            api_key: None,
            locale: DEFAULT_LOCALE.into(),
            messages_dir: None,
            timeout: None,
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 16,
            tcp_keepalive: Duration::from_secs(60),
            tcp_nodelay: true,
        }
    }
}

/// 生成 Config Builder 方法的宏
///
/// 自动生成 `with_field_name` 形式的 builder 方法
macro_rules! config_builder {
    ($field:ident, $type:ty) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = $field;
                self
            }
        }
    };
    ($field:ident, $type:ty, option) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = Some($field);
                self
            }
        }
    };
}

impl Config {
    pub fn endpoint(&self) -> &str { &self.endpoint }
    pub fn use_user_key(&self) -> bool { self.use_user_key }
    pub fn api_key(&self) -> Option<&str> { self.api_key.as_deref() }
    pub fn locale(&self) -> &str { &self.locale }
    pub fn messages_dir(&self) -> Option<&Path> { self.messages_dir.as_deref() }
    pub fn timeout(&self) -> Option<Duration> { self.timeout }

    /// 从环境变量和 `.env` 文件加载配置
    ///
    /// 环境变量会覆盖 `.env` 文件中的设置
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 只从指定的 dotenv 文件读取配置，不修改进程环境变量
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let iter = dotenvy::from_path_iter(path.as_ref())
            .map_err(|e| ReportError::Config(format!("无法读取 {}: {}", path.as_ref().display(), e)))?;
        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ReportError::Config(e.to_string()))?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// 通过任意查找函数构建配置，缺失的键使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            if endpoint.trim().is_empty() {
                return Err(ReportError::Config(format!("{} 不能为空", ENV_ENDPOINT)));
            }
            config.endpoint = endpoint;
        }
        // 只有字面量 "true" 才开启
        config.use_user_key = lookup(ENV_USE_USER_KEY).is_some_and(|v| v == "true");
        config.api_key = lookup(ENV_API_KEY).filter(|k| !k.is_empty());
        if let Some(locale) = lookup(ENV_LOCALE).filter(|l| !l.is_empty()) {
            config.locale = locale;
        }
        config.messages_dir = lookup(ENV_MESSAGES_DIR)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    // 使用宏生成 builder 方法
    config_builder!(endpoint, String);
    config_builder!(use_user_key, bool);
    config_builder!(api_key, String, option);
    config_builder!(locale, String);
    config_builder!(messages_dir, PathBuf, option);
    config_builder!(timeout, Duration, option);
    config_builder!(pool_idle_timeout, Duration);
    config_builder!(pool_max_idle_per_host, usize);
    config_builder!(tcp_keepalive, Duration);
    config_builder!(tcp_nodelay, bool);
}
