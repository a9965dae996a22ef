use std::fmt;
use std::time::Duration;

/// 默认 API 主机
pub const DEFAULT_HOST: &str = "http://api.bitsontherun.com";

/// 默认 API 版本
pub const DEFAULT_VERSION: &str = "v1";

/// 未指定 api_format 时请求的响应格式
pub const DEFAULT_FORMAT: &str = "native";

/// API 凭证 - 客户端整个生命周期内不可变
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// 公钥,作为 api_key 发送
    pub key: String,
    /// 共享密钥,只参与签名,从不发送
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// 传输实现类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// GET 请求,参数放在 URL 查询串中,支持上传进度
    #[default]
    Query,
    /// 参数作为 urlencoded 请求体发送,不支持上传进度
    FormBody,
}

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API 主机(协议 + 主机名)
    pub host: String,
    /// API 版本段
    pub version: String,
    /// 默认响应格式
    pub default_format: String,
    /// 传输实现
    pub transport: TransportKind,
    /// 请求超时时间,None 表示不限制
    pub timeout: Option<Duration>,
    /// User-Agent 请求头
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            version: DEFAULT_VERSION.to_string(),
            default_format: DEFAULT_FORMAT.to_string(),
            transport: TransportKind::default(),
            timeout: None,
            user_agent: format!("botr-api/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// 使用指定 API 版本的默认配置
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    /// 基础 URL: `<host>/<version>`
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), self.version)
    }
}
