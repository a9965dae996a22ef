mod form_client;
pub mod progress;
mod query_client;

pub use form_client::FormBodyTransport;
pub use query_client::QueryTransport;

use async_trait::async_trait;
use bytes::Bytes;
use log::{Level, debug, log, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, ClientBuilder, RequestBuilder};
use std::path::Path;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::error::{BotrError, Result};
use crate::types::{ClientConfig, TransportKind};
use progress::{ProgressCallback, progress_stream};

/// 上传文件所在的表单字段名
pub const FILE_FIELD: &str = "file";

/// 原始 HTTP 响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 响应体字节
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输特性 - 客户端依赖的 HTTP 能力集合
#[async_trait]
pub trait Transport: Send + Sync {
    /// 执行一次 API 调用
    ///
    /// # 参数
    /// * `url` - 完整的目标地址(不含查询串)
    /// * `pairs` - 已签名的参数
    /// * `verbose` - 是否输出传输诊断日志
    ///
    /// # 返回
    /// * `Result<RawResponse>` - 任意状态码的响应,或连接错误
    async fn perform_get(
        &self,
        url: &str,
        pairs: &[(String, String)],
        verbose: bool,
    ) -> Result<RawResponse>;

    /// 执行一次 multipart 上传
    ///
    /// # 参数
    /// * `url` - 上传地址
    /// * `pairs` - 同时作为查询串和表单字段发送的参数
    /// * `file_path` - 作为 `file` 字段上传的文件
    /// * `progress` - 可选的进度回调
    /// * `verbose` - 是否输出传输诊断日志
    async fn perform_multipart_post(
        &self,
        url: &str,
        pairs: &[(String, String)],
        file_path: &Path,
        progress: Option<ProgressCallback>,
        verbose: bool,
    ) -> Result<RawResponse>;

    /// 是否支持上传进度回调
    fn supports_progress(&self) -> bool {
        false
    }
}

/// HTTP 客户端 - 所有传输实现共享的 reqwest 客户端
#[derive(Clone)]
pub struct HttpClient {
    pub client: Client,
}

impl HttpClient {
    /// 按配置创建 HTTP 客户端
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new().user_agent(config.user_agent.clone());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| BotrError::NetworkError(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self { client })
    }

    /// 发送请求并读取完整响应体
    ///
    /// 非 2xx 响应照常返回,API 把错误详情放在响应体里
    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        verbose: bool,
    ) -> Result<RawResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| BotrError::NetworkError(format!("API 请求失败: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BotrError::NetworkError(format!("读取响应数据失败: {}", e)))?;

        let raw = RawResponse {
            status: status.as_u16(),
            body,
        };

        if raw.is_success() {
            log!(level(verbose), "响应状态: {}, {} 字节", status, raw.body.len());
        } else {
            warn!("API 返回错误状态: {}, {} 字节", status, raw.body.len());
        }

        Ok(raw)
    }

    /// 构造上传请求并发送
    ///
    /// 参数同时出现在查询串和表单字段中,文件放在 `file` 字段
    pub(crate) async fn send_multipart(
        &self,
        url: &str,
        pairs: &[(String, String)],
        file_path: &Path,
        progress: Option<ProgressCallback>,
        verbose: bool,
    ) -> Result<RawResponse> {
        let form = build_upload_form(pairs, file_path, progress).await?;

        log!(level(verbose), "POST {} (上传 {})", url, file_path.display());

        let request = self.client.post(url).query(pairs).multipart(form);
        self.execute(request, verbose).await
    }
}

/// verbose 时将诊断日志提升到 info 级别
pub(crate) fn level(verbose: bool) -> Level {
    if verbose { Level::Info } else { Level::Debug }
}

/// 构造上传表单
async fn build_upload_form(
    pairs: &[(String, String)],
    file_path: &Path,
    progress: Option<ProgressCallback>,
) -> Result<Form> {
    let file = tokio::fs::File::open(file_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BotrError::FileNotFound(file_path.display().to_string())
        } else {
            BotrError::IoError(e)
        }
    })?;
    let total = file.metadata().await?.len();

    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FILE_FIELD.to_string());
    let mime_type = mime_guess::from_path(file_path).first_or_octet_stream();

    debug!("上传文件: {} ({} 字节, {})", file_name, total, mime_type);

    let body = match progress {
        Some(callback) => Body::wrap_stream(progress_stream(file, total, callback)),
        None => Body::wrap_stream(ReaderStream::new(file)),
    };

    let part = Part::stream_with_length(body, total)
        .file_name(file_name)
        .mime_str(mime_type.as_ref())?;

    let form = pairs
        .iter()
        .fold(Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()))
        .part(FILE_FIELD, part);

    Ok(form)
}

/// 按传输实现类型创建传输实例
///
/// # 参数
/// * `config` - 客户端配置
///
/// # 返回
/// * `Result<Arc<dyn Transport>>` - 传输实例或错误
pub fn create_transport(config: &ClientConfig) -> Result<Arc<dyn Transport>> {
    let http_client = HttpClient::new(config)?;

    match config.transport {
        TransportKind::Query => Ok(Arc::new(QueryTransport::new(http_client))),
        TransportKind::FormBody => Ok(Arc::new(FormBodyTransport::new(http_client))),
    }
}
