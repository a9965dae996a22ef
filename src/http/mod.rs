pub mod client;

use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

use crate::MediaApi;
use crate::dto::request::*;
use crate::dto::response::ApiResponse;
use crate::error::Result;
use crate::types::{ClientConfig, Credentials};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::gen_id::{NonceSource, RandomNonce, generate_nonce};
use crate::utils::signature;

use client::progress::{ProgressCallback, terminal_progress};
use client::{Transport, create_transport};

/// 签名 API 客户端
#[derive(Clone)]
pub struct BotrClient {
    /// API 凭证
    credentials: Credentials,
    /// 客户端配置
    config: ClientConfig,
    /// 基础 URL: `<host>/<version>`
    base_url: String,
    /// HTTP 传输实现
    transport: Arc<dyn Transport>,
    /// api_timestamp 时钟
    clock: Arc<dyn Clock>,
    /// api_nonce 随机数来源
    nonce_source: Arc<dyn NonceSource>,
    /// verbose 上传时使用的进度回调,默认输出到终端
    progress: Option<ProgressCallback>,
}

impl BotrClient {
    /// 使用默认配置(v1 版本)创建客户端
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        Self::with_config(Credentials::new(key, secret), ClientConfig::default())
    }

    /// 使用指定 API 版本创建客户端
    pub fn with_version(
        key: impl Into<String>,
        secret: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(
            Credentials::new(key, secret),
            ClientConfig::with_version(version),
        )
    }

    /// 按配置创建客户端,不产生任何网络请求
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = create_transport(&config)?;
        let base_url = config.base_url();

        debug!(
            "创建 API 客户端: {} (传输: {:?})",
            base_url, config.transport
        );

        Ok(Self {
            credentials,
            config,
            base_url,
            transport,
            clock: Arc::new(SystemClock),
            nonce_source: Arc::new(RandomNonce),
            progress: None,
        })
    }

    /// 替换传输实现
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// 替换时钟
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 替换随机数来源
    pub fn with_nonce_source(mut self, nonce_source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = nonce_source;
        self
    }

    /// 设置 verbose 上传时的进度回调
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 用客户端密钥对参数签名,参数值会被原地编码
    pub fn sign(&self, params: &mut CallParams) -> String {
        signature::sign(params, &self.credentials.secret)
    }

    /// 附加必需参数并签名
    ///
    /// 调用方提供的 api_nonce / api_timestamp / api_key 会被覆盖,
    /// api_format 只在缺省时补上。api_signature 最后加入,不参与自身计算
    pub fn build_call_parameters(&self, mut params: CallParams) -> CallParams {
        params.remove(API_SIGNATURE);

        params.insert(API_NONCE, generate_nonce(self.nonce_source.as_ref()));
        params.insert(API_TIMESTAMP, self.clock.unix_timestamp());
        params.insert(API_KEY, self.credentials.key.clone());

        if !params.contains_key(API_FORMAT) {
            params.insert(API_FORMAT, self.config.default_format.clone());
        }

        let signature = self.sign(&mut params);
        params.insert(API_SIGNATURE, signature);

        params
    }

    /// 选择进度回调: 只有 verbose 且传输支持时才上报
    fn upload_progress(&self, verbose: bool) -> Option<ProgressCallback> {
        if !verbose || !self.transport.supports_progress() {
            return None;
        }
        Some(self.progress.clone().unwrap_or_else(terminal_progress))
    }
}

#[async_trait]
impl MediaApi for BotrClient {
    async fn call(
        &self,
        api_path: &str,
        params: CallParams,
        url: Option<&str>,
        verbose: bool,
    ) -> Result<ApiResponse> {
        let target = format!("{}{}", url.unwrap_or(&self.base_url), api_path);

        let params = self.build_call_parameters(params);
        let pairs = params.to_pairs();

        if verbose {
            info!("调用 API: {}", target);
        }

        let raw = self.transport.perform_get(&target, &pairs, verbose).await?;
        Ok(ApiResponse::decode(raw.status, raw.body))
    }

    async fn upload(
        &self,
        mut params: CallParams,
        url: Option<&str>,
        file_path: &Path,
        verbose: bool,
    ) -> Result<ApiResponse> {
        let target = url.unwrap_or(&self.base_url).to_string();

        // 上传请求不签名
        if !params.contains_key(API_FORMAT) {
            params.insert(API_FORMAT, self.config.default_format.clone());
        }
        let pairs = params.to_pairs();

        if verbose {
            info!("上传文件 {} 到 {}", file_path.display(), target);
        }

        let progress = self.upload_progress(verbose);
        let raw = self
            .transport
            .perform_multipart_post(&target, &pairs, file_path, progress, verbose)
            .await?;
        Ok(ApiResponse::decode(raw.status, raw.body))
    }
}
