pub mod dto;
pub mod error;
pub mod http;
pub mod types;
pub mod utils;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::dto::request::CallParams;
use crate::dto::response::ApiResponse;
use crate::error::Result;
use crate::types::{ClientConfig, Credentials};

pub use crate::http::BotrClient;

/// 媒体 API 特性 - 定义签名调用与文件上传的核心接口
#[async_trait]
pub trait MediaApi: Sync + Send {
    /// 执行一次签名的 API 调用
    ///
    /// # 参数
    /// * `api_path` - API 路径,例如 `/videos/show`,直接拼接在基础 URL 之后
    /// * `params` - 调用参数
    /// * `url` - 可选的基础 URL,替代客户端默认地址
    /// * `verbose` - 是否输出传输诊断日志
    ///
    /// # 返回
    /// * `Result<ApiResponse>` - 解码后的响应(非 JSON 时为原始字节)或连接错误
    async fn call(
        &self,
        api_path: &str,
        params: CallParams,
        url: Option<&str>,
        verbose: bool,
    ) -> Result<ApiResponse>;

    /// 上传文件(不签名)
    ///
    /// # 参数
    /// * `params` - 上传参数,通常来自 `/videos/create` 返回的上传令牌
    /// * `url` - 可选的上传地址,替代客户端默认地址
    /// * `file_path` - 要上传的文件
    /// * `verbose` - 是否输出传输诊断日志并上报进度
    ///
    /// # 返回
    /// * `Result<ApiResponse>` - 解码后的响应或错误
    async fn upload(
        &self,
        params: CallParams,
        url: Option<&str>,
        file_path: &Path,
        verbose: bool,
    ) -> Result<ApiResponse>;
}

/// 创建 API 客户端实例
///
/// # 参数
/// * `credentials` - API 凭证
/// * `config` - 客户端配置
///
/// # 返回
/// * `Result<Arc<dyn MediaApi>>` - 客户端实例或错误
pub fn create_client(credentials: Credentials, config: ClientConfig) -> Result<Arc<dyn MediaApi>> {
    Ok(Arc::new(BotrClient::with_config(credentials, config)?))
}
