use async_trait::async_trait;
use log::{debug, log};
use std::path::Path;

use super::progress::ProgressCallback;
use super::{HttpClient, RawResponse, Transport, level};
use crate::error::Result;

/// 表单体传输 - 参数作为 urlencoded 请求体 POST 发送
pub struct FormBodyTransport {
    http: HttpClient,
}

impl FormBodyTransport {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for FormBodyTransport {
    async fn perform_get(
        &self,
        url: &str,
        pairs: &[(String, String)],
        verbose: bool,
    ) -> Result<RawResponse> {
        log!(level(verbose), "POST {} (表单, {} 个参数)", url, pairs.len());

        let request = self.http.client.post(url).form(pairs);
        self.http.execute(request, verbose).await
    }

    async fn perform_multipart_post(
        &self,
        url: &str,
        pairs: &[(String, String)],
        file_path: &Path,
        progress: Option<ProgressCallback>,
        verbose: bool,
    ) -> Result<RawResponse> {
        if progress.is_some() {
            debug!("表单体传输不支持上传进度,忽略进度回调");
        }

        self.http
            .send_multipart(url, pairs, file_path, None, verbose)
            .await
    }
}
