use async_trait::async_trait;
use log::log;
use std::path::Path;

use super::progress::ProgressCallback;
use super::{HttpClient, RawResponse, Transport, level};
use crate::error::Result;

/// 查询串传输 - 参数附加在 URL 上,通过 GET 调用
pub struct QueryTransport {
    http: HttpClient,
}

impl QueryTransport {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for QueryTransport {
    async fn perform_get(
        &self,
        url: &str,
        pairs: &[(String, String)],
        verbose: bool,
    ) -> Result<RawResponse> {
        log!(level(verbose), "GET {} ({} 个参数)", url, pairs.len());

        let request = self.http.client.get(url).query(pairs);
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
        self.http
            .send_multipart(url, pairs, file_path, progress, verbose)
            .await
    }

    fn supports_progress(&self) -> bool {
        true
    }
}
