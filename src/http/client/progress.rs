use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// 上传进度快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    /// 已上传字节数
    pub uploaded: u64,
    /// 总字节数
    pub total: u64,
}

impl UploadProgress {
    /// 上传百分比,总字节数为 0 时返回 0
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.uploaded as f64 * 100.0 / self.total as f64
    }
}

/// 进度回调
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// 在终端同一行刷新上传百分比(写入 stderr)
pub fn terminal_progress() -> ProgressCallback {
    Arc::new(|progress: UploadProgress| {
        let mut stderr = std::io::stderr().lock();
        // ESC[2K 清除整行, ESC[G 回到行首
        let _ = write!(stderr, "\x1b[2K\x1b[GUploaded: {:.2}%", progress.percent());
        let _ = stderr.flush();
    })
}

/// 包装读取流,每读出一个分片就上报一次进度
pub fn progress_stream<R>(
    reader: R,
    total: u64,
    callback: ProgressCallback,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static
where
    R: AsyncRead + Send + 'static,
{
    let mut uploaded = 0u64;

    ReaderStream::new(reader).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            uploaded += bytes.len() as u64;
            callback(UploadProgress { uploaded, total });
        }
        chunk
    })
}
