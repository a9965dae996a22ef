use std::time::{SystemTime, UNIX_EPOCH};

/// 时钟 - 提供 api_timestamp 使用的 Unix 时间(秒)
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> i64;
}

/// 读取系统时间的默认时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        // 系统时间早于纪元时按 0 处理
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}
