use rand::Rng;

/// 随机数上限(含)
pub const MAX_NONCE: u32 = 99_999_999;

/// 随机数来源 - 注入到客户端以便测试时固定 api_nonce
pub trait NonceSource: Send + Sync {
    /// 返回 `0..=MAX_NONCE` 范围内的随机数
    fn next_nonce(&self) -> u32;
}

/// 基于线程随机数生成器的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn next_nonce(&self) -> u32 {
        rand::rng().random_range(0..=MAX_NONCE)
    }
}

/// 格式化为 8 位补零的十进制字符串
pub fn format_nonce(nonce: u32) -> String {
    format!("{:08}", nonce)
}

/// 生成一个新的 api_nonce
///
/// 超出范围的值取模,保证结果总是 8 位
pub fn generate_nonce(source: &dyn NonceSource) -> String {
    format_nonce(source.next_nonce() % (MAX_NONCE + 1))
}
