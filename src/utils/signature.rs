// file_path: src/utils/signature.rs
use sha1::{Digest, Sha1};

use crate::dto::request::{CallParams, ParamValue};

/// 百分号编码单个参数值
///
/// 保留字符集为 `A-Z a-z 0-9 - . _ ~`,其余字节按 UTF-8 编码为大写 `%XX`
pub fn encode_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// 构造签名基础串
///
/// 按键升序拼接 `key=value`,以 `&` 分隔
pub fn signature_base_string(params: &CallParams) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<String>>()
        .join("&")
}

/// 计算参数签名
///
/// 先将所有值原地替换为编码后的文本,再计算
/// `SHA1(基础串 + secret)` 的小写十六进制摘要。
/// 这不是 HMAC,密钥直接追加在基础串之后
pub fn sign(params: &mut CallParams, secret: &str) -> String {
    for value in params.values_mut() {
        let encoded = encode_value(&value.to_string());
        *value = ParamValue::Str(encoded);
    }

    let sbs = signature_base_string(params);

    let mut hasher = Sha1::new();
    hasher.update(sbs.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
