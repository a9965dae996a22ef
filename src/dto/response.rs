use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// 响应体 - 能解析则为 JSON 结构,否则保留原始字节
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Parsed(Value),
    Raw(Bytes),
}

/// API 调用的响应
///
/// 非 2xx 状态码不会被当作错误:API 把错误详情放在响应体里,
/// 调用方通过 `status` 或 `api_status()` 判断结果
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 响应体
    pub body: ResponseBody,
}

impl ApiResponse {
    /// 解码响应字节,解析失败时原样返回字节,从不报错
    pub fn decode(status: u16, bytes: Bytes) -> Self {
        let body = match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => ResponseBody::Parsed(value),
            Err(_) => ResponseBody::Raw(bytes),
        };

        Self { status, body }
    }

    /// HTTP 状态码是否为 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.body, ResponseBody::Parsed(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Parsed(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Parsed(_) => None,
            ResponseBody::Raw(bytes) => Some(bytes),
        }
    }

    /// 响应体中的 `status` 字段,例如 "ok" 或 "error"
    pub fn api_status(&self) -> Option<&str> {
        self.value()?.get("status")?.as_str()
    }

    /// 将已解析的响应体转换为具体类型
    ///
    /// 原始字节会再尝试一次反序列化,失败时返回解码错误
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let typed = match self.body {
            ResponseBody::Parsed(value) => serde_json::from_value(value)?,
            ResponseBody::Raw(bytes) => serde_json::from_slice(&bytes)?,
        };
        Ok(typed)
    }
}
