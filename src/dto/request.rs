use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// 签名时附加的随机数参数
pub const API_NONCE: &str = "api_nonce";
/// 调用时间戳参数
pub const API_TIMESTAMP: &str = "api_timestamp";
/// 公钥参数
pub const API_KEY: &str = "api_key";
/// 响应格式参数
pub const API_FORMAT: &str = "api_format";
/// 签名参数,总是最后添加
pub const API_SIGNATURE: &str = "api_signature";

/// 单个调用参数的值
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => f.write_str(&format_float(*v)),
            ParamValue::Bool(true) => f.write_str("True"),
            ParamValue::Bool(false) => f.write_str("False"),
        }
    }
}

/// 按 API 期望的文本形式格式化浮点数
///
/// 十进制指数在 `-4..16` 内用定点形式且至少保留一位小数(`1.0`),
/// 否则用两位以上指数的科学计数法(`1e+16`, `1.5e-05`)
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // `{:e}` 给出最短可往返的尾数
    let sci = format!("{:e}", v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if (-4..16).contains(&exp) {
        let fixed = v.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_uint {
    ($($t:ty),*) => {
        $(
            // 超出 i64 范围的值按原文本保存,签名文本不变
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    match i64::try_from(value) {
                        Ok(v) => ParamValue::Int(v),
                        Err(_) => ParamValue::Str(value.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_wide_uint!(u64, usize);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// 一次 API 调用的参数集合
///
/// 按键的字典序(字节序)迭代,签名基础串直接依赖这个顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallParams {
    inner: BTreeMap<String, ParamValue>,
}

impl CallParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入参数,返回被替换的旧值
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.inner.insert(key.into(), value.into())
    }

    /// 构建器风格的插入
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.inner.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.inner.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.inner.iter()
    }

    pub(crate) fn values_mut(&mut self) -> btree_map::ValuesMut<'_, String, ParamValue> {
        self.inner.values_mut()
    }

    /// 转换为文本键值对,用于查询串或表单编码
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.inner
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for CallParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = CallParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<'a> IntoIterator for &'a CallParams {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
