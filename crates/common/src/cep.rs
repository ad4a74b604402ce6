//! CEP 值对象
//!
//! 巴西邮政编码：恰好 8 个 ASCII 数字，不做任何规范化（带连字符的 `01310-100` 直接拒绝）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 入站请求体 `{"cep": "..."}`
///
/// 缺少 `cep` 字段时视为空字符串，交由格式校验返回 422；
/// 字段类型错误（例如数字）属于解析失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CepRequest {
    #[serde(default)]
    pub cep: String,
}

impl CepRequest {
    /// 从原始请求体解析
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// 校验并转换为 [`Cep`]
    pub fn validate(&self) -> Result<Cep, CepError> {
        Cep::new(self.cep.as_str())
    }
}

/// 已校验的 CEP
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cep(String);

impl Cep {
    /// 创建 CEP，格式不合法时返回错误
    pub fn new(cep: impl Into<String>) -> Result<Self, CepError> {
        let cep = cep.into();
        if !Self::is_valid(&cep) {
            return Err(CepError::InvalidFormat(cep));
        }
        Ok(Self(cep))
    }

    /// 长度恰好为 8 且每个字符都在 '0'..='9' 之间
    pub fn is_valid(cep: &str) -> bool {
        cep.len() == 8 && cep.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Cep> for CepRequest {
    fn from(cep: Cep) -> Self {
        Self { cep: cep.0 }
    }
}

/// CEP 错误
#[derive(Debug, thiserror::Error)]
pub enum CepError {
    #[error("invalid zipcode: {0:?}")]
    InvalidFormat(String),
}
