//! common - 两个服务共用的请求类型与 CEP 值对象

pub mod cep;

pub use cep::*;
