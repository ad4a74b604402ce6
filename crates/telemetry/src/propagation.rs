//! 追踪上下文传播
//!
//! [`TracePropagator`] 在启动时构造，显式注入到需要跨服务传播上下文的组件中，
//! 业务代码不读取全局 propagator。

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::{
    propagation::{Extractor, Injector, TextMapCompositePropagator, TextMapPropagator},
    Context,
};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// W3C Trace Context 头
pub const TRACEPARENT: &str = "traceparent";

/// 从 HTTP 头读取上下文
struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// 向 HTTP 头写入上下文
struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

/// 追踪上下文传播能力
#[derive(Clone)]
pub struct TracePropagator {
    inner: Arc<dyn TextMapPropagator + Send + Sync>,
}

impl TracePropagator {
    /// W3C Trace Context（`traceparent` / `tracestate`）
    pub fn w3c() -> Self {
        Self {
            inner: Arc::new(TraceContextPropagator::new()),
        }
    }

    /// 不传播任何上下文
    pub fn noop() -> Self {
        Self {
            inner: Arc::new(TextMapCompositePropagator::new(Vec::new())),
        }
    }

    /// 把当前 span 的上下文写入出站请求头
    pub fn inject(&self, headers: &mut HeaderMap) {
        let cx = Span::current().context();
        self.inject_context(&cx, headers);
    }

    pub fn inject_context(&self, cx: &Context, headers: &mut HeaderMap) {
        self.inner.inject_context(cx, &mut HeaderInjector(headers));
    }

    /// 从入站请求头提取上游上下文
    pub fn extract(&self, headers: &HeaderMap) -> Context {
        self.inner.extract(&HeaderExtractor(headers))
    }

    /// 把入站请求头中的上下文设为 span 的父级
    pub fn set_parent(&self, span: &Span, headers: &HeaderMap) {
        let parent = self.extract(headers);
        let _ = span.set_parent(parent);
    }

    /// 出站请求头
    pub fn outgoing_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.inject(&mut headers);
        headers
    }
}

impl fmt::Debug for TracePropagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracePropagator")
            .field("fields", &self.inner.fields().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TracePropagator {
    fn default() -> Self {
        Self::w3c()
    }
}
