//! CORS (跨域资源共享) 配置
//!
//! 默认只允许 `https://quarc.services` 跨域访问

use hyper::HeaderMap;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, HeaderValue, VARY,
};
use serde::Deserialize;

/// CORS 配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 是否启用 CORS
    pub enabled: bool,
    /// 允许的来源 (支持通配符)
    pub allowed_origins: Vec<String>,
    /// 允许的 HTTP 方法
    pub allowed_methods: Vec<String>,
    /// 允许的请求头
    pub allowed_headers: Vec<String>,
    /// 是否允许携带认证信息
    pub allow_credentials: bool,
    /// 预检请求缓存时间（秒）
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["https://quarc.services".to_string()],
            allowed_methods: vec!["DELETE".to_string()],
            allowed_headers: vec!["X-XSRFToken".to_string(), "Content-Type".to_string()],
            allow_credentials: false,
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// 创建新的 CORS 配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 禁用 CORS
    pub fn disable(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// 设置允许的来源
    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// 设置允许的方法
    pub fn allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// 设置允许的头部
    pub fn allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// 检查来源是否被允许
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if !self.enabled {
            return false;
        }

        // 如果包含通配符，允许所有来源
        if self.allowed_origins.iter().any(|o| o == "*") {
            return true;
        }

        if self.allowed_origins.iter().any(|o| o == origin) {
            return true;
        }

        // 通配符模式匹配
        for allowed in &self.allowed_origins {
            if allowed.contains('*') {
                let pattern = regex::escape(allowed).replace(r"\*", ".*");
                if let Ok(regex) = regex::Regex::new(&format!("^{}$", pattern)) {
                    if regex.is_match(origin) {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// 为响应添加 CORS 头部，来源不被允许时不做任何修改
    pub fn apply_headers(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        let Some(origin) = origin else {
            return;
        };
        if !self.is_origin_allowed(origin) {
            return;
        }

        if let Ok(value) = HeaderValue::from_str(origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            headers.insert(VARY, HeaderValue::from_static("Origin"));
        }
        if !self.allowed_headers.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&self.allowed_headers.join(",")) {
                headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, value);
            }
        }
        if !self.allowed_methods.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&self.allowed_methods.join(",")) {
                headers.insert(ACCESS_CONTROL_ALLOW_METHODS, value);
            }
        }
        if self.allow_credentials {
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
        if let Some(max_age) = self.max_age {
            headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
        }
    }
}
