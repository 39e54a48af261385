//! 请求处理
//!
//! - `OPTIONS *`：CORS 预检
//! - `POST /login`：密码校验
//! - `GET`/`HEAD` 任意路径：返回首页
//! - 其他方法：405

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue, ORIGIN};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;

use crate::auth::passwd_check;
use crate::server::cors::CorsConfig;
use crate::utils::logger::{debug, warn};

/// 登录请求体大小上限
const MAX_LOGIN_BODY: usize = 64 * 1024;

/// 请求处理共享状态（启动后只读）
#[derive(Debug, Clone)]
pub struct GatewayState {
    /// 首页文件
    pub index_path: PathBuf,
    /// 密码凭据
    pub password_hash: Option<String>,
    /// CORS 配置
    pub cors: CorsConfig,
}

/// 处理单个请求
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<GatewayState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let origin = req
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    debug!("📥 {} {}", req.method(), req.uri().path());

    let mut response = match (req.method(), req.uri().path()) {
        (&Method::OPTIONS, _) => empty(StatusCode::NO_CONTENT),
        (&Method::POST, "/login") => login(req, &state).await,
        (&Method::GET, _) => index(&state, true).await,
        (&Method::HEAD, _) => index(&state, false).await,
        _ => text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
    };

    state.cors.apply_headers(origin.as_deref(), response.headers_mut());
    Ok(response)
}

async fn index(state: &GatewayState, with_body: bool) -> Response<Full<Bytes>> {
    match tokio::fs::read(&state.index_path).await {
        Ok(content) => {
            let length = content.len();
            let body = if with_body { Bytes::from(content) } else { Bytes::new() };
            let mut response = Response::new(Full::new(body));
            let headers = response.headers_mut();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
            // HEAD 响应不带正文，但长度与 GET 保持一致
            headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
            response
        }
        Err(e) => {
            warn!("⚠️  无法读取首页 {}: {}", state.index_path.display(), e);
            text(StatusCode::NOT_FOUND, "Not Found")
        }
    }
}

async fn login<B>(req: Request<B>, state: &GatewayState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    let body = match Limited::new(req.into_body(), MAX_LOGIN_BODY).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("⚠️  读取登录请求体失败: {}", e);
            return text(StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let Some(hashed) = state.password_hash.as_deref() else {
        return json_response(StatusCode::OK, true);
    };

    let password = if is_json {
        password_from_json(&body)
    } else {
        password_from_form(&body)
    };

    match password {
        Some(password) if passwd_check(hashed, &password) => json_response(StatusCode::OK, true),
        _ => json_response(StatusCode::FORBIDDEN, false),
    }
}

/// 从 `application/x-www-form-urlencoded` 请求体中取出 password 字段
pub(crate) fn password_from_form(body: &[u8]) -> Option<String> {
    let body = std::str::from_utf8(body).ok()?;
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "password" {
            return None;
        }
        urlencoding::decode(&value.replace('+', " "))
            .ok()
            .map(|v| v.into_owned())
    })
}

fn password_from_json(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("password")?.as_str().map(str::to_string)
}

fn json_response(status: StatusCode, authenticated: bool) -> Response<Full<Bytes>> {
    let body = json!({ "authenticated": authenticated }).to_string();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn text(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
