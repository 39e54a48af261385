use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::server::cors::CorsConfig;

/// 网关默认端口
pub const DEFAULT_PORT: u16 = 7575;

/// 网关监听配置
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 监听地址（同时也是证书的主体标识）
    pub ip: IpAddr,
    /// 监听端口，占用时直接失败，不尝试其他端口
    pub port: u16,
    /// 所有 GET 请求返回的页面
    pub index_path: PathBuf,
    /// 预先派生的密码凭据，None 表示不启用密码
    pub password_hash: Option<String>,
    /// TLS 证书路径
    pub cert_path: PathBuf,
    /// TLS 私钥路径
    pub key_path: PathBuf,
    /// CORS 配置
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// 创建配置
    pub fn new(ip: IpAddr, cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            ip,
            port: DEFAULT_PORT,
            index_path: PathBuf::from("index.html"),
            password_hash: None,
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            cors: CorsConfig::default(),
        }
    }

    /// 设置端口
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 设置首页文件
    pub fn with_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = path.into();
        self
    }

    /// 设置密码凭据
    pub fn with_password_hash(mut self, password_hash: Option<String>) -> Self {
        self.password_hash = password_hash;
        self
    }

    /// 设置 CORS 配置
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// 监听套接字地址
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// 浏览器访问地址
    pub fn url(&self) -> String {
        format!("https://{}", self.socket_addr())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            "certificates/127.0.0.1/quarc.crt",
            "certificates/127.0.0.1/quarc.key",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_formatting() {
        let config = GatewayConfig::default();
        assert_eq!(config.url(), "https://127.0.0.1:7575");

        let v6 = GatewayConfig::new("fe80::1".parse().unwrap(), "c", "k").with_port(8443);
        assert_eq!(v6.url(), "https://[fe80::1]:8443");
    }
}
