//! 应用配置
//!
//! 优先级：命令行参数 > TOML 配置文件 > 默认值

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::{QuarcError, QuarcResult};
use crate::server::cert_manager::CertManagerConfig;
use crate::server::{CorsConfig, DEFAULT_PORT, GatewayConfig};

/// 命令行参数
#[derive(Debug, Default, Parser)]
#[command(name = "quarc-gateway", version, about = "本地 HTTPS 笔记本网关")]
pub struct Cli {
    /// TOML 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 监听地址，默认自动探测局域网 IP
    #[arg(long)]
    pub ip: Option<IpAddr>,

    /// 监听端口
    #[arg(long)]
    pub port: Option<u16>,

    /// 证书存储根目录
    #[arg(long)]
    pub cert_dir: Option<PathBuf>,

    /// 首页文件
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// 允许跨域访问的来源
    #[arg(long)]
    pub allow_origin: Option<String>,

    /// 预先派生的密码凭据（跳过交互式输入）
    #[arg(long)]
    pub password_hash: Option<String>,

    /// 不自动打开浏览器
    #[arg(long)]
    pub no_browser: bool,

    /// 日志级别: error, warn, info, debug, trace
    #[arg(long)]
    pub log_level: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 监听地址，None 表示自动探测
    pub ip: Option<IpAddr>,
    /// 监听端口
    pub port: u16,
    /// 首页文件
    pub index: PathBuf,
    /// 预先派生的密码凭据
    pub password_hash: Option<String>,
    /// 启动后是否打开浏览器
    pub open_browser: bool,
    /// 日志级别
    pub log_level: String,
    /// CORS 配置
    pub cors: CorsConfig,
    /// 证书配置
    pub certificates: CertManagerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ip: None,
            port: DEFAULT_PORT,
            index: PathBuf::from("index.html"),
            password_hash: None,
            open_browser: true,
            log_level: "info".to_string(),
            cors: CorsConfig::default(),
            certificates: CertManagerConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> QuarcResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> QuarcResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QuarcError::Config(format!("读取配置文件 {} 失败: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// 默认配置文件位置：`<config_dir>/quarc/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quarc").join("config.toml"))
    }

    /// 按命令行参数加载配置
    ///
    /// 显式指定的配置文件必须存在；默认位置的文件不存在时使用默认值
    pub fn load(cli: &Cli) -> QuarcResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_cli(cli);
        config.certificates.validate()?;
        Ok(config)
    }

    /// 用命令行参数覆盖配置
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ip) = cli.ip {
            self.ip = Some(ip);
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(dir) = &cli.cert_dir {
            self.certificates.root_dir = dir.clone();
        }
        if let Some(index) = &cli.index {
            self.index = index.clone();
        }
        if let Some(origin) = &cli.allow_origin {
            self.cors.allowed_origins = vec![origin.clone()];
        }
        if let Some(hash) = &cli.password_hash {
            self.password_hash = Some(hash.clone());
        }
        if cli.no_browser {
            self.open_browser = false;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
    }

    /// 生成网关监听配置
    pub fn gateway_config(
        &self,
        ip: IpAddr,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
        password_hash: Option<String>,
    ) -> GatewayConfig {
        GatewayConfig::new(ip, cert_path, key_path)
            .with_port(self.port)
            .with_index_path(self.index.clone())
            .with_password_hash(password_hash)
            .with_cors(self.cors.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 7575);
        assert!(config.open_browser);
        assert_eq!(config.cors.allowed_origins, vec!["https://quarc.services".to_string()]);
        assert_eq!(config.certificates.root_dir, PathBuf::from("certificates"));
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            ip = "10.0.0.5"
            port = 9000
            open_browser = false

            [cors]
            allowed_origins = ["https://*.example.com"]

            [certificates]
            root_dir = "/tmp/quarc-certs"
            rsa_bits = 3072
            "#,
        )
        .unwrap();

        assert_eq!(config.ip, Some("10.0.0.5".parse().unwrap()));
        assert_eq!(config.port, 9000);
        assert!(!config.open_browser);
        assert_eq!(config.cors.allowed_origins, vec!["https://*.example.com".to_string()]);
        assert_eq!(config.cors.allowed_methods, vec!["DELETE".to_string()]);
        assert_eq!(config.certificates.rsa_bits, 3072);
        assert_eq!(config.certificates.cert_filename, "quarc.crt");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("port = \"not a number\""),
            Err(QuarcError::Config(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = AppConfig::from_toml_str("port = 9000\nlog_level = \"warn\"").unwrap();
        let cli = Cli::parse_from([
            "quarc-gateway",
            "--port",
            "8443",
            "--cert-dir",
            "/srv/certs",
            "--allow-origin",
            "https://lab.example",
            "--no-browser",
        ]);
        config.apply_cli(&cli);

        assert_eq!(config.port, 8443);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.certificates.root_dir, PathBuf::from("/srv/certs"));
        assert_eq!(config.cors.allowed_origins, vec!["https://lab.example".to_string()]);
        assert!(!config.open_browser);
    }

    #[test]
    fn test_missing_explicit_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/quarc/config.toml")),
            ..Cli::default()
        };
        assert!(matches!(AppConfig::load(&cli), Err(QuarcError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = 7000\n[certificates]\nrsa_bits = 1024\n").unwrap();

        let cli = Cli {
            config: Some(path.clone()),
            ..Cli::default()
        };
        // 弱密钥配置在加载时被拒绝
        assert!(AppConfig::load(&cli).is_err());

        std::fs::write(&path, "port = 7000\n").unwrap();
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_gateway_config() {
        let config = AppConfig::default();
        let gateway = config.gateway_config("10.0.0.5".parse().unwrap(), "c.crt", "k.key", None);
        assert_eq!(gateway.url(), "https://10.0.0.5:7575");
        assert_eq!(gateway.index_path, PathBuf::from("index.html"));
    }
}
