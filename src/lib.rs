//! # quarc_gateway
//!
//! 本地 HTTPS 笔记本网关启动器：
//!
//! 1. 派生密码凭据
//! 2. 探测本机局域网 IP
//! 3. 为该 IP 签发（或复用）自签名证书
//! 4. 打开浏览器并启动 HTTPS 监听
//!
//! ```no_run
//! use quarc_gateway::server::cert_manager::{CertManagerConfig, CertificateProvisioner};
//!
//! let provisioner = CertificateProvisioner::new(CertManagerConfig::default())?;
//! let paths = provisioner.ensure_certificate("192.168.1.50")?;
//! println!("{} {}", paths.cert_path.display(), paths.key_path.display());
//! # Ok::<(), quarc_gateway::QuarcError>(())
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod utils;

pub use config::{AppConfig, Cli};
pub use error::{QuarcError, QuarcResult};
pub use server::cert_manager::{CertManagerConfig, CertificateInfo, CertificatePaths, CertificateProvisioner};
pub use server::{GatewayConfig, GatewayServer};
