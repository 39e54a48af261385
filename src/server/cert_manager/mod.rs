//! 证书管理模块（基于 rcgen + rsa）
//!
//! 按主体标识（局域网 IP）签发并缓存自签名证书：
//!
//! ```text
//! <root>/
//!   <subject_id>/
//!     <cert_filename>      # PEM X.509 证书
//!     <key_filename>       # PEM 私钥
//! ```
//!
//! 两个文件同时存在即视为缓存命中，不做任何校验或过期检查；
//! 任意一个缺失都会重新生成整对文件。

pub mod certificate_info;
pub mod config;
pub mod provisioner;

pub use certificate_info::CertificateInfo;
pub use config::CertManagerConfig;
pub use provisioner::{CertificatePaths, CertificateProvisioner};
