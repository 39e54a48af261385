//! 基于 rustls 的 TLS 配置
//!
//! 使用 rustls + ring 作为加密后端，从 PEM 文件加载证书与私钥

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::ServerConfig;
use rustls::pki_types::CertificateDer;
use rustls_pemfile::{certs, private_key};

use crate::error::{QuarcError, QuarcResult};
use crate::utils::crypto_provider::ensure_crypto_provider_installed;
use crate::utils::logger::debug;

/// 从证书与私钥文件创建服务端 TLS 配置
///
/// 不启用客户端证书认证，ALPN 同时支持 HTTP/2 和 HTTP/1.1
pub fn load_server_config(cert_path: &Path, key_path: &Path) -> QuarcResult<Arc<ServerConfig>> {
    ensure_crypto_provider_installed();

    let cert_file = File::open(cert_path)
        .map_err(|e| QuarcError::Tls(format!("打开证书文件失败 {}: {}", cert_path.display(), e)))?;
    let mut cert_reader = BufReader::new(cert_file);
    let cert_chain: Vec<CertificateDer<'static>> = certs(&mut cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| QuarcError::Tls(format!("解析证书失败: {}", e)))?;

    if cert_chain.is_empty() {
        return Err(QuarcError::Tls(format!("证书为空: {}", cert_path.display())));
    }

    let key_file = File::open(key_path)
        .map_err(|e| QuarcError::Tls(format!("打开私钥文件失败 {}: {}", key_path.display(), e)))?;
    let mut key_reader = BufReader::new(key_file);
    let key = private_key(&mut key_reader)
        .map_err(|e| QuarcError::Tls(format!("解析私钥失败: {}", e)))?
        .ok_or_else(|| QuarcError::Tls(format!("私钥文件为空: {}", key_path.display())))?;

    let mut server_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key)?;

    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    debug!("🔐 TLS 配置已加载: {}", cert_path.display());
    Ok(Arc::new(server_config))
}
