//! 自签名证书签发与缓存
//!
//! 每个主体标识对应一对证书与私钥文件；首次请求时生成，之后直接复用。
//! 该流程是同步阻塞的，只在启动阶段、监听器绑定之前调用一次，
//! 同一主体的并发首次调用之间没有加锁。

use std::fs;
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use rand::Rng;
use rcgen::{Certificate, CertificateParams, KeyPair, SanType, SerialNumber, PKCS_RSA_SHA256};
use rsa::RsaPrivateKey;
use rsa::pkcs8::EncodePrivateKey;
use tempfile::NamedTempFile;

use crate::error::{QuarcError, QuarcResult};
use crate::server::cert_manager::CertManagerConfig;
use crate::utils::logger::{debug, info};

/// 证书与私钥的文件路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePaths {
    /// PEM 证书路径
    pub cert_path: PathBuf,
    /// PEM 私钥路径
    pub key_path: PathBuf,
    /// 本次调用是否新生成了证书
    pub generated: bool,
}

/// 自签名证书签发器
#[derive(Debug, Clone)]
pub struct CertificateProvisioner {
    config: CertManagerConfig,
}

impl CertificateProvisioner {
    /// 创建签发器，配置无效时返回错误
    pub fn new(config: CertManagerConfig) -> QuarcResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 计算主体对应的证书与私钥路径（不访问文件系统）
    pub fn paths_for(&self, subject_id: &str) -> QuarcResult<CertificatePaths> {
        validate_subject_id(subject_id)?;
        let subject_dir = self.config.root_dir.join(subject_id);
        Ok(CertificatePaths {
            cert_path: subject_dir.join(&self.config.cert_filename),
            key_path: subject_dir.join(&self.config.key_filename),
            generated: false,
        })
    }

    /// 证书与私钥是否都已存在
    pub fn is_provisioned(&self, subject_id: &str) -> QuarcResult<bool> {
        let paths = self.paths_for(subject_id)?;
        Ok(paths.cert_path.exists() && paths.key_path.exists())
    }

    /// 确保主体拥有可用的证书与私钥
    ///
    /// 两个文件都存在时直接返回路径，不做任何加密运算；
    /// 否则重新生成整对文件，绝不复用残留的单个文件。
    pub fn ensure_certificate(&self, subject_id: &str) -> QuarcResult<CertificatePaths> {
        let mut paths = self.paths_for(subject_id)?;

        if paths.cert_path.exists() && paths.key_path.exists() {
            debug!("📋 复用现有证书: {}", paths.cert_path.display());
            return Ok(paths);
        }

        info!("🔧 为 {} 生成新的 RSA-{} 自签名证书", subject_id, self.config.rsa_bits);

        let subject_dir = self.config.root_dir.join(subject_id);
        if !self.config.root_dir.exists() {
            fs::create_dir_all(&self.config.root_dir)?;
        }
        if !subject_dir.exists() {
            fs::create_dir(&subject_dir)?;
        }

        let (cert_pem, key_pem) = generate_pem_pair(&self.config, subject_id)?;
        write_pair(&subject_dir, &paths, &cert_pem, &key_pem)?;

        info!("💾 证书已保存:");
        info!("   证书: {}", paths.cert_path.display());
        info!("   私钥: {}", paths.key_path.display());

        paths.generated = true;
        Ok(paths)
    }
}

/// 主体标识只做最小校验：非空，且不能跳出存储根目录
fn validate_subject_id(subject_id: &str) -> QuarcResult<()> {
    if subject_id.is_empty() {
        return Err(QuarcError::Config("主体标识不能为空".to_string()));
    }
    if subject_id == "."
        || subject_id == ".."
        || subject_id.contains(['/', '\\', '\0'])
    {
        return Err(QuarcError::Config(format!("无效的主体标识: {:?}", subject_id)));
    }
    Ok(())
}

/// 生成 (证书 PEM, 私钥 PEM)
pub(crate) fn generate_pem_pair(config: &CertManagerConfig, subject_id: &str) -> QuarcResult<(String, String)> {
    let mut rng = rand::rngs::OsRng;
    let rsa_key = RsaPrivateKey::new(&mut rng, config.rsa_bits)
        .map_err(|e| QuarcError::Crypto(format!("生成 RSA 密钥失败: {}", e)))?;
    let pkcs8 = rsa_key
        .to_pkcs8_der()
        .map_err(|e| QuarcError::Crypto(format!("编码 PKCS#8 私钥失败: {}", e)))?;
    let key_pair = KeyPair::from_der(pkcs8.as_bytes())
        .map_err(|e| QuarcError::Crypto(format!("加载 RSA 密钥失败: {}", e)))?;

    let serial = rand::thread_rng().gen_range(config.serial_min..config.serial_max);

    let mut params = CertificateParams::default();
    params.alg = &PKCS_RSA_SHA256;
    params.key_pair = Some(key_pair);
    params.distinguished_name = config.distinguished_name(subject_id);
    params.subject_alt_names = vec![subject_alt_name(subject_id)];
    params.serial_number = Some(SerialNumber::from(serial));

    let not_before = SystemTime::now();
    let not_after = not_before
        .checked_add(Duration::from_secs(u64::from(config.validity_days) * 24 * 3600))
        .ok_or_else(|| QuarcError::Config(format!("证书有效期过长: {} 天", config.validity_days)))?;
    params.not_before = not_before.into();
    params.not_after = not_after.into();

    let cert = Certificate::from_params(params)
        .map_err(|e| QuarcError::Crypto(format!("构建证书失败: {}", e)))?;
    let cert_pem = cert
        .serialize_pem()
        .map_err(|e| QuarcError::Crypto(format!("签名证书失败: {}", e)))?;
    let key_pem = cert.serialize_private_key_pem();

    debug!("🔏 证书已签名: CN={}, 序列号={}", subject_id, serial);
    Ok((cert_pem, key_pem))
}

fn subject_alt_name(subject_id: &str) -> SanType {
    match subject_id.parse::<IpAddr>() {
        Ok(ip) => SanType::IpAddress(ip),
        Err(_) => SanType::DnsName(subject_id.to_string()),
    }
}

/// 先写临时文件，再依次改名到目标位置
///
/// 私钥最后落盘，作为整对文件的提交标记：
/// 任何中断都只会留下证书文件，下次调用仍视为未命中并整对重建。
fn write_pair(subject_dir: &Path, paths: &CertificatePaths, cert_pem: &str, key_pem: &str) -> QuarcResult<()> {
    let cert_tmp = write_temp(subject_dir, cert_pem)?;
    let key_tmp = write_temp(subject_dir, key_pem)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(cert_tmp.path(), fs::Permissions::from_mode(0o644))?;
    }

    match fs::remove_file(&paths.key_path) {
        Ok(()) => {
            debug!("🗑️  删除残留私钥: {}", paths.key_path.display());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    cert_tmp.persist(&paths.cert_path).map_err(|e| e.error)?;
    key_tmp.persist(&paths.key_path).map_err(|e| e.error)?;
    Ok(())
}

fn write_temp(dir: &Path, contents: &str) -> QuarcResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(".quarc-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    Ok(file)
}
