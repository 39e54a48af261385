use std::path::{Path, PathBuf};

use rcgen::{DistinguishedName, DnType};
use serde::Deserialize;

use crate::error::{QuarcError, QuarcResult};

/// 证书有效期上限（天）
pub const MAX_VALIDITY_DAYS: u32 = 100 * 365;

/// 证书管理器配置
///
/// 存储位置与证书主题字段都从这里读取，默认值与历史部署保持一致
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CertManagerConfig {
    /// 证书存储根目录
    pub root_dir: PathBuf,
    /// 证书文件名（所有主体共用）
    pub cert_filename: String,
    /// 私钥文件名（所有主体共用）
    pub key_filename: String,
    /// 国家 (C)
    pub country: String,
    /// 州/省 (ST)
    pub state: String,
    /// 城市 (L)
    pub locality: String,
    /// 组织 (O)
    pub organization: String,
    /// 组织单位 (OU)
    pub organizational_unit: String,
    /// 证书有效期（天）
    pub validity_days: u32,
    /// RSA 模长（位）
    pub rsa_bits: usize,
    /// 序列号下界（含）
    pub serial_min: u64,
    /// 序列号上界（不含）
    pub serial_max: u64,
}

impl Default for CertManagerConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("certificates"),
            cert_filename: "quarc.crt".to_string(),
            key_filename: "quarc.key".to_string(),
            country: "AU".to_string(),
            state: "NSW".to_string(),
            locality: "Wagga Wagga".to_string(),
            organization: "Quarc".to_string(),
            organizational_unit: "Quarc".to_string(),
            validity_days: 3650,
            rsa_bits: 2048,
            serial_min: 1000,
            serial_max: 10_000_000,
        }
    }
}

impl CertManagerConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置存储根目录
    pub fn with_root_dir(mut self, root_dir: impl AsRef<Path>) -> Self {
        self.root_dir = root_dir.as_ref().to_path_buf();
        self
    }

    /// 设置证书与私钥文件名
    pub fn with_filenames(mut self, cert_filename: impl Into<String>, key_filename: impl Into<String>) -> Self {
        self.cert_filename = cert_filename.into();
        self.key_filename = key_filename.into();
        self
    }

    /// 设置证书有效期
    pub fn with_validity_days(mut self, days: u32) -> Self {
        self.validity_days = days;
        self
    }

    /// 设置 RSA 模长
    pub fn with_rsa_bits(mut self, bits: usize) -> Self {
        self.rsa_bits = bits;
        self
    }

    /// 设置序列号范围 `[min, max)`
    pub fn with_serial_range(mut self, min: u64, max: u64) -> Self {
        self.serial_min = min;
        self.serial_max = max;
        self
    }

    /// 校验配置
    pub fn validate(&self) -> QuarcResult<()> {
        if self.cert_filename.is_empty() || self.key_filename.is_empty() {
            return Err(QuarcError::Config("证书和私钥文件名不能为空".to_string()));
        }
        if self.cert_filename == self.key_filename {
            return Err(QuarcError::Config(format!(
                "证书和私钥文件名不能相同: {}",
                self.cert_filename
            )));
        }
        for name in [&self.cert_filename, &self.key_filename] {
            if name.contains(['/', '\\']) {
                return Err(QuarcError::Config(format!("文件名不能包含路径分隔符: {}", name)));
            }
        }
        if self.serial_min == 0 || self.serial_min >= self.serial_max {
            return Err(QuarcError::Config(format!(
                "无效的序列号范围: [{}, {})",
                self.serial_min, self.serial_max
            )));
        }
        if self.validity_days == 0 {
            return Err(QuarcError::Config("证书有效期必须大于 0 天".to_string()));
        }
        if self.validity_days > MAX_VALIDITY_DAYS {
            return Err(QuarcError::Config(format!(
                "证书有效期过长: {} 天，最多 {} 天",
                self.validity_days, MAX_VALIDITY_DAYS
            )));
        }
        if self.rsa_bits < 2048 {
            return Err(QuarcError::Config(format!(
                "RSA 模长过小: {}，至少需要 2048 位",
                self.rsa_bits
            )));
        }
        Ok(())
    }

    /// 构建证书主题，CN 为主体标识
    pub fn distinguished_name(&self, common_name: &str) -> DistinguishedName {
        let mut distinguished_name = DistinguishedName::new();
        distinguished_name.push(DnType::CountryName, self.country.as_str());
        distinguished_name.push(DnType::StateOrProvinceName, self.state.as_str());
        distinguished_name.push(DnType::LocalityName, self.locality.as_str());
        distinguished_name.push(DnType::OrganizationName, self.organization.as_str());
        distinguished_name.push(DnType::OrganizationalUnitName, self.organizational_unit.as_str());
        distinguished_name.push(DnType::CommonName, common_name);
        distinguished_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CertManagerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.validity_days, 3650);
        assert_eq!(config.cert_filename, "quarc.crt");
        assert_eq!(config.key_filename, "quarc.key");
    }

    #[test]
    fn test_rejects_weak_key_size() {
        let config = CertManagerConfig::default().with_rsa_bits(1024);
        assert!(matches!(config.validate(), Err(QuarcError::Config(_))));
    }

    #[test]
    fn test_rejects_out_of_range_validity() {
        let config: CertManagerConfig = toml::from_str("validity_days = 4000000").unwrap();
        assert!(matches!(config.validate(), Err(QuarcError::Config(_))));

        let config = CertManagerConfig::default().with_validity_days(MAX_VALIDITY_DAYS);
        assert!(config.validate().is_ok());
        let config = CertManagerConfig::default().with_validity_days(MAX_VALIDITY_DAYS + 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_serial_range() {
        let config = CertManagerConfig::default().with_serial_range(10, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_clashing_filenames() {
        let config = CertManagerConfig::default().with_filenames("same.pem", "same.pem");
        assert!(config.validate().is_err());

        let config = CertManagerConfig::default().with_filenames("a/cert.pem", "key.pem");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CertManagerConfig = toml::from_str(
            r#"
            root_dir = "/var/lib/quarc/certs"
            organization = "Lab"
            "#,
        )
        .unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/var/lib/quarc/certs"));
        assert_eq!(config.organization, "Lab");
        assert_eq!(config.country, "AU");
        assert_eq!(config.rsa_bits, 2048);
    }
}
