use std::net::IpAddr;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use x509_parser::extensions::GeneralName;
use x509_parser::pem::parse_x509_pem;

use crate::error::{QuarcError, QuarcResult};

/// 证书信息
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    /// 证书主题
    pub subject: String,
    /// 证书颁发者
    pub issuer: String,
    /// 主题中的 Common Name
    pub common_name: Option<String>,
    /// 有效期开始时间
    pub not_before: DateTime<Utc>,
    /// 有效期结束时间
    pub not_after: DateTime<Utc>,
    /// 序列号（十六进制）
    pub serial_number: String,
    /// 签名算法 OID
    pub signature_algorithm: String,
    /// 主机名列表（来自 Subject Alternative Name）
    pub hostnames: Vec<String>,
    /// SubjectPublicKeyInfo 的 DER 编码
    pub public_key_der: Vec<u8>,
}

impl CertificateInfo {
    /// 从 PEM 文件解析第一张证书
    pub fn from_pem_file(path: impl AsRef<Path>) -> QuarcResult<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_pem(&data)
    }

    /// 从 PEM 数据解析第一张证书
    pub fn from_pem(data: &[u8]) -> QuarcResult<Self> {
        let (_, pem) = parse_x509_pem(data)
            .map_err(|e| QuarcError::Crypto(format!("解析 PEM 失败: {:?}", e)))?;
        let cert = pem
            .parse_x509()
            .map_err(|e| QuarcError::Crypto(format!("解析证书失败: {:?}", e)))?;

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string);

        let mut hostnames = Vec::new();
        if let Ok(Some(san)) = cert.subject_alternative_name() {
            for name in &san.value.general_names {
                match name {
                    GeneralName::DNSName(dns) => hostnames.push(dns.to_string()),
                    GeneralName::IPAddress(bytes) => {
                        if let Some(ip) = ip_from_bytes(bytes) {
                            hostnames.push(ip.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            common_name,
            not_before: to_datetime(cert.validity().not_before.timestamp())?,
            not_after: to_datetime(cert.validity().not_after.timestamp())?,
            serial_number: hex::encode(cert.raw_serial()),
            signature_algorithm: cert.signature_algorithm.algorithm.to_id_string(),
            hostnames,
            public_key_der: cert.public_key().raw.to_vec(),
        })
    }

    /// 颁发者与主题相同
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }

    /// 序列号数值（超过 64 位时返回 None）
    pub fn serial_u64(&self) -> Option<u64> {
        let trimmed = self.serial_number.trim_start_matches('0');
        if trimmed.is_empty() {
            return Some(0);
        }
        u64::from_str_radix(trimmed, 16).ok()
    }

    /// 证书是否即将在指定天数内过期
    pub fn is_expiring(&self, days_threshold: i64) -> bool {
        self.not_after < Utc::now() + chrono::Duration::days(days_threshold)
    }
}

fn to_datetime(timestamp: i64) -> QuarcResult<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| QuarcError::Crypto(format!("无效的证书时间: {}", timestamp)))
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(bytes);
            Some(IpAddr::from(octets))
        }
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(bytes);
            Some(IpAddr::from(octets))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::cert_manager::CertManagerConfig;
    use crate::server::cert_manager::provisioner::generate_pem_pair;

    #[test]
    fn test_parse_generated_certificate() {
        let config = CertManagerConfig::default();
        let (cert_pem, _) = generate_pem_pair(&config, "10.1.2.3").unwrap();
        let info = CertificateInfo::from_pem(cert_pem.as_bytes()).unwrap();

        assert_eq!(info.common_name.as_deref(), Some("10.1.2.3"));
        assert!(info.is_self_issued());
        assert!(info.subject.contains("O=Quarc"));
        assert!(info.subject.contains("L=Wagga Wagga"));
        assert_eq!(info.hostnames, vec!["10.1.2.3".to_string()]);
        // sha256WithRSAEncryption
        assert_eq!(info.signature_algorithm, "1.2.840.113549.1.1.11");
        assert!(!info.is_expiring(365));
    }

    #[test]
    fn test_serial_u64() {
        let mut info = CertificateInfo {
            subject: String::new(),
            issuer: String::new(),
            common_name: None,
            not_before: Utc::now(),
            not_after: Utc::now(),
            serial_number: "00989680".to_string(),
            signature_algorithm: String::new(),
            hostnames: Vec::new(),
            public_key_der: Vec::new(),
        };
        assert_eq!(info.serial_u64(), Some(10_000_000));

        info.serial_number = "0102030405060708090a".to_string();
        assert_eq!(info.serial_u64(), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            CertificateInfo::from_pem(b"not a certificate"),
            Err(QuarcError::Crypto(_))
        ));
    }

    #[test]
    fn test_ip_from_bytes() {
        assert_eq!(ip_from_bytes(&[192, 168, 1, 50]), Some("192.168.1.50".parse().unwrap()));
        assert_eq!(ip_from_bytes(&[1, 2, 3]), None);
    }
}
