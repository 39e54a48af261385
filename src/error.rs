//! 错误类型
//!
//! 存储、加密、TLS、网络与配置错误统一收敛到 [`QuarcError`]

use thiserror::Error;

/// 网关错误
#[derive(Error, Debug)]
pub enum QuarcError {
    /// 存储错误：目录或文件创建、写入失败
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 加密错误：密钥生成或证书签名失败
    #[error("加密错误: {0}")]
    Crypto(String),

    /// TLS 配置错误
    #[error("TLS错误: {0}")]
    Tls(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// HTTP 服务错误
    #[error("HTTP错误: {0}")]
    Http(String),
}

impl From<rustls::Error> for QuarcError {
    fn from(err: rustls::Error) -> Self {
        QuarcError::Tls(err.to_string())
    }
}

impl From<toml::de::Error> for QuarcError {
    fn from(err: toml::de::Error) -> Self {
        QuarcError::Config(err.to_string())
    }
}

/// 网关结果类型
pub type QuarcResult<T> = Result<T, QuarcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: QuarcError = io.into();
        assert!(matches!(err, QuarcError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
