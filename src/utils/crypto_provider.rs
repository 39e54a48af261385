use std::sync::Once;

static CRYPTO_PROVIDER_INIT: Once = Once::new();

/// 确保 rustls 的 ring 加密后端只安装一次
///
/// 无论被调用多少次，安装只会执行一次；
/// 如果其他代码已经安装过默认后端，保持不变
pub fn ensure_crypto_provider_installed() {
    CRYPTO_PROVIDER_INIT.call_once(|| {
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            crate::utils::logger::debug!("🔐 rustls 默认加密后端已存在，跳过安装");
        } else {
            crate::utils::logger::debug!("🔐 rustls ring 加密后端已安装");
        }
    });
}
