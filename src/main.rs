use anyhow::{Context, Result};
use clap::Parser;

use quarc_gateway::auth::credential_from_input;
use quarc_gateway::server::cert_manager::{CertificateInfo, CertificateProvisioner};
use quarc_gateway::server::GatewayServer;
use quarc_gateway::utils::logger::{info, warn};
use quarc_gateway::utils::{browser, logger, net};
use quarc_gateway::{AppConfig, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli).context("加载配置失败")?;
    logger::init(&config.log_level).context("初始化日志失败")?;

    let password_hash = match &config.password_hash {
        Some(hash) => Some(hash.clone()),
        None => prompt_password()?,
    };

    let ip = match config.ip {
        Some(ip) => ip,
        None => net::local_ip().context("无法确定本机局域网 IP")?,
    };

    // 证书在监听器绑定之前同步准备好，失败即终止启动
    let provisioner = CertificateProvisioner::new(config.certificates.clone())?;
    let paths = provisioner
        .ensure_certificate(&ip.to_string())
        .with_context(|| format!("为 {} 准备证书失败", ip))?;

    if let Ok(cert_info) = CertificateInfo::from_pem_file(&paths.cert_path) {
        info!("📜 证书主题: {}", cert_info.subject);
        info!("   有效期: {} - {}", cert_info.not_before, cert_info.not_after);
    }

    let gateway_config = config.gateway_config(ip, &paths.cert_path, &paths.key_path, password_hash);
    let server = GatewayServer::new(gateway_config)?;

    if config.open_browser {
        if let Err(e) = browser::open_url(server.url()) {
            warn!("⚠️  无法打开浏览器: {}，请手动访问 {}", e, server.url());
        }
    }

    let runtime = tokio::runtime::Runtime::new().context("创建 tokio 运行时失败")?;
    runtime.block_on(server.run())?;
    Ok(())
}

/// 交互式读取密码，空密码表示不启用密码
fn prompt_password() -> Result<Option<String>> {
    let input = rpassword::prompt_password("Define password: ").context("读取密码失败")?;
    let credential = credential_from_input(&input);
    if credential.is_none() {
        warn!("⚠️  未设置密码，网关将不校验登录");
    }
    Ok(credential)
}
