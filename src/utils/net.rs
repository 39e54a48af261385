//! 本机局域网 IP 探测

use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};

use crate::error::{QuarcError, QuarcResult};
use crate::utils::logger::{debug, warn};

/// 用于确定出口网卡的外部地址（UDP connect 不会发送任何数据包）
const PROBE_ADDR: &str = "8.8.8.8:1";

/// 获取本机对外的局域网 IP
///
/// 先通过 UDP 套接字路由探测，失败时回退到本机主机名解析
pub fn local_ip() -> QuarcResult<IpAddr> {
    match probe_outbound_ip() {
        Ok(ip) => {
            debug!("🌐 路由探测得到本机地址: {}", ip);
            Ok(ip)
        }
        Err(e) => {
            warn!("⚠️  路由探测失败 ({})，回退到主机名解析", e);
            hostname_ip()
        }
    }
}

fn probe_outbound_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(PROBE_ADDR)?;
    let ip = socket.local_addr()?.ip();
    if ip.is_unspecified() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "本地地址未指定",
        ));
    }
    Ok(ip)
}

fn hostname_ip() -> QuarcResult<IpAddr> {
    let hostname = sys_info::hostname()
        .map_err(|e| QuarcError::Network(format!("读取主机名失败: {}", e)))?;

    let addrs: Vec<SocketAddr> = (hostname.as_str(), 0)
        .to_socket_addrs()
        .map_err(|e| QuarcError::Network(format!("解析主机名 {} 失败: {}", hostname, e)))?
        .collect();

    first_ipv4(&addrs)
        .ok_or_else(|| QuarcError::Network(format!("主机名 {} 没有 IPv4 地址", hostname)))
}

/// 取第一个 IPv4 地址
pub(crate) fn first_ipv4(addrs: &[SocketAddr]) -> Option<IpAddr> {
    addrs.iter().map(SocketAddr::ip).find(IpAddr::is_ipv4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_ipv4_skips_v6() {
        let addrs: Vec<SocketAddr> = vec![
            "[::1]:0".parse().unwrap(),
            "10.0.0.5:0".parse().unwrap(),
            "10.0.0.6:0".parse().unwrap(),
        ];
        assert_eq!(first_ipv4(&addrs), Some("10.0.0.5".parse().unwrap()));
    }

    #[test]
    fn test_first_ipv4_none() {
        let addrs: Vec<SocketAddr> = vec!["[::1]:0".parse().unwrap()];
        assert_eq!(first_ipv4(&addrs), None);
    }
}
