//! HTTPS 网关服务器
//!
//! 绑定 `ip:port`，对每个连接执行 TLS 握手后交给 hyper 自动协议构建器
//! （HTTP/1.1 + HTTP/2）处理

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

use crate::error::{QuarcError, QuarcResult};
use crate::utils::logger::{debug, error, info, warn};

pub mod cert_manager;
pub mod config;
pub mod cors;
pub mod handlers;
pub mod tls;

pub use config::{DEFAULT_PORT, GatewayConfig};
pub use cors::CorsConfig;
pub use handlers::{GatewayState, handle_request};

/// HTTPS 网关
pub struct GatewayServer {
    addr: SocketAddr,
    url: String,
    acceptor: TlsAcceptor,
    state: Arc<GatewayState>,
}

impl GatewayServer {
    /// 加载 TLS 证书并创建网关
    pub fn new(config: GatewayConfig) -> QuarcResult<Self> {
        let tls_config = tls::load_server_config(&config.cert_path, &config.key_path)?;
        let state = GatewayState {
            index_path: config.index_path.clone(),
            password_hash: config.password_hash.clone(),
            cors: config.cors.clone(),
        };

        Ok(Self {
            addr: config.socket_addr(),
            url: config.url(),
            acceptor: TlsAcceptor::from(tls_config),
            state: Arc::new(state),
        })
    }

    /// 浏览器访问地址
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 绑定监听端口
    ///
    /// 端口被占用时直接返回错误
    pub async fn bind(self) -> QuarcResult<BoundGateway> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| QuarcError::Network(format!("绑定 {} 失败: {}", self.addr, e)))?;

        info!("🚀 网关已启动: {}", self.url);

        Ok(BoundGateway {
            listener,
            acceptor: self.acceptor,
            state: self.state,
        })
    }

    /// 运行直到收到 Ctrl-C
    pub async fn run(self) -> QuarcResult<()> {
        let bound = self.bind().await?;
        bound
            .serve_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("❌ 无法监听 Ctrl-C 信号: {}", e);
                    std::future::pending::<()>().await;
                }
                info!("🛑 收到停止信号，正在关闭网关");
            })
            .await
    }
}

/// 已绑定端口的网关
pub struct BoundGateway {
    listener: TcpListener,
    acceptor: TlsAcceptor,
    state: Arc<GatewayState>,
}

impl BoundGateway {
    /// 实际监听地址
    pub fn local_addr(&self) -> QuarcResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// 接受连接直到 `shutdown` 完成
    ///
    /// 已建立的连接任务不会被等待
    pub async fn serve_until<F>(self, shutdown: F) -> QuarcResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, remote_addr)) => {
                            let acceptor = self.acceptor.clone();
                            let state = self.state.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, remote_addr, acceptor, state).await {
                                    debug!("🔌 连接结束 {}: {}", remote_addr, e);
                                }
                            });
                        }
                        Err(e) => {
                            warn!("⚠️  接受连接失败: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    acceptor: TlsAcceptor,
    state: Arc<GatewayState>,
) -> QuarcResult<()> {
    let tls_stream = acceptor
        .accept(stream)
        .await
        .map_err(|e| QuarcError::Tls(format!("TLS 握手失败: {}", e)))?;

    debug!("🔐 TLS 握手成功: {}", remote_addr);

    let io = TokioIo::new(tls_stream);
    let service = service_fn(move |req| handle_request(req, state.clone()));

    if let Err(e) = AutoBuilder::new(TokioExecutor::new())
        .serve_connection(io, service)
        .await
    {
        // 区分正常的客户端断开连接和真正的服务器错误
        let error_msg = e.to_string();
        if error_msg.contains("connection closed")
            || error_msg.contains("broken pipe")
            || error_msg.contains("connection reset")
            || error_msg.contains("unexpected end of file")
        {
            debug!("🔌 客户端断开连接: {} ({})", remote_addr, error_msg);
        } else {
            error!("❌ 连接处理失败 {}: {}", remote_addr, e);
            return Err(QuarcError::Http(error_msg));
        }
    }

    Ok(())
}
