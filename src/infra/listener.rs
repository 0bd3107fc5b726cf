//! 监听器提供者
//!
//! 提供 webhook 服务的网络监听器和对外公布的基础 URL。
//! 默认直接绑定本地端口；反向隧道或代理只需提供 `PUBLIC_URL`

use async_trait::async_trait;
use tokio::net::TcpListener;

/// 已建立的监听器
pub struct Listener {
    pub listener: TcpListener,
    /// 对外基础 URL（不带结尾斜杠）
    pub public_url: String,
}

/// 监听器提供者
#[async_trait]
pub trait ListenerProvider: Send + Sync {
    async fn listen(&self) -> std::io::Result<Listener>;
}

/// 直接绑定 TCP 端口
#[derive(Clone, Debug)]
pub struct TcpListenerProvider {
    pub host: String,
    pub port: u16,
    pub public_url: Option<String>,
}

impl TcpListenerProvider {
    pub fn new(host: impl Into<String>, port: u16, public_url: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            public_url,
        }
    }
}

#[async_trait]
impl ListenerProvider for TcpListenerProvider {
    async fn listen(&self) -> std::io::Result<Listener> {
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;
        let port = listener.local_addr()?.port();

        let public_url = match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                // 默认使用主机名
                let host = hostname::get()
                    .map(|h| h.to_string_lossy().to_string())
                    .unwrap_or_else(|_| "localhost".to_string());
                format!("http://{}:{}", host, port)
            }
        };

        Ok(Listener {
            listener,
            public_url,
        })
    }
}
