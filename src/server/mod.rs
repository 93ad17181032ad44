//! 処方箋解析プロキシサーバ
//!
//! ブラウザ(WASM)からの解析要求を受け、APIキーを持つこのプロセスから
//! Gemini を呼び出す

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::{Context, Result};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Config;

pub mod api;

pub use api::{api_config, SharedModel};

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub allow_cors: bool,
}

impl HttpConfig {
    pub fn from_config(config: &Config, allow_cors: bool) -> Result<Self> {
        let host = config
            .server_host
            .parse()
            .with_context(|| format!("invalid server host: {}", config.server_host))?;
        Ok(Self {
            host,
            port: config.server_port,
            allow_cors,
        })
    }
}

pub struct WebServer {
    model: SharedModel,
}

impl WebServer {
    pub fn new<M>(model: M) -> Self
    where
        M: doc_snap_common::GenerativeModel + Send + Sync + 'static,
    {
        Self {
            model: Arc::new(model),
        }
    }

    pub async fn start(self, config: HttpConfig) -> Result<()> {
        let addr = SocketAddr::new(config.host, config.port);

        let router = api_config().with_state(self.model);
        let router = if config.allow_cors {
            info!("Enabling CORS");
            let cors_layer = CorsLayer::new()
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
                .allow_origin(tower_http::cors::Any);

            router.layer(cors_layer)
        } else {
            router
        };

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!("Address bound. Starting web server on http://{}", addr);
        axum::serve(listener, router).await?;
        Ok(())
    }
}
