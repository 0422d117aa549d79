//! HTTP server wrapper: binds the listener and serves the router until the
//! shutdown future resolves.

use std::future::Future;

use axum::Router;
use log::info;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::router::build_router;
use crate::state::AppState;

pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            router: build_router(state),
        }
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Serves requests until `shutdown` completes, then drains in-flight ones.
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        info!(
            "event=http_listen module=http status=ok addr={}",
            listener.local_addr()?
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("event=http_shutdown module=http status=ok");
        Ok(())
    }
}
