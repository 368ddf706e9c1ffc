//! WebSocket listener built on `tokio-tungstenite`.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;

use crate::ServerError;

pub(crate) type WsStream = WebSocketStream<TcpStream>;

/// Accepts TCP connections and upgrades them to websockets.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds to the given address.
    pub async fn bind(addr: &str) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr, "websocket listener bound");
        Ok(Self { listener })
    }

    /// The actual bound address — useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts one connection and runs the websocket handshake.
    pub(crate) async fn accept(&self) -> Result<(WsStream, SocketAddr), ServerError> {
        let (stream, addr) = self.listener.accept().await?;
        let ws = tokio_tungstenite::accept_async(stream).await?;
        tracing::debug!(%addr, "accepted websocket connection");
        Ok((ws, addr))
    }
}
