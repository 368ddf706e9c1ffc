//! Server builder and accept loop.
//!
//! Ties the layers together: websocket listener → protocol codec →
//! room directory. Each accepted connection runs in its own task; the
//! only state shared between them is the directory, behind one async
//! lock that is never held across a room call that can block.

use std::net::SocketAddr;
use std::sync::Arc;

use omerta_protocol::JsonCodec;
use omerta_room::{RoomConfig, RoomDirectory};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::ws::WsListener;
use crate::ServerError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) directory: Mutex<RoomDirectory>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a server.
pub struct ServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind to. `"127.0.0.1:0"` picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the per-room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<Server, ServerError> {
        let listener = WsListener::bind(&self.bind_addr).await?;
        Ok(Server {
            listener,
            state: Arc::new(ServerState {
                directory: Mutex::new(RoomDirectory::new(self.room_config)),
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Omertà server.
pub struct Server {
    listener: WsListener,
    state: Arc<ServerState>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr()
    }

    /// Accepts connections forever. A failed handshake only costs that
    /// connection, never the loop.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((ws, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(ws, state).await {
                            tracing::debug!(%addr, error = %e, "connection handler failed");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
