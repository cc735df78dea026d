//! Listener and accept loop
//!
//! Binds the configured socket and spawns one session task per connection.

use log::{error, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::responses::{Response, SERVICE_UNAVAILABLE};
use crate::server::registry::ClientRegistry;
use crate::server::session::handle_client;
use crate::storage::FileEngine;

pub struct Server {
    listener: TcpListener,
    registry: ClientRegistry,
    engine: FileEngine,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listener described by `config`.
    pub async fn bind(config: ServerConfig, engine: FileEngine) -> Result<Self, ServerError> {
        let socket = config.socket_address();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(ServerError::Io(e));
            }
        };

        Ok(Self::from_listener(listener, config, engine))
    }

    /// Wraps an already bound listener. `config` still supplies the limits.
    pub fn from_listener(listener: TcpListener, config: ServerConfig, engine: FileEngine) -> Self {
        Self {
            listener,
            registry: ClientRegistry::new(),
            engine,
            config: Arc::new(config),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `shutdown` completes.
    ///
    /// Sessions already running are not interrupted by shutdown.
    pub async fn serve<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting RAX file server on {} (max {} clients, storage root {})",
            self.config.socket_address(),
            self.config.max_clients,
            self.engine.root().path().display()
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let registry = self.registry.clone();
                            let engine = self.engine.clone();
                            let config = Arc::clone(&self.config);

                            // Spawn a task for each client so accept loop doesn't block
                            tokio::spawn(async move {
                                if let Err(e) =
                                    handle_new_client(stream, addr, registry, engine, config).await
                                {
                                    warn!("Failed to handle client {}: {}", addr, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Error accepting connection: {}", e);
                        }
                    }
                }
            }
        }
    }
}

/// Registers a new client, runs its session, and unregisters it afterwards.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    registry: ClientRegistry,
    engine: FileEngine,
    config: Arc<ServerConfig>,
) -> io::Result<()> {
    let Some(count) = registry
        .try_register(client_addr, config.max_clients)
        .await
    else {
        warn!(
            "Rejecting client {}: {} clients already connected",
            client_addr, config.max_clients
        );
        let response = Response::new(
            SERVICE_UNAVAILABLE,
            "Too many connections. Try again later.",
        );
        stream.write_all(response.to_line().as_bytes()).await?;
        return Ok(());
    };

    info!(
        "Accepted client: {} ({}/{} clients)",
        client_addr, count, config.max_clients
    );

    let result = handle_client(
        stream,
        client_addr,
        registry.clone(),
        engine,
        config.max_request_bytes,
    )
    .await;

    if let Some(session) = registry.unregister(client_addr).await {
        info!(
            "Client {} disconnected after {} requests ({:.1?})",
            client_addr,
            session.requests(),
            session.connected_for()
        );
    }

    result
}
