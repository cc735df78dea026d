//! Connection registry
//!
//! Tracks live client connections so the server can enforce its client limit.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Per-connection bookkeeping.
#[derive(Debug, Clone)]
pub struct ClientSession {
    connected_at: Instant,
    requests: u64,
}

impl ClientSession {
    fn new() -> Self {
        Self {
            connected_at: Instant::now(),
            requests: 0,
        }
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Shared map of connected clients, keyed by peer address.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<Mutex<HashMap<SocketAddr, ClientSession>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `addr` unless `max_clients` connections are already live.
    ///
    /// Returns the new client count on success.
    pub async fn try_register(&self, addr: SocketAddr, max_clients: usize) -> Option<usize> {
        let mut clients = self.clients.lock().await;
        if clients.len() >= max_clients {
            return None;
        }
        clients.insert(addr, ClientSession::new());
        Some(clients.len())
    }

    pub async fn record_request(&self, addr: SocketAddr) {
        if let Some(session) = self.clients.lock().await.get_mut(&addr) {
            session.requests += 1;
        }
    }

    pub async fn unregister(&self, addr: SocketAddr) -> Option<ClientSession> {
        self.clients.lock().await.remove(&addr)
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn test_register_respects_limit() {
        let registry = ClientRegistry::new();
        assert_eq!(registry.try_register(addr(1), 2).await, Some(1));
        assert_eq!(registry.try_register(addr(2), 2).await, Some(2));
        assert_eq!(registry.try_register(addr(3), 2).await, None);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_unregister_frees_slot() {
        let registry = ClientRegistry::new();
        registry.try_register(addr(1), 1).await;
        registry.record_request(addr(1)).await;
        registry.record_request(addr(1)).await;

        let session = registry.unregister(addr(1)).await.unwrap();

        assert_eq!(session.requests(), 2);
        assert_eq!(registry.try_register(addr(2), 1).await, Some(1));
    }

    #[tokio::test]
    async fn test_record_request_for_unknown_client_is_ignored() {
        let registry = ClientRegistry::new();
        registry.record_request(addr(9)).await;
        assert_eq!(registry.len().await, 0);
    }
}
