/// Shared connection registry
///
/// Background probes update roles and latencies while selections run, so
/// selection works over a snapshot taken from here.
use crate::core::{Connection, NodeRole};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Ordered, shared list of known connections
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<Vec<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an initial list, preserving its order
    pub fn from_connections(connections: Vec<Connection>) -> Self {
        Self {
            connections: Arc::new(RwLock::new(connections)),
        }
    }

    /// Append a connection, replacing any existing one with the same id in place
    pub async fn add(&self, connection: Connection) {
        let mut connections = self.connections.write().await;
        match connections.iter_mut().find(|c| c.id == connection.id) {
            Some(existing) => *existing = connection,
            None => connections.push(connection),
        }
    }

    /// Remove a connection by id
    pub async fn remove(&self, id: &str) -> Option<Connection> {
        let mut connections = self.connections.write().await;
        let index = connections.iter().position(|c| c.id == id)?;
        Some(connections.remove(index))
    }

    /// Record a new latency measurement. Returns false for unknown ids.
    pub async fn update_latency(&self, id: &str, latency_ms: u64) -> bool {
        let mut connections = self.connections.write().await;
        match connections.iter_mut().find(|c| c.id == id) {
            Some(con) => {
                con.latency_ms = latency_ms;
                true
            }
            None => false,
        }
    }

    /// Record a role change (e.g. after an election). Returns false for unknown ids.
    pub async fn update_role(&self, id: &str, role: NodeRole) -> bool {
        let mut connections = self.connections.write().await;
        match connections.iter_mut().find(|c| c.id == id) {
            Some(con) => {
                con.role = role;
                true
            }
            None => false,
        }
    }

    /// Copy of the current connection list, in registry order
    pub async fn snapshot(&self) -> Vec<Connection> {
        self.connections.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
