//! Live connection tracking for one server instance.
//!
//! Every accepted socket runs in its own task, registered under a
//! connection id until the task ends. Teardown aborts whatever is still
//! registered instead of waiting for clients to hang up.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// A registered connection task and the peer it serves.
#[derive(Debug)]
struct Connection {
    peer: SocketAddr,
    task: JoinHandle<()>,
}

type Connections = Arc<Mutex<HashMap<u64, Connection>>>;

/// Map of `connection id -> (peer address, connection task)`.
///
/// Ids are never reused, so a peer address that comes back while its old
/// task is still unwinding cannot shadow the new connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Connections,
    next_id: Arc<AtomicU64>,
}

/// Removes its connection from the registry when the task ends, whether it
/// finished or was aborted.
struct RegistrationGuard {
    id: u64,
    connections: Connections,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.connections.lock().remove(&self.id);
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `connection` as a registered task for `peer`. Returns its id.
    pub fn spawn<F>(&self, peer: SocketAddr, connection: F) -> u64
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = RegistrationGuard {
            id,
            connections: Arc::clone(&self.connections),
        };

        // Held across spawn + insert so a task that ends immediately cannot
        // remove its entry before it exists.
        let mut connections = self.connections.lock();
        let task = tokio::spawn(async move {
            let _guard = guard;
            connection.await;
        });
        connections.insert(id, Connection { peer, task });
        tracing::trace!(id, %peer, open = connections.len(), "connection registered");
        id
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }

    pub fn peers(&self) -> Vec<SocketAddr> {
        self.connections.lock().values().map(|c| c.peer).collect()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.connections.lock().contains_key(&id)
    }

    /// Abort every registered connection and wait until the registry is empty.
    ///
    /// Returns how many connections were force-closed.
    pub async fn drain(&self) -> usize {
        let mut closed = 0;
        loop {
            let open: Vec<(u64, Connection)> = self.connections.lock().drain().collect();
            if open.is_empty() {
                break;
            }

            for (id, Connection { peer, task }) in open {
                task.abort();
                // JoinError here is the cancellation itself
                let _ = task.await;
                tracing::trace!(id, %peer, "connection closed");
                closed += 1;
            }
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn test_finished_connection_unregisters() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = oneshot::channel::<()>();
        registry.spawn(addr(1000), async move {
            let _ = rx.await;
        });
        assert_eq!(registry.peers(), vec![addr(1000)]);

        tx.send(()).unwrap();
        for _ in 0..100 {
            if registry.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_drain_aborts_open_connections() {
        let registry = ConnectionRegistry::new();
        for port in [1000, 1001] {
            registry.spawn(addr(port), std::future::pending());
        }
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.drain().await, 2);
        assert!(registry.is_empty());
        assert_eq!(registry.drain().await, 0);
    }

    async fn wait_until_gone(registry: &ConnectionRegistry, id: u64) {
        for _ in 0..100 {
            if !registry.contains(id) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("connection {id} never unregistered");
    }

    #[tokio::test]
    async fn test_reused_peer_address_keeps_live_connection() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = oneshot::channel::<()>();
        let old = registry.spawn(addr(1000), async move {
            let _ = rx.await;
        });
        let live = registry.spawn(addr(1000), std::future::pending());
        assert_ne!(old, live);
        assert_eq!(registry.len(), 2);

        tx.send(()).unwrap();
        wait_until_gone(&registry, old).await;

        assert!(registry.contains(live));
        assert_eq!(registry.peers(), vec![addr(1000)]);
        assert_eq!(registry.drain().await, 1);
        assert!(registry.is_empty());
    }
}
