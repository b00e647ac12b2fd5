//! Interfaces and sessions.
//!
//! An [`Interface`] is the immutable set of declared resources plus the
//! knowledge of where to connect. Each [`Session`] owns one pool, opened by
//! [`Interface::connect`] and released by [`Session::close`] or on drop.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use keyform_core_store::{Connector, Error, KvPool, Result, Shape, SharedPool};

use crate::config::ConnectionConfig;
use crate::descriptor::{Resource, ResourceInfo};
use crate::manager::{Bound, ResourceManager};

/// Ties managers to the interface that declared them.
pub(crate) type InterfaceId = u64;

static NEXT_INTERFACE: AtomicU64 = AtomicU64::new(1);

/// Collects resource declarations before the interface is built.
pub struct InterfaceBuilder {
    id: InterfaceId,
    resources: Vec<ResourceInfo>,
}

impl InterfaceBuilder {
    /// Validate and register a resource.
    ///
    /// Two resources may not share both partition and prefix, since their
    /// keys would overlap.
    pub fn declare<T: Shape>(&mut self, resource: Resource<T>) -> Result<ResourceManager<T>> {
        let descriptor = resource.into_descriptor()?;
        if let Some(existing) = self
            .resources
            .iter()
            .find(|info| info.collides_with(descriptor.info()))
        {
            return Err(Error::Configuration(format!(
                "{} uses the same database and prefix as {}",
                descriptor.info(),
                existing
            )));
        }

        self.resources.push(descriptor.info().clone());
        Ok(ResourceManager::new(descriptor, self.id))
    }

    pub fn build(self, config: ConnectionConfig, connector: impl Connector + 'static) -> Interface {
        Interface {
            id: self.id,
            resources: self.resources.into(),
            config,
            connector: Arc::new(connector),
        }
    }
}

/// The declared resources of an application and where they live.
pub struct Interface {
    id: InterfaceId,
    resources: Arc<[ResourceInfo]>,
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("resources", &self.resources)
            .field("config", &self.config)
            .finish()
    }
}

impl Interface {
    pub fn builder() -> InterfaceBuilder {
        InterfaceBuilder {
            id: NEXT_INTERFACE.fetch_add(1, Ordering::Relaxed),
            resources: Vec::new(),
        }
    }

    pub fn resources(&self) -> &[ResourceInfo] {
        &self.resources
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Open a new pool and wrap it in a session.
    pub async fn connect(&self) -> Result<Session> {
        let address = &self.config.address;
        log::debug!("Connecting to {}...", address);
        let pool = self
            .connector
            .connect(address, &self.config.options)
            .await
            .map_err(|e| Error::Connection(format!("cannot connect to {}: {}", address, e)))?;
        log::debug!(
            "Connected to {} with {} resource(s)",
            address,
            self.resources.len()
        );
        Ok(Session {
            interface: self.id,
            address: address.clone(),
            pool: Some(pool),
        })
    }
}

/// One open connection scope.
///
/// Operations resolve the pool through the session on every call, so a
/// closed session fails them with [`Error::Connection`].
pub struct Session {
    interface: InterfaceId,
    address: String,
    pool: Option<SharedPool>,
}

impl Session {
    /// Bind a manager to this session.
    pub fn bind<'s, T: Shape>(&'s self, manager: &'s ResourceManager<T>) -> Bound<'s, T> {
        Bound::new(manager, self)
    }

    pub fn is_open(&self) -> bool {
        self.pool.is_some()
    }

    pub(crate) fn resolve(&self, interface: InterfaceId) -> Result<&SharedPool> {
        if interface != self.interface {
            return Err(Error::Connection(
                "resource was not declared on this session's interface".to_string(),
            ));
        }
        self.pool
            .as_ref()
            .ok_or_else(|| Error::Connection(format!("session to {} is closed", self.address)))
    }

    /// Release the pool. Closing twice is a no-op.
    pub async fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
            pool.wait_closed().await;
            log::debug!("Closed session to {}", self.address);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
            log::debug!("Dropped open session to {}", self.address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyform_memory_store::MemoryBackend;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    impl Shape for User {}

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        name: String,
    }

    impl Shape for Tag {}

    #[test]
    fn declarations_are_listed() {
        let mut builder = Interface::builder();
        builder.declare(Resource::<User>::keyed_by("id")).unwrap();
        builder.declare(Resource::<Tag>::keyed_by("name").db(1)).unwrap();
        let interface = builder.build(
            ConnectionConfig::new("memory://local"),
            MemoryBackend::new().connector(),
        );

        let prefixes: Vec<_> = interface
            .resources()
            .iter()
            .map(|info| (info.partition, info.prefix.as_str()))
            .collect();
        assert_eq!(prefixes, vec![(0, "user"), (1, "tag")]);
    }

    #[test]
    fn colliding_declarations_are_rejected() {
        let mut builder = Interface::builder();
        builder.declare(Resource::<User>::keyed_by("id")).unwrap();
        let result = builder.declare(Resource::<Tag>::keyed_by("name").prefix("user"));
        assert!(matches!(result, Err(Error::Configuration(_))));

        builder
            .declare(Resource::<Tag>::keyed_by("name").prefix("user").db(1))
            .unwrap();
    }

    #[tokio::test]
    async fn connect_failures_are_connection_errors() {
        let interface = Interface::builder().build(
            ConnectionConfig::new("redis://localhost"),
            MemoryBackend::new().connector(),
        );
        let err = interface.connect().await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[tokio::test]
    async fn close_and_drop_release_the_pool() {
        let backend = MemoryBackend::new();
        let interface = Interface::builder()
            .build(ConnectionConfig::new("memory://local"), backend.connector());

        let mut session = interface.connect().await.unwrap();
        assert_eq!(backend.open_connections(), 1);
        session.close().await;
        session.close().await;
        assert!(!session.is_open());
        assert_eq!(backend.open_connections(), 0);

        {
            let _session = interface.connect().await.unwrap();
            assert_eq!(backend.open_connections(), 1);
        }
        assert_eq!(backend.open_connections(), 0);
        assert_eq!(backend.connections_opened(), 2);
    }

    #[tokio::test]
    async fn managers_are_tied_to_their_interface() {
        let backend = MemoryBackend::new();
        let mut builder = Interface::builder();
        let users = builder.declare(Resource::<User>::keyed_by("id")).unwrap();
        let _first = builder.build(ConnectionConfig::new("memory://a"), backend.connector());

        let other = Interface::builder().build(ConnectionConfig::new("memory://b"), backend.connector());
        let session = other.connect().await.unwrap();
        let err = session.bind(&users).get(1u64).await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
