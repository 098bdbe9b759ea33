//! Client session: the entry point to the grid.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tracing::info;

use crate::cache::ClientCache;
use crate::cluster::ClusterNode;
use crate::compute::Compute;
use crate::config::GridConfig;
use crate::engine::{GridEngine, LocalEngine};
use crate::error::GridResult;

/// A connected client session.
///
/// Holds the engine handle and hands out [`Compute`] and [`ClientCache`]
/// accessors. Dropping the client drops the embedded engine and everything
/// it stores.
#[derive(Debug, Clone)]
pub struct GridClient {
    name: String,
    engine: Arc<dyn GridEngine>,
    next_node: Arc<AtomicUsize>,
}

impl GridClient {
    /// Connect a session backed by the embedded engine. Fails on invalid
    /// configuration; no partial session is usable after an error.
    pub async fn connect(config: GridConfig) -> GridResult<Self> {
        config.validate()?;
        let engine = LocalEngine::start(&config.instance_name, config.node_count)?;
        info!(
            instance = %config.instance_name,
            nodes = config.node_count,
            "grid client connected"
        );
        Ok(Self::with_engine(config.instance_name, Arc::new(engine)))
    }

    /// Attach to an already-running engine.
    pub fn with_engine(name: impl Into<String>, engine: Arc<dyn GridEngine>) -> Self {
        Self {
            name: name.into(),
            engine,
            next_node: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The instance name this session was connected with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Task submission handle.
    pub fn compute(&self) -> Compute {
        Compute::new(Arc::clone(&self.engine), Arc::clone(&self.next_node))
    }

    /// Asynchronous accessor for the named cache.
    pub fn cache(&self, name: &str) -> ClientCache {
        let backing = self.engine.cache(name);
        let local_partition = self
            .engine
            .partition_of(self.engine.local_node().id())
            .unwrap_or(0);
        ClientCache::new(backing, local_partition)
    }

    /// The node this session is attached to.
    pub fn local_node(&self) -> ClusterNode {
        self.engine.local_node()
    }
}
