//! In-process multi-node engine.
//!
//! Runs fragments on the blocking thread pool against per-node cache
//! partitions. Stands in for a remote cluster behind the [`GridEngine`]
//! seam: envelopes still go through the dispatch codec, so handlers resolve
//! by registered tag exactly as they would across a wire.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};

use crate::cache::{CacheRegistry, PartitionedCache};
use crate::cluster::{ClusterNode, NodeId};
use crate::engine::GridEngine;
use crate::error::{GridError, GridResult};
use crate::fragment::{FragmentContext, FragmentEnvelope};
use ember_common::value::DataValue;

/// In-process engine hosting a fixed set of virtual nodes.
#[derive(Debug)]
pub struct LocalEngine {
    nodes: Vec<ClusterNode>,
    caches: CacheRegistry,
}

impl LocalEngine {
    /// Boot an engine with `node_count` virtual nodes named
    /// `{instance}-node-{i}`.
    pub fn start(instance: &str, node_count: usize) -> GridResult<Self> {
        if node_count == 0 {
            return Err(GridError::connection(
                "cluster must have at least one node",
            ));
        }
        let nodes: Vec<ClusterNode> = (0..node_count)
            .map(|index| ClusterNode::new(NodeId::random(), format!("{instance}-node-{index}")))
            .collect();
        info!(instance, nodes = node_count, "local engine started");
        Ok(Self {
            caches: CacheRegistry::new(nodes.len()),
            nodes,
        })
    }

    fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id() == id)
    }
}

#[async_trait]
impl GridEngine for LocalEngine {
    async fn topology(&self) -> GridResult<Vec<ClusterNode>> {
        Ok(self.nodes.clone())
    }

    fn local_node(&self) -> ClusterNode {
        // the client session is attached to the first node
        self.nodes[0].clone()
    }

    async fn execute(&self, envelope: FragmentEnvelope) -> GridResult<DataValue> {
        let Some(index) = self.node_index(&envelope.fragment.target) else {
            return Err(GridError::evaluation(format!(
                "fragment {} of task {} addressed unknown node {}",
                envelope.seq, envelope.task_id, envelope.fragment.target
            )));
        };

        // ship through the codec so dispatch happens by registered tag
        let bytes = envelope.encode()?;
        let node = self.nodes[index].clone();
        let topology = self.nodes.clone();
        let caches = self.caches.clone();

        let handle = task::spawn_blocking(move || -> anyhow::Result<DataValue> {
            let envelope = FragmentEnvelope::decode(&bytes)?;
            let ctx = FragmentContext::new(node, index, topology, caches);
            debug!(
                task = %envelope.task_id,
                seq = envelope.seq,
                node = %ctx.local_node().name(),
                "executing fragment"
            );
            envelope.fragment.handler.run(&ctx, envelope.fragment.arg)
        });

        match handle.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(GridError::evaluation(err.to_string())),
            Err(join_err) if join_err.is_panic() => Err(GridError::evaluation(
                "fragment panicked during evaluation".to_string(),
            )),
            Err(join_err) => Err(GridError::evaluation(join_err.to_string())),
        }
    }

    fn cache(&self, name: &str) -> Arc<PartitionedCache> {
        self.caches.get_or_create(name)
    }

    fn partition_of(&self, node: &NodeId) -> Option<usize> {
        self.node_index(node)
    }
}
