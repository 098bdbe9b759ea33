//! Engine seam: the cluster compute/cache engine as consumed by the client.
//!
//! Everything behind this trait is the external collaborator's business:
//! membership, scheduling, transport, storage. The crate ships
//! [`LocalEngine`], an in-process implementation that honors the same
//! contracts.

mod local;

pub use local::LocalEngine;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::cache::PartitionedCache;
use crate::cluster::{ClusterNode, NodeId};
use crate::error::GridResult;
use crate::fragment::FragmentEnvelope;
use ember_common::value::DataValue;

#[async_trait]
pub trait GridEngine: Send + Sync + Debug {
    /// Current cluster membership view.
    async fn topology(&self) -> GridResult<Vec<ClusterNode>>;

    /// The node this client session is attached to.
    fn local_node(&self) -> ClusterNode;

    /// Execute one fragment on its target node and return its result.
    /// Failures of the fragment itself surface as evaluation errors.
    async fn execute(&self, envelope: FragmentEnvelope) -> GridResult<DataValue>;

    /// Handle to the named cache, created on first use.
    fn cache(&self, name: &str) -> Arc<PartitionedCache>;

    /// Partition index of a node's locally-resident cache data.
    fn partition_of(&self, node: &NodeId) -> Option<usize>;
}
