//! Job fragments and registered fragment handlers.
//!
//! A fragment is one unit of remote work bound to a target node. Handlers
//! are statically compiled types registered through `typetag`; an envelope
//! carries the handler's tag plus its serialized state and argument
//! payload, so the executing node dispatches by identifier rather than by
//! shipped code.

use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::cache::{CacheRegistry, FragmentCache};
use crate::cluster::{ClusterNode, NodeId};
use ember_common::error::CommonError;
use ember_common::value::DataValue;

/// Remote work executed on a single node.
///
/// Implementations must be serde-registered (`#[typetag::serde]`) so the
/// engine can resolve them from an envelope. An error returned here fails
/// the whole task.
#[typetag::serde(tag = "type")]
pub trait FragmentHandler: Send + Sync + Debug + DynClone {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue>;
}

dyn_clone::clone_trait_object!(FragmentHandler);

/// Execution context handed to a handler on its bound node.
///
/// Cache access from here is blocking: the handler already runs embedded in
/// the engine's execution context, colocated with the data, and must not
/// need to suspend.
#[derive(Debug)]
pub struct FragmentContext {
    node: ClusterNode,
    node_index: usize,
    topology: Vec<ClusterNode>,
    caches: CacheRegistry,
}

impl FragmentContext {
    /// Build a context for a fragment bound to `node`. Engines call this
    /// on the executing node before dispatching the handler.
    pub fn new(
        node: ClusterNode,
        node_index: usize,
        topology: Vec<ClusterNode>,
        caches: CacheRegistry,
    ) -> Self {
        Self {
            node,
            node_index,
            topology,
            caches,
        }
    }

    /// The node this fragment is bound to.
    pub fn local_node(&self) -> &ClusterNode {
        &self.node
    }

    /// Membership view at submission time.
    pub fn topology(&self) -> &[ClusterNode] {
        &self.topology
    }

    /// Blocking accessor for the named cache, local to this node.
    pub fn cache(&self, name: &str) -> FragmentCache {
        FragmentCache::new(self.caches.get_or_create(name), self.node_index)
    }
}

/// One emitted unit of work bound to a target node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub handler: Box<dyn FragmentHandler>,
    pub arg: DataValue,
    pub target: NodeId,
}

/// A fragment stamped with its task and emission sequence for dispatch.
///
/// The sequence number correlates the fragment's result back to its
/// emission position; the reduce step observes results in that order no
/// matter when each fragment completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentEnvelope {
    pub task_id: String,
    pub seq: usize,
    pub fragment: Fragment,
}

impl FragmentEnvelope {
    /// Encode for dispatch. The format is self-describing so the receiving
    /// node can resolve the handler by its registered tag.
    pub fn encode(&self) -> Result<Vec<u8>, CommonError> {
        serde_json::to_vec(self).map_err(|err| {
            CommonError::serialization_error_with_source("fragment envelope", err)
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CommonError> {
        serde_json::from_slice(bytes).map_err(|err| {
            CommonError::deserialization_error_with_source("fragment envelope", err)
        })
    }
}

/// Order-preserving collector for the fragments produced by a map step.
#[derive(Debug, Default)]
pub struct FragmentEmitter {
    fragments: Vec<Fragment>,
}

impl FragmentEmitter {
    /// Register one fragment. Emission order is preserved for result
    /// correlation.
    pub fn emit(&mut self, handler: Box<dyn FragmentHandler>, arg: DataValue, target: &NodeId) {
        self.fragments.push(Fragment {
            handler,
            arg,
            target: target.clone(),
        });
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub(crate) fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}
