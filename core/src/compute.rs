//! Compute handle: the task submission surface of a client session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use crate::engine::GridEngine;
use crate::error::{GridError, GridResult};
use crate::fragment::FragmentHandler;
use crate::task::{self, TaskMapper, TaskReducer};
use ember_common::value::DataValue;

/// Handle for submitting tasks to the grid.
#[derive(Debug, Clone)]
pub struct Compute {
    engine: Arc<dyn GridEngine>,
    next_node: Arc<AtomicUsize>,
}

impl Compute {
    pub(crate) fn new(engine: Arc<dyn GridEngine>, next_node: Arc<AtomicUsize>) -> Self {
        Self { engine, next_node }
    }

    /// Execute `handler(arg)` on exactly one node and return its value or
    /// error. The node is chosen round-robin over the current topology.
    pub async fn run(
        &self,
        handler: Box<dyn FragmentHandler>,
        arg: DataValue,
    ) -> GridResult<DataValue> {
        let nodes = self.engine.topology().await?;
        if nodes.is_empty() {
            return Err(GridError::topology("no nodes available"));
        }
        let index = self.next_node.fetch_add(1, Ordering::AcqRel) % nodes.len();
        let target = nodes[index].id().clone();
        debug!(node = %target, "running single fragment");
        task::submit_run(&self.engine, handler, arg, target).await
    }

    /// Execute a full map/reduce round: the mapper emits node-bound
    /// fragments, the reducer combines their ordered results.
    pub async fn map_reduce(
        &self,
        mapper: &dyn TaskMapper,
        reducer: &dyn TaskReducer,
        arg: DataValue,
    ) -> GridResult<DataValue> {
        task::submit_map_reduce(&self.engine, mapper, reducer, arg).await
    }
}
