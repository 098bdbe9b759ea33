//! Task submission: map, distribute, collect in order, reduce.
//!
//! A task exists only for the duration of one submission. The single
//! ordering guarantee: the reduce step observes fragment results in
//! emission order, regardless of remote completion order.

use futures::future::join_all;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cluster::{ClusterNode, NodeId};
use crate::engine::GridEngine;
use crate::error::{GridError, GridResult};
use crate::fragment::{Fragment, FragmentEmitter, FragmentEnvelope, FragmentHandler};
use ember_common::value::DataValue;

/// Produces the fragments of a task from the membership view and the task
/// argument.
pub trait TaskMapper: Send + Sync + Debug {
    fn map(
        &self,
        nodes: &[ClusterNode],
        arg: DataValue,
        emitter: &mut FragmentEmitter,
    ) -> anyhow::Result<()>;
}

/// Combines the ordered fragment results into the task outcome. Runs once,
/// in-process, after every fragment has completed.
pub trait TaskReducer: Send + Sync + Debug {
    fn reduce(&self, results: Vec<DataValue>) -> anyhow::Result<DataValue>;
}

/// Execute one handler on the chosen node and return its value or error.
pub(crate) async fn submit_run(
    engine: &Arc<dyn GridEngine>,
    handler: Box<dyn FragmentHandler>,
    arg: DataValue,
    target: NodeId,
) -> GridResult<DataValue> {
    let envelope = FragmentEnvelope {
        task_id: Uuid::new_v4().to_string(),
        seq: 0,
        fragment: Fragment {
            handler,
            arg,
            target,
        },
    };
    engine.execute(envelope).await
}

/// Run a full map/reduce round.
///
/// If the map step errors, or any fragment fails, the task fails with an
/// evaluation error and the reducer is never invoked.
pub(crate) async fn submit_map_reduce(
    engine: &Arc<dyn GridEngine>,
    mapper: &dyn TaskMapper,
    reducer: &dyn TaskReducer,
    arg: DataValue,
) -> GridResult<DataValue> {
    let task_id = Uuid::new_v4().to_string();
    let nodes = engine.topology().await?;

    let mut emitter = FragmentEmitter::default();
    mapper
        .map(&nodes, arg, &mut emitter)
        .map_err(|err| GridError::evaluation(format!("map step failed: {err}")))?;

    let fragments = emitter.into_fragments();
    debug!(task = %task_id, fragments = fragments.len(), "submitting task");

    let submissions = fragments.into_iter().enumerate().map(|(seq, fragment)| {
        let envelope = FragmentEnvelope {
            task_id: task_id.clone(),
            seq,
            fragment,
        };
        let engine = Arc::clone(engine);
        async move { engine.execute(envelope).await }
    });

    // join_all yields outcomes in submission order whatever the completion
    // order on the engine side
    let outcomes = join_all(submissions).await;

    let mut results = Vec::with_capacity(outcomes.len());
    for (seq, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(value) => results.push(value),
            Err(err) => {
                warn!(task = %task_id, seq, %err, "fragment failed, aborting task");
                return Err(into_evaluation(err));
            }
        }
    }

    debug!(task = %task_id, results = results.len(), "reducing");
    reducer
        .reduce(results)
        .map_err(|err| GridError::evaluation(format!("reduce step failed: {err}")))
}

/// Fold any fragment-side failure into the evaluation class the contract
/// promises to callers.
fn into_evaluation(err: GridError) -> GridError {
    match err {
        err @ GridError::Evaluation(_) => err,
        other => GridError::evaluation(other.to_string()),
    }
}
