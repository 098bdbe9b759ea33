//! Common test utilities, handlers, and mappers for the integration tests.

#![allow(dead_code)] // each test binary uses its own subset

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ember_core::cluster::{ClusterNode, NodeId};
use ember_core::fragment::{FragmentContext, FragmentEmitter, FragmentHandler};
use ember_core::task::{TaskMapper, TaskReducer};
use ember_core::{DataValue, GridClient, GridConfig};

/// Connect a client backed by an embedded cluster of `nodes` nodes.
pub async fn connect(nodes: usize) -> GridClient {
    init_tracing();
    GridClient::connect(GridConfig::new("ember-test", nodes))
        .await
        .expect("failed to connect test client")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// handlers
// ---------------------------------------------------------------------------

/// Sleeps, then echoes its argument. Used to skew completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepEchoHandler {
    pub delay_ms: u64,
}

#[typetag::serde]
impl FragmentHandler for SleepEchoHandler {
    fn run(&self, _ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        std::thread::sleep(Duration::from_millis(self.delay_ms));
        Ok(arg)
    }
}

/// Always fails with the given message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailingHandler {
    pub message: String,
}

#[typetag::serde]
impl FragmentHandler for FailingHandler {
    fn run(&self, _ctx: &FragmentContext, _arg: DataValue) -> anyhow::Result<DataValue> {
        anyhow::bail!("{}", self.message)
    }
}

/// Panics instead of returning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanickingHandler;

#[typetag::serde]
impl FragmentHandler for PanickingHandler {
    fn run(&self, _ctx: &FragmentContext, _arg: DataValue) -> anyhow::Result<DataValue> {
        panic!("handler blew up");
    }
}

/// `get_and_put_if_absent(arg, arg)` must observe an absent key, then the
/// argument is returned for the reduce step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAndPutIfAbsentProbe {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for GetAndPutIfAbsentProbe {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let previous = ctx
            .cache(&self.cache)
            .get_and_put_if_absent(arg.clone(), arg.clone());
        if previous.is_some() {
            anyhow::bail!("get_and_put_if_absent observed an existing entry for {arg}");
        }
        Ok(arg)
    }
}

/// Inserts an entry with `put_if_absent` (must succeed, then fail), then
/// removes it with `get_and_remove` and returns the removed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutAbsentThenRemoveProbe {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for PutAbsentThenRemoveProbe {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let entry: ember_core::CacheEntry = serde_json::from_value(arg)?;
        let cache = ctx.cache(&self.cache);

        if !cache.put_if_absent(entry.key.clone(), entry.value.clone()) {
            anyhow::bail!("first put_if_absent must insert");
        }
        if cache.put_if_absent(entry.key.clone(), json!("1")) {
            anyhow::bail!("second put_if_absent must not insert");
        }
        cache
            .get_and_remove(&entry.key)
            .ok_or_else(|| anyhow::anyhow!("entry vanished before get_and_remove"))
    }
}

/// Writes a marker under the argument key and verifies `contains_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainsKeyProbe {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for ContainsKeyProbe {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let cache = ctx.cache(&self.cache);
        cache.put(arg.clone(), json!("[AAAAAAA]"));
        if !cache.contains_key(&arg) {
            anyhow::bail!("contains_key did not observe the entry just written");
        }
        Ok(arg)
    }
}

/// Writes markers under both argument keys and verifies `contains_keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainsKeysProbe {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for ContainsKeysProbe {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let keys: Vec<DataValue> = serde_json::from_value(arg.clone())?;
        let cache = ctx.cache(&self.cache);
        cache.put(keys[0].clone(), json!("[AAAAAAA]"));
        cache.put(keys[1].clone(), json!("[BBBBBBB]"));
        if !cache.contains_keys(&keys) {
            anyhow::bail!("contains_keys did not observe the entries just written");
        }
        Ok(arg)
    }
}

/// `put_all` the given entries, then return `get_all` over the given keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutAllGetAllProbe {
    pub cache: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutAllGetAllArg {
    pub entries: Vec<ember_core::CacheEntry>,
    pub keys: Vec<DataValue>,
}

#[typetag::serde]
impl FragmentHandler for PutAllGetAllProbe {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let arg: PutAllGetAllArg = serde_json::from_value(arg)?;
        let cache = ctx.cache(&self.cache);
        cache.put_all(arg.entries);
        let found = cache.get_all(&arg.keys);
        Ok(serde_json::to_value(found)?)
    }
}

/// Runs the full remove/replace operation sequence against the blocking
/// facade, erroring on the first contract violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveOperationsProbe {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for RemoveOperationsProbe {
    fn run(&self, ctx: &FragmentContext, _arg: DataValue) -> anyhow::Result<DataValue> {
        let cache = ctx.cache(&self.cache);

        if cache.remove(&json!("key1")) {
            anyhow::bail!("remove on an empty cache must return false");
        }

        let key0 = json!({"keyName": "keyVal"});
        let key1 = json!({"keyName": "keyVal1"});
        let val0 = json!({"valName": 1});
        let val1 = json!({"valName": 2});

        cache.put(key0.clone(), val0.clone());
        if cache.remove_value(&key0, &val1) {
            anyhow::bail!("remove_value must not remove on a value mismatch");
        }
        if !cache.remove(&key0) {
            anyhow::bail!("remove must return true for a present key");
        }

        cache.put(key0.clone(), val0.clone());
        if cache.replace_value(key0.clone(), &val1, val1.clone()) {
            anyhow::bail!("replace_value must not mutate on a value mismatch");
        }

        let previous = cache.get_and_replace(key0.clone(), val1.clone());
        if previous != Some(val0.clone()) {
            anyhow::bail!("get_and_replace must return the previous value, got {previous:?}");
        }
        if cache.get(&key0) != Some(val1.clone()) {
            anyhow::bail!("get_and_replace must have stored the new value");
        }

        cache.clear();
        if cache.get(&key0).is_some() {
            anyhow::bail!("clear must drop every entry");
        }

        cache.put_all(vec![
            ember_core::CacheEntry::new(key0.clone(), val0.clone()),
            ember_core::CacheEntry::new(key1.clone(), val1.clone()),
        ]);
        if !cache.replace(key1.clone(), val0.clone()) {
            anyhow::bail!("replace must mutate a present key");
        }
        if cache.get(&key1) != Some(val0.clone()) {
            anyhow::bail!("replace must have stored the new value");
        }

        cache.remove_all(&[key0, key1]);
        if cache.size() != 0 {
            anyhow::bail!("cache must be empty after remove_all");
        }

        Ok(DataValue::Null)
    }
}

// ---------------------------------------------------------------------------
// mappers and reducers
// ---------------------------------------------------------------------------

/// Emits one clone of the handler per node, bound to that node, with the
/// node's topology index as the argument.
#[derive(Debug)]
pub struct PerNodeMapper {
    pub handler: Box<dyn FragmentHandler>,
}

impl TaskMapper for PerNodeMapper {
    fn map(
        &self,
        nodes: &[ClusterNode],
        _arg: DataValue,
        emitter: &mut FragmentEmitter,
    ) -> anyhow::Result<()> {
        for (index, node) in nodes.iter().enumerate() {
            emitter.emit(self.handler.clone(), json!(index), node.id());
        }
        Ok(())
    }
}

/// Emits the argument items in order with skewed delays, so that later
/// emissions complete first.
#[derive(Debug)]
pub struct StaggeredEchoMapper;

impl TaskMapper for StaggeredEchoMapper {
    fn map(
        &self,
        nodes: &[ClusterNode],
        arg: DataValue,
        emitter: &mut FragmentEmitter,
    ) -> anyhow::Result<()> {
        let items = arg
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("expected an array argument"))?;
        let count = items.len() as u64;
        for (index, item) in items.iter().enumerate() {
            let delay_ms = (count - 1 - index as u64) * 80;
            emitter.emit(
                Box::new(SleepEchoHandler { delay_ms }),
                item.clone(),
                nodes[index % nodes.len()].id(),
            );
        }
        Ok(())
    }
}

/// Emits a fragment bound to a node that is not part of the topology.
#[derive(Debug)]
pub struct UnknownTargetMapper;

impl TaskMapper for UnknownTargetMapper {
    fn map(
        &self,
        _nodes: &[ClusterNode],
        arg: DataValue,
        emitter: &mut FragmentEmitter,
    ) -> anyhow::Result<()> {
        emitter.emit(
            Box::new(ember_core::handlers::EchoHandler),
            arg,
            &NodeId::from("not-a-member"),
        );
        Ok(())
    }
}

/// Fails during the map step itself.
#[derive(Debug)]
pub struct FailingMapper;

impl TaskMapper for FailingMapper {
    fn map(
        &self,
        _nodes: &[ClusterNode],
        _arg: DataValue,
        _emitter: &mut FragmentEmitter,
    ) -> anyhow::Result<()> {
        anyhow::bail!("map step references an undefined symbol")
    }
}

/// Returns the ordered results unchanged, recording that it ran.
#[derive(Debug)]
pub struct CollectReducer {
    pub invoked: Arc<AtomicBool>,
}

impl CollectReducer {
    pub fn new() -> Self {
        Self {
            invoked: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn was_invoked(&self) -> bool {
        self.invoked.load(Ordering::Acquire)
    }
}

impl TaskReducer for CollectReducer {
    fn reduce(&self, results: Vec<DataValue>) -> anyhow::Result<DataValue> {
        self.invoked.store(true, Ordering::Release);
        Ok(DataValue::Array(results))
    }
}

/// Sums numeric results.
#[derive(Debug)]
pub struct SumReducer;

impl TaskReducer for SumReducer {
    fn reduce(&self, results: Vec<DataValue>) -> anyhow::Result<DataValue> {
        let mut sum = 0u64;
        for value in &results {
            sum += value
                .as_u64()
                .ok_or_else(|| anyhow::anyhow!("expected a numeric result, got {value}"))?;
        }
        Ok(DataValue::from(sum))
    }
}

/// Always fails during the reduce step.
#[derive(Debug)]
pub struct FailingReducer;

impl TaskReducer for FailingReducer {
    fn reduce(&self, _results: Vec<DataValue>) -> anyhow::Result<DataValue> {
        anyhow::bail!("reduce step rejected the results")
    }
}
