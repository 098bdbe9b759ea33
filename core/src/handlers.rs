//! Stock fragment handlers.
//!
//! Small, generally useful handlers shipped with the crate. Applications
//! register their own the same way: a serde-derived struct plus a
//! `#[typetag::serde]` impl of [`FragmentHandler`].

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::fragment::{FragmentContext, FragmentHandler};
use ember_common::value::{CacheEntry, DataValue};

/// Returns the argument unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoHandler;

#[typetag::serde]
impl FragmentHandler for EchoHandler {
    fn run(&self, _ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        Ok(arg)
    }
}

/// Returns the argument suffixed with the executing node's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeNameHandler;

#[typetag::serde]
impl FragmentHandler for NodeNameHandler {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let text = match &arg {
            DataValue::String(s) => format!("{} {}", s, ctx.local_node().name()),
            other => format!("{} {}", other, ctx.local_node().name()),
        };
        Ok(DataValue::String(text))
    }
}

/// Returns the executing node's identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeIdHandler;

#[typetag::serde]
impl FragmentHandler for NodeIdHandler {
    fn run(&self, ctx: &FragmentContext, _arg: DataValue) -> anyhow::Result<DataValue> {
        Ok(DataValue::String(ctx.local_node().id().as_str().to_string()))
    }
}

/// Returns the length of the argument string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordLengthHandler;

#[typetag::serde]
impl FragmentHandler for WordLengthHandler {
    fn run(&self, _ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let word = arg
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("expected a string argument, got {arg}"))?;
        Ok(DataValue::from(word.chars().count() as u64))
    }
}

/// Stores an entry in the named cache and returns the previous value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachePutHandler {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for CachePutHandler {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        let entry: CacheEntry =
            serde_json::from_value(arg).context("argument must be a {key, value} entry")?;
        let previous = ctx.cache(&self.cache).get_and_put(entry.key, entry.value);
        Ok(previous.unwrap_or(DataValue::Null))
    }
}

/// Reads a key from the named cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheGetHandler {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for CacheGetHandler {
    fn run(&self, ctx: &FragmentContext, arg: DataValue) -> anyhow::Result<DataValue> {
        Ok(ctx.cache(&self.cache).get(&arg).unwrap_or(DataValue::Null))
    }
}

/// Returns the entry count of the named cache's partition on this node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSizeHandler {
    pub cache: String,
}

#[typetag::serde]
impl FragmentHandler for LocalSizeHandler {
    fn run(&self, ctx: &FragmentContext, _arg: DataValue) -> anyhow::Result<DataValue> {
        Ok(DataValue::from(ctx.cache(&self.cache).local_size()))
    }
}
