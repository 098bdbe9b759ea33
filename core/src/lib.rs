//! Ember Core - client-facing distributed compute and cache grid
//!
//! This crate provides the client abstraction over a distributed compute
//! grid: task submission (`run`, `map_reduce`), node-bound job fragments
//! dispatched by registered handler, and a deep-equality-keyed cache
//! exposed both asynchronously to the client and as blocking calls inside
//! fragments.

pub mod cache;
pub mod client;
pub mod cluster;
pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod handlers;
pub mod task;

pub use cache::{ClientCache, FragmentCache};
pub use client::GridClient;
pub use cluster::{ClusterNode, NodeId};
pub use compute::Compute;
pub use config::GridConfig;
pub use engine::{GridEngine, LocalEngine};
pub use error::{GridError, GridResult};
pub use fragment::{
    Fragment, FragmentContext, FragmentEmitter, FragmentEnvelope, FragmentHandler,
};
pub use task::{TaskMapper, TaskReducer};

pub use ember_common::value::{CacheEntry, DataValue};
