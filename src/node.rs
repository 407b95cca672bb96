//! # Node Architecture
//!
//! This module defines the `Node` trait through which the graph host drives
//! the HTTP nodes. All data flows as `Arc<dyn Any + Send + Sync>` items on
//! named port streams.
//!
//! ## Ports
//!
//! - Input ports: `HashMap<String, InputStream>`
//! - Output ports: `HashMap<String, OutputStream>`
//! - Nodes consume input streams and produce output streams
//! - Channels are used internally for backpressure, but never exposed to nodes
//!
//! ## Execution Model
//!
//! The graph host:
//! 1. Collects input streams for each node from connected upstream nodes
//! 2. Calls `execute(inputs)` which returns output streams
//! 3. Connects output streams to downstream nodes' input streams
//! 4. Drives all streams to completion
//!
//! Dropping an input stream is how a node retires a port it no longer observes.

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// Type alias for input streams.
///
/// Input streams are pinned, boxed streams that yield `Arc<dyn Any + Send + Sync>` items.
pub type InputStream = Pin<Box<dyn Stream<Item = Arc<dyn Any + Send + Sync>> + Send>>;

/// Type alias for output streams.
///
/// Output streams are pinned, boxed streams that yield `Arc<dyn Any + Send + Sync>` items.
pub type OutputStream = Pin<Box<dyn Stream<Item = Arc<dyn Any + Send + Sync>> + Send>>;

/// Type alias for a collection of input streams, keyed by port name.
pub type InputStreams = HashMap<String, InputStream>;

/// Type alias for a collection of output streams, keyed by port name.
pub type OutputStreams = HashMap<String, OutputStream>;

/// Error type for node execution operations.
pub type NodeExecutionError = Box<dyn std::error::Error + Send + Sync>;

/// The node trait implemented by every HTTP node.
///
/// # Execution Model
///
/// 1. The host collects input streams for a node from upstream nodes
/// 2. Calls `execute(inputs)` with those streams
/// 3. The node processes streams and returns output streams
/// 4. The host connects output streams to downstream nodes
///
/// An `Err` from `execute` is a startup failure (e.g. a required port is not
/// connected) and happens before any item is processed.
///
/// # Type Safety
///
/// Nodes are responsible for downcasting to their expected types when receiving
/// data from input streams.
#[async_trait]
pub trait Node: Send + Sync {
  /// Returns the name of the node.
  fn name(&self) -> &str;

  /// Sets the name of the node.
  fn set_name(&mut self, name: &str);

  /// Returns the names of all input ports, in order.
  fn input_port_names(&self) -> &[String];

  /// Returns the names of all output ports, in order.
  fn output_port_names(&self) -> &[String];

  /// Checks if this node has an input port with the given name.
  fn has_input_port(&self, name: &str) -> bool;

  /// Checks if this node has an output port with the given name.
  fn has_output_port(&self, name: &str) -> bool;

  /// Executes the node's logic.
  ///
  /// # Arguments
  ///
  /// * `inputs` - Input streams keyed by port name. The node removes the
  ///   streams it needs; streams that are not removed are dropped.
  ///
  /// # Returns
  ///
  /// Output streams keyed by port name.
  fn execute(
    &self,
    inputs: InputStreams,
  ) -> Pin<Box<dyn Future<Output = Result<OutputStreams, NodeExecutionError>> + Send + '_>>;
}
