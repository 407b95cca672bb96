//! # Common Node Utilities
//!
//! Shared helpers for the HTTP nodes: port metadata, payload downcasting and
//! output channel plumbing.

use crate::error::{CodecError, RouterError};
use crate::http::{HttpRequest, ValuesMap, decode_request};
use crate::node::OutputStream;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Item type carried on every port.
pub type Item = Arc<dyn Any + Send + Sync>;

/// Sender half of an output port.
pub type OutputSender = mpsc::Sender<Item>;

/// Type alias for commonly used sender type in tests to reduce type complexity.
#[cfg(test)]
pub type TestSender = mpsc::Sender<Item>;

/// Creates an output port: the sender the node writes to and the stream the
/// host reads from.
pub fn output_port(capacity: usize) -> (OutputSender, OutputStream) {
  let (tx, rx) = mpsc::channel(capacity);
  (tx, Box::pin(ReceiverStream::new(rx)))
}

/// Sends `item` on `port`.
///
/// # Errors
///
/// [`RouterError::Transport`] if the receiver of `port` has been dropped; the
/// item is lost.
pub async fn send_to_port(port: &str, sender: &OutputSender, item: Item) -> Result<(), RouterError> {
  sender
    .send(item)
    .await
    .map_err(|_| RouterError::Transport {
      port: port.to_string(),
      reason: "output channel receiver dropped".to_string(),
    })
}

/// Reads a text payload: `String`, `&'static str` or UTF-8 `Vec<u8>`.
pub fn item_to_text(item: &Item) -> Result<String, CodecError> {
  if let Some(text) = item.downcast_ref::<String>() {
    return Ok(text.clone());
  }
  if let Some(text) = item.downcast_ref::<&'static str>() {
    return Ok((*text).to_string());
  }
  if let Some(bytes) = item.downcast_ref::<Vec<u8>>() {
    return Ok(std::str::from_utf8(bytes)?.to_string());
  }
  Err(CodecError::UnsupportedPayload("String, &str or Vec<u8>"))
}

/// Reads a request payload: `HttpRequest` or its JSON encoding.
pub fn item_to_request(item: &Item) -> Result<HttpRequest, CodecError> {
  if let Some(request) = item.downcast_ref::<HttpRequest>() {
    return Ok(request.clone());
  }
  if let Some(bytes) = item.downcast_ref::<Vec<u8>>() {
    return decode_request(bytes);
  }
  match item_to_text(item) {
    Ok(text) => decode_request(text.as_bytes()),
    Err(_) => Err(CodecError::UnsupportedPayload("HttpRequest or JSON payload")),
  }
}

/// Reads a multi-valued map: `HashMap<String, Vec<String>>` or its JSON encoding.
pub fn item_to_values(item: &Item) -> Result<ValuesMap, CodecError> {
  if let Some(values) = item.downcast_ref::<ValuesMap>() {
    return Ok(values.clone());
  }
  let text = item_to_text(item)?;
  Ok(serde_json::from_str(&text)?)
}

/// Base node structure that stores the node's name and port names and
/// provides the `Node` trait's metadata methods.
pub struct BaseNode {
  /// Node name.
  pub name: String,
  /// Input port names, in order.
  pub input_port_names: Vec<String>,
  /// Output port names, in order.
  pub output_port_names: Vec<String>,
}

impl BaseNode {
  /// Creates a new BaseNode with the given name and port names.
  pub fn new(name: String, input_port_names: Vec<String>, output_port_names: Vec<String>) -> Self {
    Self {
      name,
      input_port_names,
      output_port_names,
    }
  }

  /// Returns the node's name.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Sets the node's name.
  pub fn set_name(&mut self, name: &str) {
    self.name = name.to_string();
  }

  /// Returns the list of input port names.
  pub fn input_port_names(&self) -> &[String] {
    &self.input_port_names
  }

  /// Returns the list of output port names.
  pub fn output_port_names(&self) -> &[String] {
    &self.output_port_names
  }

  /// Checks if the node has an input port with the given name.
  pub fn has_input_port(&self, name: &str) -> bool {
    self.input_port_names.iter().any(|port| port == name)
  }

  /// Checks if the node has an output port with the given name.
  pub fn has_output_port(&self, name: &str) -> bool {
    self.output_port_names.iter().any(|port| port == name)
  }
}
