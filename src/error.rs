//! Error types for the HTTP nodes.
//!
//! Routing misses (`NotFound`, `MethodNotAllowed`) are not errors; they are
//! [`MatchResult`](crate::router::MatchResult) variants. Everything here is
//! either a skipped input (registration-time errors) or a startup failure.

use crate::router::{Destination, HttpMethod, SourceId};
use thiserror::Error;

/// Errors raised while compiling patterns, registering routes, or driving
/// the registration/dispatch controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
  /// The route template could not be compiled.
  #[error("malformed pattern '{pattern}': {reason}")]
  MalformedPattern {
    /// Template as received.
    pattern: String,
    /// What is wrong with it.
    reason: String,
  },
  /// The exact `(method, pattern)` pair is already registered.
  #[error("route {method} {pattern} is already registered (destination {existing})")]
  DuplicateRoute {
    /// Method of the rejected route.
    method: HttpMethod,
    /// Normalized pattern of the rejected route.
    pattern: String,
    /// Destination already bound to the pair.
    existing: Destination,
  },
  /// The route table no longer accepts registrations.
  #[error("route table is frozen")]
  TableFrozen,
  /// A registration line is not of the form `"<METHOD> <pattern>"`.
  #[error("malformed registration message '{message}': {reason}")]
  MalformedRegistrationMessage {
    /// Line as received.
    message: String,
    /// What is wrong with it.
    reason: String,
  },
  /// A registration message arrived from a source that is not pending.
  #[error("registration source {0} is not pending")]
  UnknownSource(SourceId),
  /// A request was offered before the registration phase completed.
  #[error("router is still registering routes")]
  NotDispatching,
  /// Sending or receiving on a port failed.
  #[error("transport error on port '{port}': {reason}")]
  Transport {
    /// Port name.
    port: String,
    /// Failure description.
    reason: String,
  },
}

impl RouterError {
  pub(crate) fn malformed_pattern(pattern: &str, reason: impl Into<String>) -> Self {
    Self::MalformedPattern {
      pattern: pattern.to_string(),
      reason: reason.into(),
    }
  }

  pub(crate) fn malformed_message(message: &str, reason: impl Into<String>) -> Self {
    Self::MalformedRegistrationMessage {
      message: message.to_string(),
      reason: reason.into(),
    }
  }
}

/// Invalid node configuration. Always fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  /// The router needs at least one registration/destination pair.
  #[error("at least one pattern port is required")]
  NoDestinations,
  /// Pattern and success port lists differ in length.
  #[error("{patterns} pattern ports but {successes} success ports; lengths must match")]
  PortCountMismatch {
    /// Number of pattern ports.
    patterns: usize,
    /// Number of success ports.
    successes: usize,
  },
  /// A port name is empty.
  #[error("port names must not be empty")]
  EmptyPortName,
  /// A port name is used more than once on the same side of the node.
  #[error("port name '{0}' is used more than once")]
  DuplicatePortName(String),
  /// Channel capacity of zero.
  #[error("channel capacity must be greater than zero")]
  ZeroCapacity,
  /// Configuration text could not be parsed.
  #[error("invalid configuration: {0}")]
  Parse(String),
}

impl From<serde_json::Error> for ConfigError {
  fn from(err: serde_json::Error) -> Self {
    ConfigError::Parse(err.to_string())
  }
}

/// Failure to encode or decode a request/response payload.
#[derive(Error, Debug)]
pub enum CodecError {
  /// JSON (de)serialization failed.
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
  /// Payload bytes are not valid UTF-8.
  #[error("payload is not valid utf-8: {0}")]
  Utf8(#[from] std::str::Utf8Error),
  /// The item on the port has a type the node does not understand.
  #[error("unsupported payload type, expected {0}")]
  UnsupportedPayload(&'static str),
}

/// Errors raised by the outbound HTTP request node.
#[derive(Error, Debug)]
pub enum HttpClientError {
  /// The HTTP client could not be built.
  #[error("failed to build http client: {0}")]
  Build(#[source] reqwest::Error),
  /// The request failed (connect, timeout, TLS, body read).
  #[error("{method} {url}: {source}")]
  Request {
    /// Request method.
    method: String,
    /// Request URL.
    url: String,
    /// Underlying client error.
    #[source]
    source: reqwest::Error,
  },
  /// The method token is not a valid HTTP method.
  #[error("invalid http method '{0}'")]
  InvalidMethod(String),
  /// Form data could not be URL-encoded.
  #[error("failed to encode form data: {0}")]
  Form(#[from] serde_urlencoded::ser::Error),
  /// A header or form payload could not be decoded.
  #[error(transparent)]
  Codec(#[from] CodecError),
}
