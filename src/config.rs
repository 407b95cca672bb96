//! Configuration for the HTTP nodes.
//!
//! Both configs follow the same conventions: `Default` values, `with_*`
//! builder methods, serde deserialization (missing fields take defaults) and
//! a `validate()` that runs before a node is constructed.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default bounded capacity of each output channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10;

/// Configuration of [`HttpRouterNode`](crate::nodes::HttpRouterNode).
///
/// `pattern_ports[i]` delivers the route for destination `i`; requests matching
/// it leave on `success_ports[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
  /// Registration input ports, one per destination.
  pub pattern_ports: Vec<String>,
  /// Success output ports, one per destination.
  pub success_ports: Vec<String>,
  /// Request input port.
  pub request_port: String,
  /// Output port for synthesized 404/405 responses.
  pub fail_port: String,
  /// Capacity of each output channel.
  pub channel_capacity: usize,
}

impl Default for RouterConfig {
  fn default() -> Self {
    Self::with_destinations(1)
  }
}

impl RouterConfig {
  /// Config with `count` destinations on ports `pattern_<i>` / `success_<i>`.
  pub fn with_destinations(count: usize) -> Self {
    Self {
      pattern_ports: (0..count).map(|i| format!("pattern_{i}")).collect(),
      success_ports: (0..count).map(|i| format!("success_{i}")).collect(),
      request_port: "request".to_string(),
      fail_port: "fail".to_string(),
      channel_capacity: DEFAULT_CHANNEL_CAPACITY,
    }
  }

  /// Parses a JSON config and validates it.
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  /// Replaces the registration/success port pairs.
  pub fn with_ports<P, S>(mut self, pattern_ports: P, success_ports: S) -> Self
  where
    P: IntoIterator,
    P::Item: Into<String>,
    S: IntoIterator,
    S::Item: Into<String>,
  {
    self.pattern_ports = pattern_ports.into_iter().map(Into::into).collect();
    self.success_ports = success_ports.into_iter().map(Into::into).collect();
    self
  }

  /// Sets the request port name.
  pub fn with_request_port(mut self, name: impl Into<String>) -> Self {
    self.request_port = name.into();
    self
  }

  /// Sets the fail port name.
  pub fn with_fail_port(mut self, name: impl Into<String>) -> Self {
    self.fail_port = name.into();
    self
  }

  /// Sets the output channel capacity.
  pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
    self.channel_capacity = capacity;
    self
  }

  /// Number of destinations.
  pub fn destinations(&self) -> usize {
    self.success_ports.len()
  }

  /// Checks port lists and capacity.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.pattern_ports.is_empty() {
      return Err(ConfigError::NoDestinations);
    }
    if self.pattern_ports.len() != self.success_ports.len() {
      return Err(ConfigError::PortCountMismatch {
        patterns: self.pattern_ports.len(),
        successes: self.success_ports.len(),
      });
    }
    if self.channel_capacity == 0 {
      return Err(ConfigError::ZeroCapacity);
    }

    let inputs = self
      .pattern_ports
      .iter()
      .chain(std::iter::once(&self.request_port));
    let outputs = self
      .success_ports
      .iter()
      .chain(std::iter::once(&self.fail_port));
    check_unique(inputs)?;
    check_unique(outputs)
  }
}

/// Configuration of [`HttpRequestNode`](crate::nodes::HttpRequestNode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
  /// Request timeout in seconds.
  pub timeout_secs: u64,
  /// Skip TLS certificate validation (for private CAs).
  pub accept_invalid_certs: bool,
  /// Wait for a value on the `headers` port before each call.
  pub use_headers: bool,
  /// Wait for a value on the `form` port before each call.
  pub use_form: bool,
  /// Capacity of each output channel.
  pub channel_capacity: usize,
}

impl Default for HttpClientConfig {
  fn default() -> Self {
    Self {
      timeout_secs: 30,
      accept_invalid_certs: false,
      use_headers: false,
      use_form: false,
      channel_capacity: DEFAULT_CHANNEL_CAPACITY,
    }
  }
}

impl HttpClientConfig {
  /// Parses a JSON config and validates it.
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  /// Sets the request timeout in seconds.
  pub fn with_timeout_secs(mut self, secs: u64) -> Self {
    self.timeout_secs = secs;
    self
  }

  /// Sets whether invalid TLS certificates are accepted.
  pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
    self.accept_invalid_certs = accept;
    self
  }

  /// Sets whether the `headers` port is part of each call.
  pub fn with_headers(mut self, enabled: bool) -> Self {
    self.use_headers = enabled;
    self
  }

  /// Sets whether the `form` port is part of each call.
  pub fn with_form(mut self, enabled: bool) -> Self {
    self.use_form = enabled;
    self
  }

  /// Sets the output channel capacity.
  pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
    self.channel_capacity = capacity;
    self
  }

  /// Checks value ranges.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.channel_capacity == 0 {
      return Err(ConfigError::ZeroCapacity);
    }
    Ok(())
  }
}

fn check_unique<'a>(names: impl Iterator<Item = &'a String>) -> Result<(), ConfigError> {
  let mut seen = HashSet::new();
  for name in names {
    if name.is_empty() {
      return Err(ConfigError::EmptyPortName);
    }
    if !seen.insert(name.as_str()) {
      return Err(ConfigError::DuplicatePortName(name.clone()));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_router_config_defaults() {
    let config = RouterConfig::with_destinations(3);
    assert_eq!(config.pattern_ports, vec!["pattern_0", "pattern_1", "pattern_2"]);
    assert_eq!(config.success_ports[2], "success_2");
    assert_eq!(config.destinations(), 3);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_router_config_requires_matching_port_counts() {
    let config = RouterConfig::default().with_ports(["a", "b"], ["ok"]);
    assert_eq!(
      config.validate(),
      Err(ConfigError::PortCountMismatch {
        patterns: 2,
        successes: 1
      })
    );
    assert_eq!(
      RouterConfig::with_destinations(0).validate(),
      Err(ConfigError::NoDestinations)
    );
  }

  #[test]
  fn test_router_config_rejects_duplicate_and_empty_ports() {
    let config = RouterConfig::default().with_request_port("pattern_0");
    assert_eq!(
      config.validate(),
      Err(ConfigError::DuplicatePortName("pattern_0".to_string()))
    );
    let config = RouterConfig::default().with_fail_port("");
    assert_eq!(config.validate(), Err(ConfigError::EmptyPortName));
  }

  #[test]
  fn test_router_config_from_json() {
    let config = RouterConfig::from_json_str(
      r#"{"pattern_ports":["users","orders"],"success_ports":["to_users","to_orders"]}"#,
    )
    .unwrap();
    assert_eq!(config.request_port, "request");
    assert_eq!(config.fail_port, "fail");
    assert_eq!(config.destinations(), 2);

    assert!(matches!(
      RouterConfig::from_json_str(r#"{"pattern_ports":["a"],"success_ports":[]}"#),
      Err(ConfigError::PortCountMismatch { .. })
    ));
    assert!(matches!(
      RouterConfig::from_json_str("{"),
      Err(ConfigError::Parse(_))
    ));
  }

  #[test]
  fn test_client_config() {
    let config = HttpClientConfig::from_json_str(r#"{"timeout_secs":5,"use_form":true}"#).unwrap();
    assert_eq!(config.timeout_secs, 5);
    assert!(config.use_form);
    assert!(!config.use_headers);
    assert!(!config.accept_invalid_certs);
    assert_eq!(
      HttpClientConfig::default().with_channel_capacity(0).validate(),
      Err(ConfigError::ZeroCapacity)
    );
  }
}
