//! # HTTP Router Node
//!
//! Routes HTTP requests to one of several outputs by method and path.
//!
//! ## Ports
//!
//! - **Input**: `"pattern_<i>"` - One `"<METHOD> <pattern>"` line binding a route to destination `i`
//! - **Input**: `"request"` - `HttpRequest` items (or their JSON encoding) to route
//! - **Output**: `"success_<i>"` - Requests matching the route of destination `i`,
//!   with path parameters merged into `form`
//! - **Output**: `"fail"` - Synthesized `HttpResponse` with status 404 or 405
//!
//! Port names are configurable through [`RouterConfig`].
//!
//! ## Lifecycle
//!
//! The node first reads only its pattern ports. Each port is dropped as soon
//! as it has delivered a valid route, or when its stream ends. Malformed lines
//! are logged and skipped, leaving the port open for another line. Once every
//! pattern port is retired the route table is frozen and the node starts
//! reading `request`; from then on the table is read-only.
//!
//! Messages are handled one at a time. A shutdown token, if set, ends the loop
//! between two messages.

use crate::config::RouterConfig;
use crate::error::ConfigError;
use crate::node::{InputStream, InputStreams, Node, NodeExecutionError, OutputStreams};
use crate::nodes::common::{
  BaseNode, Item, OutputSender, item_to_request, item_to_text, output_port, send_to_port,
};
use crate::router::{Destination, Dispatch, RouteTable, RouterController, SourceId};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use tokio_stream::{Stream, StreamExt, StreamMap};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Registration stream item: `Some(message)`, then `None` once the port closes.
type RegistrationStream = Pin<Box<dyn Stream<Item = Option<Item>> + Send>>;

/// A node that learns routes from its pattern ports and then routes requests.
pub struct HttpRouterNode {
  /// Base node functionality.
  pub(crate) base: BaseNode,
  /// Port layout.
  config: RouterConfig,
  /// Frozen route table of the first execution that completed registration.
  routes: Arc<OnceLock<Arc<RouteTable>>>,
  /// Optional shutdown signal.
  shutdown: Option<CancellationToken>,
}

impl HttpRouterNode {
  /// Creates a router node with the given port layout.
  pub fn new(name: String, config: RouterConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    let inputs = config
      .pattern_ports
      .iter()
      .cloned()
      .chain(std::iter::once(config.request_port.clone()))
      .collect();
    let outputs = config
      .success_ports
      .iter()
      .cloned()
      .chain(std::iter::once(config.fail_port.clone()))
      .collect();
    debug!(node = %name, destinations = config.destinations(), "HttpRouterNode::new()");
    Ok(Self {
      base: BaseNode::new(name, inputs, outputs),
      config,
      routes: Arc::new(OnceLock::new()),
      shutdown: None,
    })
  }

  /// Creates a router node with `count` destinations on the default port names.
  pub fn with_destinations(name: String, count: usize) -> Result<Self, ConfigError> {
    Self::new(name, RouterConfig::with_destinations(count))
  }

  /// Stops the routing loop when `token` is cancelled.
  pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
    self.shutdown = Some(token);
    self
  }

  /// Returns the port layout.
  pub fn config(&self) -> &RouterConfig {
    &self.config
  }

  /// The frozen route table, once registration has completed.
  pub fn route_table(&self) -> Option<Arc<RouteTable>> {
    self.routes.get().map(Arc::clone)
  }
}

#[async_trait]
impl Node for HttpRouterNode {
  fn name(&self) -> &str {
    self.base.name()
  }

  fn set_name(&mut self, name: &str) {
    self.base.set_name(name);
  }

  fn input_port_names(&self) -> &[String] {
    self.base.input_port_names()
  }

  fn output_port_names(&self) -> &[String] {
    self.base.output_port_names()
  }

  fn has_input_port(&self, name: &str) -> bool {
    self.base.has_input_port(name)
  }

  fn has_output_port(&self, name: &str) -> bool {
    self.base.has_output_port(name)
  }

  fn execute(
    &self,
    mut inputs: InputStreams,
  ) -> Pin<
    Box<dyn std::future::Future<Output = Result<OutputStreams, NodeExecutionError>> + Send + '_>,
  > {
    let name = self.base.name().to_string();
    let config = self.config.clone();
    let routes = Arc::clone(&self.routes);
    let shutdown = self.shutdown.clone().unwrap_or_default();

    Box::pin(async move {
      // Extract input streams; every port is required.
      let mut registrations = StreamMap::new();
      for (index, port) in config.pattern_ports.iter().enumerate() {
        let stream = inputs
          .remove(port)
          .ok_or_else(|| format!("Missing '{port}' input"))?;
        registrations.insert(SourceId(index), with_close_marker(stream));
      }
      let requests = inputs
        .remove(&config.request_port)
        .ok_or_else(|| format!("Missing '{}' input", config.request_port))?;

      let mut outputs = HashMap::new();
      let mut success = Vec::with_capacity(config.success_ports.len());
      for port in &config.success_ports {
        let (tx, stream) = output_port(config.channel_capacity);
        success.push(tx);
        outputs.insert(port.clone(), stream);
      }
      let (fail, fail_stream) = output_port(config.channel_capacity);
      outputs.insert(config.fail_port.clone(), fail_stream);

      let controller = RouterController::new(
        (0..config.pattern_ports.len()).map(|i| (SourceId(i), Destination(i))),
      );

      let task = RouterTask {
        name,
        config,
        controller,
        success,
        fail,
        routes,
        shutdown,
      };
      tokio::spawn(task.run(registrations, requests));

      Ok(outputs)
    })
  }
}

fn with_close_marker(mut input: InputStream) -> RegistrationStream {
  Box::pin(stream! {
    while let Some(item) = input.next().await {
      yield Some(item);
    }
    yield None;
  })
}

struct RouterTask {
  name: String,
  config: RouterConfig,
  controller: RouterController,
  success: Vec<OutputSender>,
  fail: OutputSender,
  routes: Arc<OnceLock<Arc<RouteTable>>>,
  shutdown: CancellationToken,
}

impl RouterTask {
  async fn run(
    mut self,
    registrations: StreamMap<SourceId, RegistrationStream>,
    requests: InputStream,
  ) {
    if !self.register(registrations).await {
      return;
    }
    if let Some(table) = self.controller.frozen_table() {
      info!(node = %self.name, routes = table.len(), "routing requests");
      if self.routes.set(table).is_err() {
        debug!(node = %self.name, "route table already published by an earlier execution");
      }
    }
    self.dispatch(requests).await;
    debug!(node = %self.name, "router stopped");
  }

  /// Registration phase. Returns false if shut down before completion.
  async fn register(&mut self, mut registrations: StreamMap<SourceId, RegistrationStream>) -> bool {
    while !self.controller.is_dispatching() {
      let next = tokio::select! {
        _ = self.shutdown.cancelled() => {
          info!(node = %self.name, "shutdown during route registration");
          return false;
        }
        next = registrations.next() => next,
      };
      let Some((source, message)) = next else {
        // Every source ends with a close marker, so this is not reached while pending.
        break;
      };
      let port = &self.config.pattern_ports[source.0];

      let Some(item) = message else {
        registrations.remove(&source);
        if self.controller.is_pending(source) {
          warn!(node = %self.name, port = %port, "pattern port closed without a route");
          if let Err(err) = self.controller.exhaust(source) {
            warn!(node = %self.name, port = %port, error = %err, "failed to retire pattern port");
          }
        }
        continue;
      };

      let line = match item_to_text(&item) {
        Ok(line) => line,
        Err(err) => {
          warn!(node = %self.name, port = %port, error = %err, "discarding registration message");
          continue;
        }
      };
      match self.controller.register_from(source, &line) {
        Ok(state) => {
          registrations.remove(&source);
          debug!(node = %self.name, port = %port, route = %line.trim(), ?state, "route registered");
        }
        Err(err) => {
          warn!(node = %self.name, port = %port, error = %err, "discarding registration message");
        }
      }
    }
    true
  }

  /// Dispatch phase: route requests until the input ends or shutdown.
  async fn dispatch(&self, mut requests: InputStream) {
    loop {
      let next = tokio::select! {
        _ = self.shutdown.cancelled() => {
          info!(node = %self.name, "shutdown");
          return;
        }
        next = requests.next() => next,
      };
      let Some(item) = next else {
        return;
      };

      let request = match item_to_request(&item) {
        Ok(request) => request,
        Err(err) => {
          warn!(node = %self.name, port = %self.config.request_port, error = %err, "discarding request");
          continue;
        }
      };

      match self.controller.dispatch(request) {
        Ok(Dispatch::Forward {
          destination,
          request,
        }) => {
          let port = &self.config.success_ports[destination.0];
          debug!(
            node = %self.name,
            request_id = %request.id,
            method = %request.method,
            path = %request.path(),
            port = %port,
            "routing request"
          );
          if let Err(err) = send_to_port(port, &self.success[destination.0], Arc::new(request)).await {
            warn!(node = %self.name, error = %err, "routed request not delivered");
          }
        }
        Ok(Dispatch::Reject(response)) => {
          debug!(
            node = %self.name,
            request_id = %response.id,
            status = response.status,
            "rejecting request"
          );
          if let Err(err) = send_to_port(&self.config.fail_port, &self.fail, Arc::new(response)).await {
            warn!(node = %self.name, error = %err, "fail response not delivered");
          }
        }
        Err(err) => {
          warn!(node = %self.name, error = %err, "request not routed");
        }
      }
    }
  }
}
