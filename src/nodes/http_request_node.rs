//! # HTTP Request Node
//!
//! Performs outbound HTTP calls assembled from several input ports.
//!
//! ## Ports
//!
//! - **Input**: `"url"` - Target URL (`String`)
//! - **Input**: `"method"` - Method token (`String`, uppercased)
//! - **Input**: `"headers"` - `HashMap<String, Vec<String>>` or its JSON; only read when enabled
//! - **Input**: `"form"` - `HashMap<String, Vec<String>>` or its JSON, sent URL-encoded; only read when enabled
//! - **Output**: `"response"` - `HttpResponse` with status, headers and body
//! - **Output**: `"body"` - Raw response body (`Vec<u8>`)
//! - **Output**: `"error"` - Error text (`String`) when the call fails
//!
//! The latest value of each port is kept. As soon as every required value is
//! present the call is made and all kept values are cleared.

use crate::config::HttpClientConfig;
use crate::error::{ConfigError, HttpClientError};
use crate::http::{HttpResponse, ValuesMap};
use crate::node::{InputStreams, Node, NodeExecutionError, OutputStreams};
use crate::nodes::common::{
  BaseNode, Item, OutputSender, item_to_text, item_to_values, output_port, send_to_port,
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use http::header::CONTENT_TYPE;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

const URL_PORT: &str = "url";
const METHOD_PORT: &str = "method";
const HEADERS_PORT: &str = "headers";
const FORM_PORT: &str = "form";
const RESPONSE_PORT: &str = "response";
const BODY_PORT: &str = "body";
const ERROR_PORT: &str = "error";

/// A fully assembled outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
  /// Uppercase method token.
  pub method: String,
  /// Target URL.
  pub url: String,
  /// Headers; the first value of each name is sent.
  pub headers: ValuesMap,
  /// Form values, sent URL-encoded as the body.
  pub form: Option<ValuesMap>,
}

/// Latest value received on each input port.
#[derive(Debug, Default)]
pub(crate) struct PendingCall {
  url: Option<String>,
  method: Option<String>,
  headers: Option<ValuesMap>,
  form: Option<ValuesMap>,
}

impl PendingCall {
  pub(crate) fn set_url(&mut self, url: String) {
    self.url = Some(url.trim().to_string());
  }

  pub(crate) fn set_method(&mut self, method: String) {
    self.method = Some(method.trim().to_uppercase());
  }

  pub(crate) fn set_headers(&mut self, headers: ValuesMap) {
    self.headers = Some(headers);
  }

  pub(crate) fn set_form(&mut self, form: ValuesMap) {
    self.form = Some(form);
  }

  /// Takes the assembled call if every required value is present.
  pub(crate) fn take_ready(&mut self, config: &HttpClientConfig) -> Option<OutboundRequest> {
    let ready = self.url.as_deref().is_some_and(|u| !u.is_empty())
      && self.method.as_deref().is_some_and(|m| !m.is_empty())
      && (!config.use_headers || self.headers.is_some())
      && (!config.use_form || self.form.is_some());
    if !ready {
      return None;
    }
    let taken = std::mem::take(self);
    Some(OutboundRequest {
      method: taken.method.unwrap_or_default(),
      url: taken.url.unwrap_or_default(),
      headers: taken.headers.unwrap_or_default(),
      form: taken.form,
    })
  }
}

/// Builds the shared HTTP client.
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client, HttpClientError> {
  reqwest::Client::builder()
    .timeout(Duration::from_secs(config.timeout_secs))
    .danger_accept_invalid_certs(config.accept_invalid_certs)
    .build()
    .map_err(HttpClientError::Build)
}

/// Performs one call and collects the full response.
pub async fn perform(
  client: &reqwest::Client,
  call: &OutboundRequest,
) -> Result<HttpResponse, HttpClientError> {
  let method = http::Method::from_bytes(call.method.as_bytes())
    .map_err(|_| HttpClientError::InvalidMethod(call.method.clone()))?;
  let request_error = |source: reqwest::Error| HttpClientError::Request {
    method: call.method.clone(),
    url: call.url.clone(),
    source,
  };

  let mut builder = client.request(method, &call.url);
  for (name, values) in &call.headers {
    if let Some(value) = values.first() {
      builder = builder.header(name, value);
    }
  }
  if let Some(form) = &call.form {
    let pairs: Vec<(&str, &str)> = form
      .iter()
      .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
      .collect();
    builder = builder
      .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(serde_urlencoded::to_string(pairs)?);
  }

  let response = builder.send().await.map_err(request_error)?;
  let status = response.status().as_u16();
  let mut headers = ValuesMap::new();
  for (name, value) in response.headers() {
    headers
      .entry(name.as_str().to_string())
      .or_default()
      .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
  }
  let body = response.bytes().await.map_err(request_error)?.to_vec();

  Ok(HttpResponse {
    id: String::new(),
    status,
    headers,
    body,
  })
}

/// A node that performs HTTP calls.
pub struct HttpRequestNode {
  /// Base node functionality.
  pub(crate) base: BaseNode,
  /// Client settings.
  config: HttpClientConfig,
}

impl HttpRequestNode {
  /// Creates a request node with the given client settings.
  pub fn new(name: String, config: HttpClientConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    let mut inputs = vec![URL_PORT.to_string(), METHOD_PORT.to_string()];
    if config.use_headers {
      inputs.push(HEADERS_PORT.to_string());
    }
    if config.use_form {
      inputs.push(FORM_PORT.to_string());
    }
    Ok(Self {
      base: BaseNode::new(
        name,
        inputs,
        vec![
          RESPONSE_PORT.to_string(),
          BODY_PORT.to_string(),
          ERROR_PORT.to_string(),
        ],
      ),
      config,
    })
  }

  /// Returns the client settings.
  pub fn config(&self) -> &HttpClientConfig {
    &self.config
  }
}

#[async_trait]
impl Node for HttpRequestNode {
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
    let port_names = self.base.input_port_names().to_vec();

    Box::pin(async move {
      // Tag every input with its port so they can be merged into one stream.
      let mut tagged = Vec::with_capacity(port_names.len());
      for port in port_names {
        let input = inputs
          .remove(&port)
          .ok_or_else(|| format!("Missing '{port}' input"))?;
        tagged.push(input.map(move |item| (port.clone(), item)).boxed());
      }
      let mut merged = stream::select_all(tagged);

      let client = build_client(&config)?;
      let (response_tx, response_stream) = output_port(config.channel_capacity);
      let (body_tx, body_stream) = output_port(config.channel_capacity);
      let (error_tx, error_stream) = output_port(config.channel_capacity);

      tokio::spawn(async move {
        let mut pending = PendingCall::default();
        while let Some((port, item)) = merged.next().await {
          if let Err(err) = accept(&mut pending, &port, &item) {
            warn!(node = %name, port = %port, error = %err, "discarding input");
            continue;
          }
          let Some(call) = pending.take_ready(&config) else {
            continue;
          };

          debug!(node = %name, method = %call.method, url = %call.url, "performing HTTP request");
          match perform(&client, &call).await {
            Ok(response) => {
              let body = response.body.clone();
              if let Err(err) = send_to_port(RESPONSE_PORT, &response_tx, Arc::new(response)).await {
                warn!(node = %name, error = %err, "response not delivered");
              }
              if let Err(err) = send_to_port(BODY_PORT, &body_tx, Arc::new(body)).await {
                warn!(node = %name, error = %err, "body not delivered");
              }
            }
            Err(err) => {
              error!(node = %name, error = %err, "HTTP request failed");
              emit_error(&name, &error_tx, err).await;
            }
          }
        }
        debug!(node = %name, "inputs closed");
      });

      let mut outputs = HashMap::new();
      outputs.insert(RESPONSE_PORT.to_string(), response_stream);
      outputs.insert(BODY_PORT.to_string(), body_stream);
      outputs.insert(ERROR_PORT.to_string(), error_stream);
      Ok(outputs)
    })
  }
}

fn accept(pending: &mut PendingCall, port: &str, item: &Item) -> Result<(), HttpClientError> {
  match port {
    URL_PORT => pending.set_url(item_to_text(item)?),
    METHOD_PORT => pending.set_method(item_to_text(item)?),
    HEADERS_PORT => pending.set_headers(item_to_values(item)?),
    FORM_PORT => pending.set_form(item_to_values(item)?),
    _ => {}
  }
  Ok(())
}

async fn emit_error(name: &str, error_tx: &OutputSender, err: HttpClientError) {
  if let Err(err) = send_to_port(ERROR_PORT, error_tx, Arc::new(err.to_string())).await {
    warn!(node = %name, error = %err, "error not delivered");
  }
}
