//! # HTTP Types
//!
//! [`HttpRequest`] is what the router receives and forwards. Its `form` map is
//! the parameter container the router extends with matched path parameters.
//! [`HttpResponse`] is what the HTTP request node emits and what the router
//! synthesizes for routing misses.
//!
//! The JSON encoding uses the field names `id, method, uri, headers, form` and
//! `id, status, headers, body`, with `body` as standard base64.

use crate::error::CodecError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Multi-valued string map used for headers and form values.
pub type ValuesMap = HashMap<String, Vec<String>>;

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  /// GET
  Get,
  /// POST
  Post,
  /// PUT
  Put,
  /// DELETE
  Delete,
  /// HEAD
  Head,
  /// OPTIONS
  Options,
}

impl HttpMethod {
  /// All supported methods.
  pub const ALL: [HttpMethod; 6] = [
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Delete,
    HttpMethod::Head,
    HttpMethod::Options,
  ];

  /// Uppercase method token.
  pub fn as_str(&self) -> &'static str {
    match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
      HttpMethod::Put => "PUT",
      HttpMethod::Delete => "DELETE",
      HttpMethod::Head => "HEAD",
      HttpMethod::Options => "OPTIONS",
    }
  }
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HttpMethod {
  type Err = String;

  /// Case-insensitive, surrounding whitespace ignored.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let token = s.trim().to_ascii_uppercase();
    HttpMethod::ALL
      .into_iter()
      .find(|m| m.as_str() == token)
      .ok_or_else(|| format!("unsupported HTTP method '{}'", s.trim()))
  }
}

impl From<HttpMethod> for http::Method {
  fn from(method: HttpMethod) -> Self {
    match method {
      HttpMethod::Get => http::Method::GET,
      HttpMethod::Post => http::Method::POST,
      HttpMethod::Put => http::Method::PUT,
      HttpMethod::Delete => http::Method::DELETE,
      HttpMethod::Head => http::Method::HEAD,
      HttpMethod::Options => http::Method::OPTIONS,
    }
  }
}

impl TryFrom<&http::Method> for HttpMethod {
  type Error = String;

  fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
    method.as_str().parse()
  }
}

/// A request travelling through the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
  /// Identifier assigned by the server node; copied onto responses.
  #[serde(default)]
  pub id: String,
  /// Method token as received (`GET`, `post`, ...).
  #[serde(default)]
  pub method: String,
  /// Request URI; may be a bare path or a full URL, with or without query.
  #[serde(default)]
  pub uri: String,
  /// Request headers.
  #[serde(default, deserialize_with = "null_as_default")]
  pub headers: ValuesMap,
  /// Query/form values; matched path parameters are added here.
  #[serde(default, deserialize_with = "null_as_default")]
  pub form: ValuesMap,
}

impl HttpRequest {
  /// Creates a request with empty headers and form.
  pub fn new(id: impl Into<String>, method: impl Into<String>, uri: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      method: method.into(),
      uri: uri.into(),
      ..Default::default()
    }
  }

  /// Adds a form value.
  pub fn with_form_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.form.entry(key.into()).or_default().push(value.into());
    self
  }

  /// Adds a header value.
  pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.entry(name.into()).or_default().push(value.into());
    self
  }

  /// The URI path, without scheme/authority, query string or fragment.
  pub fn path(&self) -> &str {
    let mut rest = self.uri.as_str();
    if let Some(scheme_end) = rest.find("://") {
      let after = &rest[scheme_end + 3..];
      rest = match after.find('/') {
        Some(slash) => &after[slash..],
        None => "/",
      };
    }
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
  }

  /// First value of a form key.
  pub fn form_value(&self, key: &str) -> Option<&str> {
    self.form.get(key).and_then(|v| v.first()).map(String::as_str)
  }

  /// Adds `params` to the form map. Keys already present are left untouched.
  pub fn merge_params<I, K, V>(&mut self, params: I)
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    for (key, value) in params {
      self
        .form
        .entry(key.into())
        .or_insert_with(|| vec![value.into()]);
    }
  }
}

/// A response travelling through the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
  /// Identifier of the request this answers.
  #[serde(default)]
  pub id: String,
  /// HTTP status code.
  pub status: u16,
  /// Response headers.
  #[serde(default, deserialize_with = "null_as_default")]
  pub headers: ValuesMap,
  /// Response body.
  #[serde(default, with = "base64_body")]
  pub body: Vec<u8>,
}

impl HttpResponse {
  /// A response with only an id and a status, as synthesized for routing misses.
  pub fn with_status(id: impl Into<String>, status: http::StatusCode) -> Self {
    Self {
      id: id.into(),
      status: status.as_u16(),
      ..Default::default()
    }
  }

  /// The status as a typed code, if valid.
  pub fn status_code(&self) -> Option<http::StatusCode> {
    http::StatusCode::from_u16(self.status).ok()
  }
}

/// Encodes a request as a JSON payload.
pub fn encode_request(request: &HttpRequest) -> Result<Vec<u8>, CodecError> {
  Ok(serde_json::to_vec(request)?)
}

/// Decodes a request from a JSON payload.
pub fn decode_request(payload: &[u8]) -> Result<HttpRequest, CodecError> {
  Ok(serde_json::from_slice(payload)?)
}

/// Encodes a response as a JSON payload.
pub fn encode_response(response: &HttpResponse) -> Result<Vec<u8>, CodecError> {
  Ok(serde_json::to_vec(response)?)
}

/// Decodes a response from a JSON payload.
pub fn decode_response(payload: &[u8]) -> Result<HttpResponse, CodecError> {
  Ok(serde_json::from_slice(payload)?)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod base64_body {
  use super::*;

  pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(body))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
      Some(text) => STANDARD.decode(text).map_err(serde::de::Error::custom),
      None => Ok(Vec::new()),
    }
  }
}
