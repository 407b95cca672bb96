//! HTTP request/response types exchanged between nodes.
//!
//! Requests and responses travel between nodes either as typed values
//! (`Arc<HttpRequest>`, `Arc<HttpResponse>`) or as JSON payloads produced by
//! [`encode_request`] / [`encode_response`].

pub mod types;

pub use types::{
  HttpMethod, HttpRequest, HttpResponse, ValuesMap, decode_request, decode_response,
  encode_request, encode_response,
};

#[cfg(test)]
mod types_test;
