//! # HTTP Nodes
//!
//! Stream nodes built on the [`router`](crate::router) engine and an outbound
//! HTTP client.
//!
//! - [`HttpRouterNode`]: `pattern_<i>` + `request` in, `success_<i>` + `fail` out
//! - [`HttpRequestNode`]: `url`, `method`, `headers`, `form` in, `response`, `body`, `error` out

pub mod common;
pub mod http_request_node;
pub mod http_router_node;

pub use http_request_node::{HttpRequestNode, OutboundRequest};
pub use http_router_node::HttpRouterNode;
