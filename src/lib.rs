//! # StreamWeave HTTP
//!
//! HTTP nodes for StreamWeave graphs.
//!
//! This crate provides two stream nodes:
//!
//! - [`nodes::HttpRouterNode`] learns `(method, pattern) → destination` routes from
//!   its registration ports, then routes every request it receives to the
//!   matching `success_<i>` port, or a synthesized 404/405 response to `fail`.
//! - [`nodes::HttpRequestNode`] performs outbound HTTP calls assembled from its
//!   `url`, `method`, `headers` and `form` ports.
//!
//! The routing engine itself ([`router`]) is independent of the node layer and
//! can be used directly:
//!
//! ```rust
//! use streamweave_http::router::{Destination, HttpMethod, MatchResult, RouteTable, compile};
//!
//! let mut table = RouteTable::new();
//! table.register(HttpMethod::Get, compile("/users/:id")?, Destination(0))?;
//! table.freeze();
//!
//! match table.route("GET", "/users/7") {
//!   MatchResult::Matched { destination, params } => {
//!     assert_eq!(destination, Destination(0));
//!     assert_eq!(params["id"], "7");
//!   }
//!   other => panic!("unexpected {other:?}"),
//! }
//! # Ok::<(), streamweave_http::error::RouterError>(())
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Node configuration.
pub mod config;
/// Error types.
pub mod error;
/// HTTP request/response types and their wire encoding.
pub mod http;
/// Core node trait and stream aliases.
pub mod node;
/// Router and HTTP request nodes.
pub mod nodes;
/// Pattern compiler, route table, matcher and registration/dispatch controller.
pub mod router;

pub use config::{HttpClientConfig, RouterConfig};
pub use error::{CodecError, ConfigError, HttpClientError, RouterError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use node::{InputStream, InputStreams, Node, NodeExecutionError, OutputStream, OutputStreams};
pub use nodes::{HttpRequestNode, HttpRouterNode};
