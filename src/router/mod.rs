//! # Router
//!
//! The routing engine behind [`HttpRouterNode`](crate::nodes::HttpRouterNode).
//!
//! ```text
//! "<METHOD> <pattern>" lines ──▶ controller ──▶ pattern::compile ──▶ RouteTable::register
//!                                    │
//!                         (all sources consumed: freeze)
//!                                    │
//! HttpRequest ──────────────────▶ controller ──▶ matcher::route ──▶ Matched / NotFound / MethodNotAllowed
//! ```
//!
//! - Patterns are slash-delimited; a segment starting with `:` captures a parameter
//! - Routes are tried in registration order; the first match wins
//! - Segment counts must be equal; there are no wildcard tails
//! - The table is append-only while registering and immutable once frozen

pub mod controller;
pub mod matcher;
pub mod pattern;
pub mod table;

pub use crate::http::HttpMethod;
pub use controller::{ControllerState, Dispatch, RouterController, parse_registration};
pub use matcher::{MatchResult, route};
pub use pattern::{PARAM_MARKER, Pattern, Segment, compile};
pub use table::{Destination, Route, RouteTable};

use std::fmt;

/// Stable identity of a registration source (one per pattern port).
///
/// Sources are tracked by identity, never by their position in a poll set,
/// so retiring one never shifts the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub usize);

impl fmt::Display for SourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[cfg(test)]
mod controller_test;
#[cfg(test)]
mod table_test;
