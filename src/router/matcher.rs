//! Request matching.
//!
//! Routes are scanned in registration order. For each one the request path is
//! compared segment by segment:
//!
//! - segment counts must be equal
//! - a literal matches only the identical segment (case-sensitive)
//! - a parameter matches any segment and binds it
//!
//! The first route whose pattern matches and whose method equals the request
//! method wins. If some pattern matched only under other methods the result is
//! `MethodNotAllowed`, otherwise `NotFound`. Routing never fails.

use crate::http::HttpMethod;
use crate::router::pattern::{Pattern, Segment, split_segments};
use crate::router::table::{Destination, RouteTable};
use std::collections::HashMap;

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
  /// A route accepted the request.
  Matched {
    /// Output bound to the route.
    destination: Destination,
    /// Captured path parameters.
    params: HashMap<String, String>,
  },
  /// No pattern matches the path under any method.
  NotFound,
  /// The path is known, but not for this method.
  MethodNotAllowed,
}

impl MatchResult {
  /// Destination of a match, `None` for a miss.
  pub fn destination(&self) -> Option<Destination> {
    match self {
      MatchResult::Matched { destination, .. } => Some(*destination),
      _ => None,
    }
  }
}

/// Routes `method path` against `table`.
///
/// `method` is parsed case-insensitively; a token outside [`HttpMethod`] never
/// equals a route method, so a known path still yields `MethodNotAllowed`.
pub fn route(table: &RouteTable, method: &str, path: &str) -> MatchResult {
  let method = method.parse::<HttpMethod>().ok();
  let request: Vec<&str> = split_segments(path).collect();

  let mut path_known = false;
  for candidate in table.routes() {
    if candidate.pattern.len() != request.len() {
      continue;
    }
    if Some(candidate.method) != method {
      // Only the structural check matters for a route with another method.
      if !path_known && structurally_matches(&candidate.pattern, &request) {
        path_known = true;
      }
      continue;
    }
    if let Some(params) = capture(&candidate.pattern, &request) {
      return MatchResult::Matched {
        destination: candidate.destination,
        params,
      };
    }
  }

  if path_known {
    MatchResult::MethodNotAllowed
  } else {
    MatchResult::NotFound
  }
}

impl RouteTable {
  /// Routes `method path` against this table. See [`route`].
  pub fn route(&self, method: &str, path: &str) -> MatchResult {
    route(self, method, path)
  }
}

fn structurally_matches(pattern: &Pattern, request: &[&str]) -> bool {
  pattern
    .segments()
    .iter()
    .zip(request)
    .all(|(segment, value)| segment_matches(segment, value))
}

fn capture(pattern: &Pattern, request: &[&str]) -> Option<HashMap<String, String>> {
  let mut params = HashMap::new();
  for (segment, value) in pattern.segments().iter().zip(request) {
    match segment {
      Segment::Literal(text) if text == value => {}
      Segment::Literal(_) => return None,
      Segment::Param(name) => {
        params.insert(name.clone(), (*value).to_string());
      }
    }
  }
  Some(params)
}

fn segment_matches(segment: &Segment, value: &str) -> bool {
  match segment {
    Segment::Literal(text) => text == value,
    Segment::Param(_) => !value.is_empty(),
  }
}
