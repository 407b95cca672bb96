//! Route table.
//!
//! An append-only list of routes in registration order. Once frozen it is
//! never written again and is shared as `Arc<RouteTable>` without a lock.

use crate::error::RouterError;
use crate::http::HttpMethod;
use crate::router::pattern::Pattern;
use std::fmt;

/// Index of the output a route forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Destination(pub usize);

impl fmt::Display for Destination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
  /// Method the route accepts.
  pub method: HttpMethod,
  /// Compiled path pattern.
  pub pattern: Pattern,
  /// Where matching requests go.
  pub destination: Destination,
}

/// Ordered collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
  routes: Vec<Route>,
  frozen: bool,
}

impl RouteTable {
  /// Creates an empty, writable table.
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a route.
  ///
  /// # Errors
  ///
  /// - [`RouterError::TableFrozen`] after [`freeze`](Self::freeze)
  /// - [`RouterError::DuplicateRoute`] if `(method, pattern)` is already present
  pub fn register(
    &mut self,
    method: HttpMethod,
    pattern: Pattern,
    destination: Destination,
  ) -> Result<(), RouterError> {
    if self.frozen {
      return Err(RouterError::TableFrozen);
    }
    if let Some(existing) = self
      .routes
      .iter()
      .find(|r| r.method == method && r.pattern == pattern)
    {
      return Err(RouterError::DuplicateRoute {
        method,
        pattern: pattern.to_string(),
        existing: existing.destination,
      });
    }
    self.routes.push(Route {
      method,
      pattern,
      destination,
    });
    Ok(())
  }

  /// Makes the table read-only. Idempotent.
  pub fn freeze(&mut self) {
    self.frozen = true;
  }

  /// Whether [`freeze`](Self::freeze) has been called.
  pub fn is_frozen(&self) -> bool {
    self.frozen
  }

  /// Routes in registration order.
  pub fn routes(&self) -> impl Iterator<Item = &Route> {
    self.routes.iter()
  }

  /// Number of routes.
  pub fn len(&self) -> usize {
    self.routes.len()
  }

  /// True if no route is registered.
  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }
}
