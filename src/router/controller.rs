//! Registration/dispatch controller.
//!
//! A two-state machine:
//!
//! - `Registering`: each pending source may deliver one `"<METHOD> <pattern>"`
//!   line. A line that parses, compiles and registers retires its source; a
//!   bad line is rejected and the source stays pending.
//! - `Dispatching`: entered once no source is pending. The table is frozen
//!   and shared as `Arc<RouteTable>`; every request is routed against it.
//!
//! The transition is one-way. The controller performs no I/O; the router node
//! feeds it messages one at a time.

use crate::error::RouterError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::router::SourceId;
use crate::router::matcher::MatchResult;
use crate::router::pattern::{Pattern, compile};
use crate::router::table::{Destination, RouteTable};
use http::StatusCode;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
  /// Routes are still being learned; this many sources are pending.
  Registering {
    /// Number of sources that have not delivered a route yet.
    pending: usize,
  },
  /// The table is frozen and requests are being routed.
  Dispatching,
}

/// What to do with a routed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
  /// Send the augmented request to this destination.
  Forward {
    /// Destination of the matched route.
    destination: Destination,
    /// The request with matched parameters merged into its form.
    request: HttpRequest,
  },
  /// Send this synthesized 404/405 response to the fail output.
  Reject(HttpResponse),
}

#[derive(Debug)]
enum Phase {
  Registering {
    pending: BTreeMap<SourceId, Destination>,
    table: RouteTable,
  },
  Dispatching(Arc<RouteTable>),
}

/// Owns the route table and drives it through registration into dispatch.
#[derive(Debug)]
pub struct RouterController {
  phase: Phase,
}

impl RouterController {
  /// Creates a controller with one pending source per binding.
  ///
  /// With no bindings the controller starts out dispatching on an empty table.
  pub fn new<I>(bindings: I) -> Self
  where
    I: IntoIterator<Item = (SourceId, Destination)>,
  {
    let mut controller = Self {
      phase: Phase::Registering {
        pending: bindings.into_iter().collect(),
        table: RouteTable::new(),
      },
    };
    controller.freeze_if_complete();
    controller
  }

  /// Current state.
  pub fn state(&self) -> ControllerState {
    match &self.phase {
      Phase::Registering { pending, .. } => ControllerState::Registering {
        pending: pending.len(),
      },
      Phase::Dispatching(_) => ControllerState::Dispatching,
    }
  }

  /// Whether requests are being routed.
  pub fn is_dispatching(&self) -> bool {
    matches!(self.phase, Phase::Dispatching(_))
  }

  /// Whether `source` still waits for a registration.
  pub fn is_pending(&self, source: SourceId) -> bool {
    match &self.phase {
      Phase::Registering { pending, .. } => pending.contains_key(&source),
      Phase::Dispatching(_) => false,
    }
  }

  /// The route table, writable or frozen depending on the state.
  pub fn table(&self) -> &RouteTable {
    match &self.phase {
      Phase::Registering { table, .. } => table,
      Phase::Dispatching(table) => table,
    }
  }

  /// Shared handle to the frozen table, once dispatching.
  pub fn frozen_table(&self) -> Option<Arc<RouteTable>> {
    match &self.phase {
      Phase::Dispatching(table) => Some(Arc::clone(table)),
      Phase::Registering { .. } => None,
    }
  }

  /// Handles one registration line from `source`.
  ///
  /// On success the route is bound to the source's destination and the
  /// source is retired. Returns the state after handling the line.
  ///
  /// # Errors
  ///
  /// - [`RouterError::TableFrozen`] when already dispatching
  /// - [`RouterError::UnknownSource`] if `source` is not pending
  /// - [`RouterError::MalformedRegistrationMessage`] / [`RouterError::MalformedPattern`]
  ///   for unparsable lines
  /// - [`RouterError::DuplicateRoute`] if the route already exists
  ///
  /// On error the source, if pending, stays pending.
  pub fn register_from(
    &mut self,
    source: SourceId,
    line: &str,
  ) -> Result<ControllerState, RouterError> {
    let Phase::Registering { pending, table } = &mut self.phase else {
      return Err(RouterError::TableFrozen);
    };
    let destination = *pending
      .get(&source)
      .ok_or(RouterError::UnknownSource(source))?;

    let (method, pattern) = parse_registration(line)?;
    let route = format!("{method} {pattern}");
    table.register(method, pattern, destination)?;
    debug!(
      source = %source,
      route = %route,
      destination = %destination,
      "route registered"
    );
    pending.remove(&source);

    self.freeze_if_complete();
    Ok(self.state())
  }

  /// Retires `source` without a registration (its stream ended or the host
  /// closed it).
  ///
  /// # Errors
  ///
  /// [`RouterError::UnknownSource`] if `source` is not pending.
  pub fn exhaust(&mut self, source: SourceId) -> Result<ControllerState, RouterError> {
    let Phase::Registering { pending, .. } = &mut self.phase else {
      return Err(RouterError::UnknownSource(source));
    };
    if pending.remove(&source).is_none() {
      return Err(RouterError::UnknownSource(source));
    }
    self.freeze_if_complete();
    Ok(self.state())
  }

  /// Routes a request.
  ///
  /// # Errors
  ///
  /// [`RouterError::NotDispatching`] while routes are still being registered.
  pub fn dispatch(&self, mut request: HttpRequest) -> Result<Dispatch, RouterError> {
    let Phase::Dispatching(table) = &self.phase else {
      return Err(RouterError::NotDispatching);
    };

    let dispatch = match table.route(&request.method, request.path()) {
      MatchResult::Matched {
        destination,
        params,
      } => {
        request.merge_params(params);
        Dispatch::Forward {
          destination,
          request,
        }
      }
      MatchResult::NotFound => {
        Dispatch::Reject(HttpResponse::with_status(request.id, StatusCode::NOT_FOUND))
      }
      MatchResult::MethodNotAllowed => Dispatch::Reject(HttpResponse::with_status(
        request.id,
        StatusCode::METHOD_NOT_ALLOWED,
      )),
    };
    Ok(dispatch)
  }

  fn freeze_if_complete(&mut self) {
    let Phase::Registering { pending, table } = &mut self.phase else {
      return;
    };
    if !pending.is_empty() {
      return;
    }
    let mut table = std::mem::take(table);
    table.freeze();
    info!(routes = table.len(), "route registration complete, dispatching");
    self.phase = Phase::Dispatching(Arc::new(table));
  }
}

/// Parses a registration line of the form `"<METHOD> <pattern>"`.
///
/// The method is case-insensitive; surrounding whitespace is ignored.
///
/// # Errors
///
/// [`RouterError::MalformedRegistrationMessage`] for a missing or unsupported
/// method, a missing pattern, or trailing text; [`RouterError::MalformedPattern`]
/// if the pattern does not compile.
pub fn parse_registration(line: &str) -> Result<(HttpMethod, Pattern), RouterError> {
  let mut tokens = line.split_whitespace();
  let method = tokens
    .next()
    .ok_or_else(|| RouterError::malformed_message(line, "empty message"))?;
  let template = tokens
    .next()
    .ok_or_else(|| RouterError::malformed_message(line, "missing pattern"))?;
  if tokens.next().is_some() {
    return Err(RouterError::malformed_message(
      line,
      "expected '<METHOD> <pattern>'",
    ));
  }

  let method = method
    .parse::<HttpMethod>()
    .map_err(|reason| RouterError::malformed_message(line, reason))?;
  let pattern = compile(template)?;
  Ok((method, pattern))
}
