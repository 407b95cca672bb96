//! # Route Table Test Suite

use crate::error::RouterError;
use crate::http::HttpMethod;
use crate::router::pattern::compile;
use crate::router::table::{Destination, RouteTable};

#[test]
fn test_register_preserves_order() {
  let mut table = RouteTable::new();
  table
    .register(HttpMethod::Get, compile("/b").unwrap(), Destination(1))
    .unwrap();
  table
    .register(HttpMethod::Get, compile("/a").unwrap(), Destination(0))
    .unwrap();

  let destinations: Vec<_> = table.routes().map(|r| r.destination).collect();
  assert_eq!(destinations, vec![Destination(1), Destination(0)]);
  assert_eq!(table.len(), 2);
}

#[test]
fn test_register_rejects_duplicate_pair() {
  let mut table = RouteTable::new();
  table
    .register(HttpMethod::Get, compile("/users/:id").unwrap(), Destination(0))
    .unwrap();

  let err = table
    .register(HttpMethod::Get, compile("users/:id/").unwrap(), Destination(1))
    .unwrap_err();
  assert_eq!(
    err,
    RouterError::DuplicateRoute {
      method: HttpMethod::Get,
      pattern: "/users/:id".to_string(),
      existing: Destination(0),
    }
  );

  // Same pattern under another method is a different route.
  table
    .register(HttpMethod::Post, compile("/users/:id").unwrap(), Destination(1))
    .unwrap();
  assert_eq!(table.len(), 2);
}

#[test]
fn test_register_after_freeze_fails() {
  let mut table = RouteTable::new();
  assert!(!table.is_frozen());
  table.freeze();
  assert!(table.is_frozen());

  let err = table
    .register(HttpMethod::Get, compile("/a").unwrap(), Destination(0))
    .unwrap_err();
  assert_eq!(err, RouterError::TableFrozen);
  assert!(table.is_empty());
}
