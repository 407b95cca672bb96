//! # Controller Test Suite

use crate::error::RouterError;
use crate::http::{HttpMethod, HttpRequest};
use crate::router::SourceId;
use crate::router::controller::{ControllerState, Dispatch, RouterController, parse_registration};
use crate::router::table::Destination;

fn controller(sources: usize) -> RouterController {
  RouterController::new((0..sources).map(|i| (SourceId(i), Destination(i))))
}

#[test]
fn test_parse_registration() {
  let (method, pattern) = parse_registration("  get   /users/:id \n").unwrap();
  assert_eq!(method, HttpMethod::Get);
  assert_eq!(pattern.to_string(), "/users/:id");
}

#[test]
fn test_parse_registration_rejects_bad_lines() {
  for line in ["", "   ", "GET", "FETCH /a", "GET /a extra"] {
    assert!(
      matches!(
        parse_registration(line),
        Err(RouterError::MalformedRegistrationMessage { .. })
      ),
      "line {line:?} should be rejected"
    );
  }
  assert!(matches!(
    parse_registration("GET /a/:x/:x"),
    Err(RouterError::MalformedPattern { .. })
  ));
}

#[test]
fn test_registration_then_dispatch() {
  let mut controller = controller(2);
  assert_eq!(controller.state(), ControllerState::Registering { pending: 2 });

  assert_eq!(
    controller.register_from(SourceId(0), "GET /users/:id"),
    Ok(ControllerState::Registering { pending: 1 })
  );
  assert!(!controller.is_pending(SourceId(0)));
  assert_eq!(
    controller.register_from(SourceId(1), "post /users"),
    Ok(ControllerState::Dispatching)
  );
  assert!(controller.table().is_frozen());
  assert_eq!(controller.frozen_table().map(|t| t.len()), Some(2));

  match controller
    .dispatch(HttpRequest::new("r1", "GET", "/users/7?x=1"))
    .unwrap()
  {
    Dispatch::Forward {
      destination,
      request,
    } => {
      assert_eq!(destination, Destination(0));
      assert_eq!(request.form_value("id"), Some("7"));
      assert_eq!(request.id, "r1");
    }
    other => panic!("unexpected {other:?}"),
  }

  match controller
    .dispatch(HttpRequest::new("r2", "POST", "/users"))
    .unwrap()
  {
    Dispatch::Forward {
      destination,
      request,
    } => {
      assert_eq!(destination, Destination(1));
      assert!(request.form.is_empty());
    }
    other => panic!("unexpected {other:?}"),
  }
}

#[test]
fn test_misses_are_rejected_with_status() {
  let mut controller = controller(1);
  controller.register_from(SourceId(0), "GET /users").unwrap();

  let Dispatch::Reject(not_allowed) = controller
    .dispatch(HttpRequest::new("r1", "DELETE", "/users"))
    .unwrap()
  else {
    panic!("expected reject");
  };
  assert_eq!(not_allowed.status, 405);
  assert_eq!(not_allowed.id, "r1");

  let Dispatch::Reject(not_found) = controller
    .dispatch(HttpRequest::new("r2", "GET", "/accounts"))
    .unwrap()
  else {
    panic!("expected reject");
  };
  assert_eq!(not_found.status, 404);
  assert_eq!(not_found.id, "r2");
}

#[test]
fn test_matched_params_do_not_overwrite_existing_form_values() {
  let mut controller = controller(1);
  controller.register_from(SourceId(0), "GET /users/:id").unwrap();

  let request = HttpRequest::new("r1", "GET", "/users/7").with_form_value("id", "query");
  let Dispatch::Forward { request, .. } = controller.dispatch(request).unwrap() else {
    panic!("expected forward");
  };
  assert_eq!(request.form["id"], vec!["query".to_string()]);
}

#[test]
fn test_bad_line_keeps_source_pending() {
  let mut controller = controller(1);
  assert!(controller.register_from(SourceId(0), "BREW /coffee").is_err());
  assert!(controller.register_from(SourceId(0), "GET /a/*rest").is_err());
  assert!(controller.is_pending(SourceId(0)));
  assert_eq!(controller.state(), ControllerState::Registering { pending: 1 });

  assert_eq!(
    controller.register_from(SourceId(0), "GET /a"),
    Ok(ControllerState::Dispatching)
  );
}

#[test]
fn test_duplicate_route_keeps_source_pending() {
  let mut controller = controller(2);
  controller.register_from(SourceId(0), "GET /a").unwrap();
  assert!(matches!(
    controller.register_from(SourceId(1), "GET /a"),
    Err(RouterError::DuplicateRoute { .. })
  ));
  assert!(controller.is_pending(SourceId(1)));
  assert_eq!(controller.table().len(), 1);

  assert_eq!(
    controller.register_from(SourceId(1), "GET /b"),
    Ok(ControllerState::Dispatching)
  );
  assert_eq!(controller.table().len(), 2);
}

#[test]
fn test_retired_or_unknown_source_is_rejected() {
  let mut controller = controller(2);
  controller.register_from(SourceId(0), "GET /a").unwrap();
  assert_eq!(
    controller.register_from(SourceId(0), "GET /b"),
    Err(RouterError::UnknownSource(SourceId(0)))
  );
  assert_eq!(
    controller.register_from(SourceId(7), "GET /b"),
    Err(RouterError::UnknownSource(SourceId(7)))
  );
  assert_eq!(controller.table().len(), 1);
}

#[test]
fn test_exhaust_completes_registration() {
  let mut controller = controller(2);
  controller.register_from(SourceId(1), "GET /a").unwrap();
  assert_eq!(controller.exhaust(SourceId(0)), Ok(ControllerState::Dispatching));
  assert_eq!(controller.table().len(), 1);
  assert_eq!(
    controller.exhaust(SourceId(0)),
    Err(RouterError::UnknownSource(SourceId(0)))
  );
}

#[test]
fn test_dispatch_before_registration_completes() {
  let controller = controller(1);
  assert_eq!(
    controller.dispatch(HttpRequest::new("r1", "GET", "/")),
    Err(RouterError::NotDispatching)
  );
}

#[test]
fn test_registration_after_freeze_fails() {
  let mut controller = controller(1);
  controller.register_from(SourceId(0), "GET /a").unwrap();
  assert_eq!(
    controller.register_from(SourceId(0), "GET /b"),
    Err(RouterError::TableFrozen)
  );
}

#[test]
fn test_no_sources_dispatches_immediately() {
  let controller = controller(0);
  assert!(controller.is_dispatching());
  let Dispatch::Reject(response) = controller
    .dispatch(HttpRequest::new("r1", "GET", "/"))
    .unwrap()
  else {
    panic!("expected reject");
  };
  assert_eq!(response.status, 404);
}
