//! # HTTP Types Test Suite

use crate::http::types::*;
use std::collections::HashMap;

#[test]
fn test_method_parse_is_case_insensitive() {
  assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
  assert_eq!("  Delete ".parse::<HttpMethod>(), Ok(HttpMethod::Delete));
  assert_eq!("OPTIONS".parse::<HttpMethod>(), Ok(HttpMethod::Options));
  assert!("PATCH".parse::<HttpMethod>().is_err());
  assert!("".parse::<HttpMethod>().is_err());
}

#[test]
fn test_method_http_conversion() {
  assert_eq!(http::Method::from(HttpMethod::Head), http::Method::HEAD);
  assert_eq!(
    HttpMethod::try_from(&http::Method::PUT),
    Ok(HttpMethod::Put)
  );
  assert!(HttpMethod::try_from(&http::Method::PATCH).is_err());
}

#[test]
fn test_request_path_strips_query_and_authority() {
  assert_eq!(HttpRequest::new("1", "GET", "/users/7").path(), "/users/7");
  assert_eq!(
    HttpRequest::new("1", "GET", "/users/7?expand=true#top").path(),
    "/users/7"
  );
  assert_eq!(
    HttpRequest::new("1", "GET", "http://example.com/a/b?x=1").path(),
    "/a/b"
  );
  assert_eq!(HttpRequest::new("1", "GET", "http://example.com").path(), "/");
}

#[test]
fn test_merge_params_keeps_existing_keys() {
  let mut request = HttpRequest::new("1", "GET", "/users/7").with_form_value("id", "from-query");
  let mut params = HashMap::new();
  params.insert("id".to_string(), "7".to_string());
  params.insert("org".to_string(), "acme".to_string());

  request.merge_params(params);

  assert_eq!(request.form["id"], vec!["from-query".to_string()]);
  assert_eq!(request.form_value("org"), Some("acme"));
}

#[test]
fn test_request_decodes_null_maps() {
  let payload = br#"{"id":"r1","method":"GET","uri":"/x","headers":null,"form":null}"#;
  let request = decode_request(payload).unwrap();
  assert_eq!(request.id, "r1");
  assert!(request.headers.is_empty());
  assert!(request.form.is_empty());
}

#[test]
fn test_response_body_is_base64_on_the_wire() {
  let mut response = HttpResponse::with_status("r1", http::StatusCode::OK);
  response.body = b"hello".to_vec();

  let encoded = encode_response(&response).unwrap();
  let json: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
  assert_eq!(json["body"], "aGVsbG8=");
  assert_eq!(json["status"], 200);

  assert_eq!(decode_response(&encoded).unwrap(), response);
}

#[test]
fn test_synthesized_response_status() {
  let response = HttpResponse::with_status("r9", http::StatusCode::METHOD_NOT_ALLOWED);
  assert_eq!(response.status, 405);
  assert_eq!(
    response.status_code(),
    Some(http::StatusCode::METHOD_NOT_ALLOWED)
  );
  assert!(response.body.is_empty());
}

#[test]
fn test_decode_request_rejects_garbage() {
  assert!(decode_request(b"not json").is_err());
}
