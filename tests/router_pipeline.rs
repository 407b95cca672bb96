use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use streamweave_http::node::{InputStream, Node, OutputStream};
use streamweave_http::{HttpRequest, HttpResponse, HttpRouterNode, RouterConfig};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

type Item = Arc<dyn Any + Send + Sync>;

fn channel_input() -> (mpsc::Sender<Item>, InputStream) {
  let (tx, rx) = mpsc::channel(16);
  (tx, Box::pin(ReceiverStream::new(rx)))
}

async fn collect(stream: OutputStream) -> Vec<Item> {
  tokio::time::timeout(Duration::from_secs(2), stream.collect::<Vec<_>>())
    .await
    .expect("output should close once requests end")
}

#[tokio::test]
async fn routes_users_api_with_named_ports() {
  let config = RouterConfig::from_json_str(
    r#"{
      "pattern_ports": ["show_route", "create_route"],
      "success_ports": ["show", "create"],
      "request_port": "in",
      "fail_port": "rejected"
    }"#,
  )
  .unwrap();
  let router = HttpRouterNode::new("users_router".to_string(), config).unwrap();
  assert_eq!(
    router.input_port_names(),
    &["show_route", "create_route", "in"]
  );

  let (show_tx, show_in) = channel_input();
  let (create_tx, create_in) = channel_input();
  let (request_tx, request_in) = channel_input();
  let mut inputs = HashMap::new();
  inputs.insert("show_route".to_string(), show_in);
  inputs.insert("create_route".to_string(), create_in);
  inputs.insert("in".to_string(), request_in);

  let mut outputs = router.execute(inputs).await.unwrap();

  show_tx
    .send(Arc::new("GET /users/:id".to_string()))
    .await
    .unwrap();
  create_tx
    .send(Arc::new("POST /users".to_string()))
    .await
    .unwrap();

  for (id, method, uri) in [
    ("a", "GET", "/users/7"),
    ("b", "POST", "/users"),
    ("c", "DELETE", "/users"),
    ("d", "GET", "/accounts"),
    ("e", "GET", "http://localhost:8080/users/8?verbose=1"),
  ] {
    request_tx
      .send(Arc::new(HttpRequest::new(id, method, uri)))
      .await
      .unwrap();
  }
  drop(request_tx);

  let show: Vec<HttpRequest> = collect(outputs.remove("show").unwrap())
    .await
    .into_iter()
    .map(|item| item.downcast::<HttpRequest>().unwrap().as_ref().clone())
    .collect();
  let create = collect(outputs.remove("create").unwrap()).await;
  let rejected: Vec<(String, u16)> = collect(outputs.remove("rejected").unwrap())
    .await
    .into_iter()
    .map(|item| {
      let response = item.downcast::<HttpResponse>().unwrap();
      (response.id.clone(), response.status)
    })
    .collect();

  assert_eq!(show.len(), 2);
  assert_eq!(show[0].form_value("id"), Some("7"));
  assert_eq!(show[1].form_value("id"), Some("8"));
  assert_eq!(create.len(), 1);
  assert_eq!(
    rejected,
    vec![("c".to_string(), 405), ("d".to_string(), 404)]
  );
}
