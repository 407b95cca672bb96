//! Wires an `HttpRouterNode` by hand and routes a few requests through it.
//!
//! Logs at DEBUG level so the registration and routing decisions are visible.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use streamweave_http::node::{InputStream, Node};
use streamweave_http::{HttpRequest, HttpResponse, HttpRouterNode};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Level;

type Item = Arc<dyn Any + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

  let router = HttpRouterNode::with_destinations("router".to_string(), 2)?;

  let mut inputs = HashMap::new();
  let mut pattern_senders = Vec::new();
  for port in ["pattern_0", "pattern_1", "request"] {
    let (tx, rx) = mpsc::channel::<Item>(10);
    inputs.insert(port.to_string(), Box::pin(ReceiverStream::new(rx)) as InputStream);
    pattern_senders.push(tx);
  }
  let request_tx = pattern_senders.pop().ok_or("missing request sender")?;

  let mut outputs = router.execute(inputs).await?;

  pattern_senders[0]
    .send(Arc::new("GET /users/:id".to_string()))
    .await?;
  pattern_senders[1]
    .send(Arc::new("POST /users".to_string()))
    .await?;

  for (id, method, uri) in [
    ("1", "GET", "/users/7"),
    ("2", "POST", "/users"),
    ("3", "DELETE", "/users"),
    ("4", "GET", "/accounts"),
  ] {
    request_tx
      .send(Arc::new(HttpRequest::new(id, method, uri)))
      .await?;
  }
  drop(request_tx);

  let mut users = outputs.remove("success_0").ok_or("missing success_0")?;
  let mut create = outputs.remove("success_1").ok_or("missing success_1")?;
  let mut fail = outputs.remove("fail").ok_or("missing fail")?;

  while let Some(item) = users.next().await {
    if let Ok(request) = item.downcast::<HttpRequest>() {
      println!("success_0 <- {} {} form={:?}", request.method, request.uri, request.form);
    }
  }
  while let Some(item) = create.next().await {
    if let Ok(request) = item.downcast::<HttpRequest>() {
      println!("success_1 <- {} {}", request.method, request.uri);
    }
  }
  while let Some(item) = fail.next().await {
    if let Ok(response) = item.downcast::<HttpResponse>() {
      println!("fail      <- request {} status {}", response.id, response.status);
    }
  }
  Ok(())
}
