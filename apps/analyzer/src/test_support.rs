//! Test-only chat-completion stub served by a local axum listener.

use std::sync::{Arc, Mutex};

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct Captured {
    pub authorization: Option<String>,
    pub body: Option<Value>,
    pub requests: usize,
}

pub struct LlmStub {
    pub url: String,
    captured: Arc<Mutex<Captured>>,
}

impl LlmStub {
    pub fn captured(&self) -> Captured {
        self.captured.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.captured.lock().unwrap().requests
    }
}

/// Serves `body` with `status` for every POST to `/v1/chat/completions`.
pub async fn spawn_llm_stub(status: StatusCode, body: String) -> LlmStub {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let sink = captured.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| async move {
            {
                let mut c = sink.lock().unwrap();
                c.requests += 1;
                c.authorization = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                c.body = Some(request);
            }
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    LlmStub {
        url: format!("http://{addr}/v1/chat/completions"),
        captured,
    }
}
