#![allow(dead_code)]

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use hrx_submit::api::ApiClient;
use hrx_submit::config::Config;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request received by the stub.
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Reply {
    status: u16,
    body: String,
}

#[derive(Default)]
struct StubState {
    replies: Mutex<HashMap<String, Reply>>,
    hits: Mutex<Vec<Hit>>,
}

/// In-process HTTP server on a random port. It runs on its own tokio
/// runtime thread so the blocking client under test can call it.
/// Unconfigured paths answer 404.
pub struct StubServer {
    base_url: String,
    state: Arc<StubState>,
}

impl StubServer {
    pub fn start() -> Self {
        let state = Arc::new(StubState::default());
        let shared = state.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                let app = Router::new().fallback(record).with_state(shared);
                axum::serve(listener, app).await.unwrap();
            });
        });

        let addr = rx.recv().unwrap();
        StubServer {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn reply(&self, path: &str, status: u16, body: &str) -> &Self {
        self.state.replies.lock().unwrap().insert(
            path.to_string(),
            Reply {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn hits_on(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.path == path).collect()
    }
}

async fn record(
    State(state): State<Arc<StubState>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    state.hits.lock().unwrap().push(Hit {
        path: path.clone(),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or(Reply {
            status: 404,
            body: "no stub".to_string(),
        });

    (
        StatusCode::from_u16(reply.status).unwrap(),
        [(CONTENT_TYPE, "application/json")],
        reply.body,
    )
}

pub const REGISTER: &str = "/hiring/generateWebhook";
pub const WEBHOOK: &str = "/hiring/webhook";
pub const FALLBACK: &str = "/hiring/testWebhook";

/// Config pointing both endpoints at `server`.
pub fn config_for(server: &StubServer) -> Config {
    Config {
        register_url: server.url(REGISTER),
        fallback_webhook_url: server.url(FALLBACK),
        output_path: None,
        http_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

pub fn client() -> ApiClient {
    ApiClient::new(Duration::from_secs(5)).unwrap()
}
