use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use sentinel_application::AppState;
use sentinel_bootstrap::{build_router_with_layers, AppContext};
use sentinel_infrastructure::{AppConfig, MemoryStore};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    state: AppState,
    http: reqwest::Client,
}

impl TestServer {
    async fn start(config: AppConfig) -> Self {
        let context = AppContext::with_store(&config, Arc::new(MemoryStore::new()))
            .await
            .expect("context");
        let state = context.state;
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = build_router_with_layers(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        Self {
            addr,
            state,
            http: reqwest::Client::new(),
        }
    }

    async fn with_defaults() -> Self {
        Self::start(quiet_config()).await
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Opens a live feed connection and waits until the hub has registered it.
    async fn connect(&self) -> Client {
        let before = self.state.hub.channel_count().await;
        let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", self.addr))
            .await
            .expect("ws connect");
        self.wait_for_channels(before + 1).await;
        socket
    }

    async fn wait_for_channels(&self, expected: usize) {
        for _ in 0..100 {
            if self.state.hub.channel_count().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("hub never reached {expected} channels");
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("post")
    }
}

fn quiet_config() -> AppConfig {
    AppConfig {
        seed_on_start: false,
        ws_ping_interval_seconds: 0,
        ..AppConfig::default()
    }
}

async fn next_envelope(socket: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("envelope before timeout")
            .expect("stream open")
            .expect("frame");
        match frame {
            Message::Text(text) => return serde_json::from_str(&text).expect("json envelope"),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame {other:?}"),
        }
    }
}

async fn assert_silent(socket: &mut Client) {
    let outcome = tokio::time::timeout(Duration::from_millis(200), socket.next()).await;
    assert!(outcome.is_err(), "expected no frame, got {outcome:?}");
}

fn ddos_threat(title: &str) -> Value {
    json!({
        "type": "ddos",
        "title": title,
        "description": "D",
        "severity": "high",
        "status": "active"
    })
}

#[tokio::test]
async fn create_is_broadcast_to_every_channel() {
    let server = TestServer::with_defaults().await;
    let mut a = server.connect().await;
    let mut b = server.connect().await;

    let response = server.post("/api/threats", ddos_threat("T")).await;
    assert_eq!(response.status(), 200);
    let created: Value = response.json().await.expect("threat");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));

    for socket in [&mut a, &mut b] {
        let envelope = next_envelope(socket).await;
        assert_eq!(envelope["type"], "new_threat");
        assert_eq!(envelope["data"]["id"], created["id"]);
        assert_eq!(envelope["data"]["severity"], "high");
        assert_eq!(envelope["data"]["status"], "active");
        assert!(envelope["timestamp"].as_str().is_some());
    }
}

#[tokio::test]
async fn rejected_mutations_reach_no_channel() {
    let server = TestServer::with_defaults().await;
    let mut a = server.connect().await;

    let invalid = server.post("/api/threats", json!({})).await;
    assert_eq!(invalid.status(), 400);
    let body: Value = invalid.json().await.expect("error body");
    assert!(body["error"].as_str().is_some());

    let unknown = server
        .http
        .patch(server.url("/api/threats/does-not-exist"))
        .json(&json!({"status": "resolved"}))
        .send()
        .await
        .expect("patch");
    assert_eq!(unknown.status(), 404);

    let malformed = server
        .http
        .post(server.url("/api/threats"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("post");
    assert_eq!(malformed.status(), 400);

    assert_silent(&mut a).await;
}

#[tokio::test]
async fn subscribe_confirmation_goes_only_to_the_sender() {
    let server = TestServer::with_defaults().await;
    let mut d = server.connect().await;
    let mut other = server.connect().await;

    d.send(Message::Text(r#"{"type":"subscribe"}"#.into()))
        .await
        .expect("send subscribe");
    let confirmation = next_envelope(&mut d).await;
    assert_eq!(confirmation["type"], "subscribed");
    assert_eq!(confirmation["data"], "Connected to real-time feed");
    assert_silent(&mut other).await;

    let snapshot: Value = server
        .http
        .get(server.url("/api/ops/live-feed"))
        .send()
        .await
        .expect("snapshot")
        .json()
        .await
        .expect("json");
    assert_eq!(snapshot["channels"], 2);
    assert_eq!(snapshot["subscribed"], 1);
}

#[tokio::test]
async fn malformed_inbound_keeps_channel_open() {
    let server = TestServer::with_defaults().await;
    let mut socket = server.connect().await;

    socket
        .send(Message::Text("definitely not json".into()))
        .await
        .expect("send garbage");
    socket
        .send(Message::Text(r#"{"type":"subscribe"}"#.into()))
        .await
        .expect("send subscribe");

    let confirmation = next_envelope(&mut socket).await;
    assert_eq!(confirmation["type"], "subscribed");
    assert_eq!(server.state.metrics.malformed_inbound(), 1);
}

#[tokio::test]
async fn binary_frames_are_read_as_utf8_text() {
    let server = TestServer::with_defaults().await;
    let mut socket = server.connect().await;

    socket
        .send(Message::Binary(vec![0xff, 0xfe, 0x00]))
        .await
        .expect("send invalid utf8");
    socket
        .send(Message::Binary(br#"{"type":"subscribe"}"#.to_vec()))
        .await
        .expect("send binary subscribe");

    let confirmation = next_envelope(&mut socket).await;
    assert_eq!(confirmation["type"], "subscribed");
    assert_eq!(server.state.metrics.malformed_inbound(), 1);
}

#[tokio::test]
async fn late_subscriber_sees_only_later_broadcasts() {
    let server = TestServer::with_defaults().await;
    let mut early = server.connect().await;

    for value in [90, 91, 92] {
        let response = server
            .post(
                "/api/metrics/update",
                json!({"type": "system_health", "value": value}),
            )
            .await;
        assert_eq!(response.status(), 200);
    }
    for value in [90, 91, 92] {
        let envelope = next_envelope(&mut early).await;
        assert_eq!(envelope["type"], "metric_updated");
        assert_eq!(envelope["data"]["value"], value);
    }

    let mut late = server.connect().await;
    server.post("/api/threats", ddos_threat("After")).await;

    let envelope = next_envelope(&mut late).await;
    assert_eq!(envelope["type"], "new_threat");
    assert_eq!(envelope["data"]["title"], "After");
    assert_eq!(next_envelope(&mut early).await["type"], "new_threat");
}

#[tokio::test]
async fn closed_client_is_deregistered() {
    let server = TestServer::with_defaults().await;
    let mut socket = server.connect().await;
    let _keep = server.connect().await;

    socket.close(None).await.expect("close");
    server.wait_for_channels(1).await;

    let response = server
        .post("/api/ops/system-alert", json!({"message": "drill"}))
        .await;
    let receipt: Value = response.json().await.expect("receipt");
    assert_eq!(receipt["delivered"], 1);
}

#[tokio::test]
async fn upgrades_beyond_capacity_are_refused() {
    let server = TestServer::start(AppConfig {
        max_channels: 1,
        ..quiet_config()
    })
    .await;
    let _first = server.connect().await;

    let refused = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr)).await;
    match refused {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 503);
        }
        Err(err) => panic!("expected 503 refusal, got {err}"),
        Ok(_) => panic!("upgrade past capacity was accepted"),
    }
    assert_eq!(server.state.hub.channel_count().await, 1);
}

#[tokio::test]
async fn shutdown_closes_live_connections() {
    let server = TestServer::with_defaults().await;
    let mut socket = server.connect().await;

    assert_eq!(server.state.hub.close_all().await, 1);

    let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("frame before timeout");
    assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));
}

#[tokio::test]
async fn chat_without_model_returns_fallback_reply() {
    let server = TestServer::start(AppConfig {
        seed_on_start: true,
        ..quiet_config()
    })
    .await;

    let users: Vec<Value> = server
        .http
        .get(server.url("/api/users"))
        .send()
        .await
        .expect("users")
        .json()
        .await
        .expect("json");
    let user_id = users[0]["id"].as_str().expect("id").to_string();

    let reply: Value = server
        .post(
            "/api/chat",
            json!({"message": "How do I start a simulation?", "userId": user_id}),
        )
        .await
        .json()
        .await
        .expect("reply");
    assert_eq!(reply["type"], "platform_help");
    assert_eq!(reply["confidence"], 0.5);
    assert!(reply["message"]
        .as_str()
        .is_some_and(|message| message.contains("technical difficulties")));

    let history: Vec<Value> = server
        .http
        .get(server.url(&format!("/api/chat/{user_id}")))
        .send()
        .await
        .expect("history")
        .json()
        .await
        .expect("json");
    assert_eq!(history.len(), 1);

    let missing = server
        .post("/api/chat", json!({"message": "hi", "userId": "nobody"}))
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn chat_type_from_client_replaces_classification() {
    let server = TestServer::start(AppConfig {
        seed_on_start: true,
        ..quiet_config()
    })
    .await;
    let users: Vec<Value> = server
        .http
        .get(server.url("/api/users"))
        .send()
        .await
        .expect("users")
        .json()
        .await
        .expect("json");
    let user_id = users[0]["id"].as_str().expect("id").to_string();

    let unknown = server
        .post(
            "/api/chat",
            json!({"message": "hi", "userId": user_id, "type": "phishing"}),
        )
        .await;
    assert_eq!(unknown.status(), 400);

    let accepted = server
        .post(
            "/api/chat",
            json!({"message": "What is a botnet?", "userId": user_id, "type": "cybersecurity_info"}),
        )
        .await;
    assert_eq!(accepted.status(), 200);

    let history: Vec<Value> = server
        .http
        .get(server.url(&format!("/api/chat/{user_id}")))
        .send()
        .await
        .expect("history")
        .json()
        .await
        .expect("json");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["metadata"]["intentConfidence"], 1.0);
}

#[tokio::test]
async fn health_and_metrics_endpoints_respond() {
    let server = TestServer::with_defaults().await;

    let live = server
        .http
        .get(server.url("/api/ops/health/live"))
        .send()
        .await
        .expect("live");
    assert_eq!(live.status(), 200);
    let ready = server
        .http
        .get(server.url("/api/ops/health/ready"))
        .send()
        .await
        .expect("ready");
    assert_eq!(ready.status(), 200);

    let dashboard: Value = server
        .http
        .get(server.url("/api/metrics"))
        .send()
        .await
        .expect("metrics")
        .json()
        .await
        .expect("json");
    assert_eq!(dashboard["systemHealth"], 96);
    assert_eq!(dashboard["aiConfidence"], 94);

    let text = server
        .http
        .get(server.url("/api/ops/metrics/prometheus"))
        .send()
        .await
        .expect("prometheus")
        .text()
        .await
        .expect("text");
    assert!(text.contains("sentinel_live_channels"));
}
