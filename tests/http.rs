use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct Entry {
    id: String,
    amount: f64,
    date: String,
    note: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Settings {
    target_revenue: f64,
    demo_day: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct Document {
    entries: Vec<Entry>,
    settings: Settings,
}

#[derive(Debug, Deserialize)]
struct Outcome {
    data: Document,
    saved: bool,
}

#[derive(Debug, Deserialize)]
struct Metrics {
    total_revenue: f64,
    chart: Vec<serde_json::Value>,
    days_until_demo: Option<i64>,
    weekly_target: f64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static OFFLINE_SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

/// Nothing listens on port 1, so every store call fails to connect.
const UNREACHABLE_STORE: &str = "http://127.0.0.1:1";

#[cfg(unix)]
mod cleanup {
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for &pid in pids.iter().filter(|pid| **pid > 0) {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("rev_tracker_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/data")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(blob_base_url: Option<&str>) -> TestServer {
    let port = pick_free_port();
    let mut command = Command::new(env!("CARGO_BIN_EXE_rev_tracker"));
    command
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", unique_data_dir())
        .env("DEFAULT_TARGET_REVENUE", "25000")
        .env("BLOB_TIMEOUT_SECS", "2")
        .env_remove("BLOB_BASE_URL")
        .env_remove("BLOB_READ_WRITE_TOKEN")
        .env("RUST_LOG", "info");
    if let Some(url) = blob_base_url {
        command.env("BLOB_BASE_URL", url);
    }
    let child = command
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(None).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn offline_server() -> Arc<TestServer> {
    let mut guard = OFFLINE_SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(Some(UNREACHABLE_STORE)).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_document(client: &Client, base_url: &str) -> Document {
    client
        .get(format!("{base_url}/api/data"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_get_data_disables_caching() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/data", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cache_control = response
        .headers()
        .get("cache-control")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cache_control.contains("no-store"));

    let doc: Document = response.json().await.unwrap();
    assert!(doc.settings.target_revenue >= 0.0);
}

#[tokio::test]
async fn http_put_data_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let doc = serde_json::json!({
        "entries": [
            { "id": "seed-1", "amount": 4000, "date": "2026-01-05", "note": "pilot" },
            { "id": "seed-2", "amount": 6000, "date": "2026-01-12" }
        ],
        "settings": { "targetRevenue": 25000, "demoDay": "" }
    });
    let response = client
        .put(format!("{}/api/data", server.base_url))
        .json(&doc)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let loaded = get_document(&client, &server.base_url).await;
    assert_eq!(loaded.entries.len(), 2);
    assert_eq!(loaded.entries[0].note.as_deref(), Some("pilot"));
    assert_eq!(loaded.entries[1].note, None);

    let metrics: Metrics = client
        .get(format!("{}/api/metrics", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics.total_revenue, 10_000.0);
    assert_eq!(metrics.chart.len(), 2);
    assert_eq!(metrics.days_until_demo, None);
    assert_eq!(metrics.weekly_target, 0.0);
}

#[tokio::test]
async fn http_add_and_delete_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = get_document(&client, &server.base_url).await;

    let added: Outcome = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "amount": 1250.5, "date": "2026-01-07", "note": " retainer " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(added.saved);
    assert_eq!(added.data.entries.len(), before.entries.len() + 1);
    let created = added.data.entries.last().unwrap().clone();
    assert_eq!(created.amount, 1250.5);
    assert_eq!(created.date, "2026-01-07");
    assert_eq!(created.note.as_deref(), Some("retainer"));
    assert!(before.entries.iter().all(|entry| entry.id != created.id));

    let removed: Outcome = client
        .delete(format!("{}/api/entries/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(removed.saved);
    assert_eq!(removed.data.entries, before.entries);
    assert_eq!(get_document(&client, &server.base_url).await, removed.data);
}

#[tokio::test]
async fn http_rejects_invalid_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "amount": 10, "date": "next tuesday" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_settings_patch_merges() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = get_document(&client, &server.base_url).await;

    let outcome: Outcome = client
        .patch(format!("{}/api/settings", server.base_url))
        .json(&serde_json::json!({ "demoDay": "2099-12-31" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(outcome.saved);
    assert_eq!(outcome.data.settings.demo_day, "2099-12-31");
    assert_eq!(
        outcome.data.settings.target_revenue,
        before.settings.target_revenue
    );

    let metrics: Metrics = client
        .get(format!("{}/api/metrics", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(metrics.days_until_demo.unwrap() > 0);

    let cleared: Outcome = client
        .patch(format!("{}/api/settings", server.base_url))
        .json(&serde_json::json!({ "demoDay": "" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared.data.settings.demo_day, "");
}

#[tokio::test]
async fn http_pages_render() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for path in ["/", "/admin"] {
        let response = client
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        let html = response.text().await.unwrap();
        assert!(html.contains("<title>Revenue Tracker"));
        assert!(!html.contains("{{"));
    }
}

#[tokio::test]
async fn http_put_data_with_unreadable_body_is_a_500() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/data", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to save data");
    assert!(body["details"].as_str().is_some_and(|details| !details.is_empty()));
}

#[tokio::test]
async fn http_unreachable_store_serves_defaults() {
    let _guard = TEST_LOCK.lock().await;
    let server = offline_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/data", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc: Document = response.json().await.unwrap();
    assert!(doc.entries.is_empty());
    assert_eq!(doc.settings.target_revenue, 25_000.0);
    assert_eq!(doc.settings.demo_day, "");
}

#[tokio::test]
async fn http_unreachable_store_fails_put_with_details() {
    let _guard = TEST_LOCK.lock().await;
    let server = offline_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/data", server.base_url))
        .json(&serde_json::json!({
            "entries": [],
            "settings": { "targetRevenue": 1000, "demoDay": "" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to save data");
    assert!(body["details"].as_str().is_some_and(|details| !details.is_empty()));

    let added: Outcome = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "amount": 500, "date": "2026-01-07" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!added.saved);
    assert!(added.data.entries.is_empty());
}
