use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ActiveSession {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ActiveResponse {
    active_session: Option<ActiveSession>,
}

#[derive(Debug, Deserialize)]
struct NapEntry {
    id: i64,
    duration: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    naps: Vec<NapEntry>,
    total_sleep_hours: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
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

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
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

fn unique_db_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("baby_sleep_http_{}_{}.db", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/active")).send().await {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let db_path = unique_db_path();
    let child = Command::new(env!("CARGO_BIN_EXE_baby_sleep_tracker"))
        .env("PORT", port.to_string())
        .env("SLEEP_DB_PATH", db_path)
        .env("RUST_LOG", "info")
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
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn summary_for(client: &Client, server: &TestServer, date: &str) -> SummaryResponse {
    client
        .get(format!("{}/summary?date={date}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_start_then_end_records_a_nap() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/start", server.base_url))
        .json(&serde_json::json!({ "start_time": "2024-03-01 08:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: CreatedResponse = response.json().await.unwrap();

    let active: ActiveResponse = client
        .get(format!("{}/active", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(active.active_session.map(|session| session.id), Some(created.id));

    let response = client
        .post(format!("{}/end", server.base_url))
        .json(&serde_json::json!({ "sleep_id": null, "end_time": "2024-03-01 09:30" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summary = summary_for(&client, &server, "2024-03-01").await;
    assert_eq!(summary.naps.len(), 1);
    assert_eq!(summary.naps[0].id, created.id);
    assert_eq!(summary.naps[0].duration, "1:30:00");
    assert_eq!(summary.total_sleep_hours.as_deref(), Some("1.50"));
}

#[tokio::test]
async fn http_manual_nap_and_clear_day() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/manual-nap", server.base_url))
        .json(&serde_json::json!({
            "start_time": "2024-03-02 13:00",
            "end_time": "2024-03-02 12:00",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error, "End time must be after start time");

    let response = client
        .post(format!("{}/manual-nap", server.base_url))
        .json(&serde_json::json!({
            "start_time": "2024-03-02 13:00",
            "end_time": "2024-03-02 14:15",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/clear-day", server.base_url))
        .json(&serde_json::json!({ "date": "2024-03-02" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared: serde_json::Value = response.json().await.unwrap();
    assert_eq!(cleared["records_deleted"], 1);

    let summary = summary_for(&client, &server, "2024-03-02").await;
    assert!(summary.naps.is_empty());
    assert!(summary.message.is_some());
}

#[tokio::test]
async fn http_delete_unknown_nap_is_bad_request() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .delete(format!("{}/nap/999999", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error, "No nap found with ID 999999");
}
