//! Integration tests for the `hrdesk serve` HTTP API.
//!
//! Each test starts the server as a child process on a unique port over a
//! fresh data directory, makes HTTP requests, and verifies the responses.

use std::io::Read;
use std::net::TcpStream;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use tempfile::TempDir;

/// Atomic port counter to avoid port conflicts between parallel tests.
/// Base port is derived from process ID so separate test binaries running
/// at once don't collide on the same port range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 20000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// A running `hrdesk serve` child, killed on drop.
struct Server {
    port: u16,
    child: Child,
}

impl Drop for Server {
    fn drop(&mut self) {
        self.child.kill().ok();
        self.child.wait().ok();
    }
}

/// Helper: start `hrdesk serve` on a fresh port over `data_dir`.
fn start_server(data_dir: &Path, api_key: Option<&str>) -> Server {
    let port = next_port();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hrdesk"));
    cmd.arg("serve")
        .arg("--port")
        .arg(port.to_string())
        .arg("--data-dir")
        .arg(data_dir)
        .env_remove("HRDESK_PORT")
        .env_remove("HRDESK_DATA_DIR")
        .env_remove("HRDESK_API_KEY")
        .env_remove("RUST_LOG");
    if let Some(key) = api_key {
        cmd.env("HRDESK_API_KEY", key);
    }
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    let child = cmd.spawn().expect("failed to start hrdesk serve");
    // Wait for server to be ready by polling the port
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Server { port, child }
}

/// Helper: send one HTTP/1.1 request and return (status, headers, body).
fn http_request(
    port: u16,
    method: &str,
    path: &str,
    body: Option<&str>,
    extra_headers: &[(&str, &str)],
) -> (u16, String, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let mut header_lines = String::new();
    for (name, value) in extra_headers {
        header_lines.push_str(&format!("{}: {}\r\n", name, value));
    }
    if let Some(body) = body {
        header_lines.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n",
            body.len()
        ));
    } else if method == "POST" {
        header_lines.push_str("Content-Length: 0\r\n");
    }

    let request = format!(
        "{} {} HTTP/1.1\r\nHost: localhost:{}\r\n{}Connection: close\r\n\r\n{}",
        method,
        path,
        port,
        header_lines,
        body.unwrap_or("")
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    parse_http_response_full(&response)
}

fn http_get(port: u16, path: &str) -> (u16, serde_json::Value) {
    let (status, _, body) = http_request(port, "GET", path, None, &[]);
    (status, to_json(&body))
}

fn http_post(port: u16, path: &str, body: &str) -> (u16, serde_json::Value) {
    let (status, _, body) = http_request(port, "POST", path, Some(body), &[]);
    (status, to_json(&body))
}

fn http_post_empty(port: u16, path: &str) -> (u16, serde_json::Value) {
    let (status, _, body) = http_request(port, "POST", path, None, &[]);
    (status, to_json(&body))
}

fn to_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid JSON ({e}): {body:?}"))
}

/// Parse an HTTP response into (status_code, headers_string, body).
fn parse_http_response_full(response: &str) -> (u16, String, String) {
    let parts: Vec<&str> = response.splitn(2, "\r\n\r\n").collect();
    let headers = parts.first().unwrap_or(&"").to_string();
    let body = parts.get(1).unwrap_or(&"").to_string();

    let status_line = headers.lines().next().unwrap_or("");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    let body = if headers
        .to_ascii_lowercase()
        .contains("transfer-encoding: chunked")
    {
        decode_chunked(&body)
    } else {
        body
    };

    (status, headers, body)
}

/// Decode chunked transfer encoding.
fn decode_chunked(data: &str) -> String {
    let mut result = String::new();
    let mut remaining = data;

    while let Some(line_end) = remaining.find("\r\n") {
        let size = match usize::from_str_radix(remaining[..line_end].trim(), 16) {
            Ok(s) => s,
            Err(_) => break,
        };
        if size == 0 {
            break;
        }
        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + size;
        if chunk_end > remaining.len() {
            result.push_str(&remaining[chunk_start..]);
            break;
        }
        result.push_str(&remaining[chunk_start..chunk_end]);
        remaining = remaining.get(chunk_end + 2..).unwrap_or("");
    }

    result
}

fn create_ticket(port: u16, category: &str, title: &str) -> String {
    let (status, ticket) = http_post(
        port,
        "/tickets",
        &format!(r#"{{"category": "{}", "title": "{}"}}"#, category, title),
    );
    assert_eq!(status, 201, "{ticket}");
    ticket["id"].as_str().expect("ticket id").to_string()
}

// ──────────────────────────────────────────────
// Basics
// ──────────────────────────────────────────────

#[test]
fn health_returns_200_with_version() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);

    let (status, json) = http_get(server.port, "/health");
    assert_eq!(status, 200);
    assert_eq!(json["status"], "ok");
    assert!(json.get("version").is_some(), "version field must be present");
}

#[test]
fn not_found_returns_404() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);

    let (status, json) = http_get(server.port, "/payroll");
    assert_eq!(status, 404);
    assert_eq!(json["error"], "not found");
}

// ──────────────────────────────────────────────
// Tickets
// ──────────────────────────────────────────────

#[test]
fn create_get_and_filter_tickets() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);
    let port = server.port;

    let fairness = create_ticket(port, "Fairness", "Rota dispute");
    let hiring = create_ticket(port, "Hiring", "Data analyst");
    assert!(fairness.starts_with("tkt_"));

    let (status, ticket) = http_get(port, &format!("/tickets/{}", fairness));
    assert_eq!(status, 200);
    assert_eq!(ticket["status"], "Open");
    assert!(ticket["closedAt"].is_null());

    let (status, all) = http_get(port, "/tickets");
    assert_eq!(status, 200);
    let ids: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [fairness.as_str(), hiring.as_str()]);

    let (_, filtered) = http_get(port, "/tickets?category=Hiring&status=Open");
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["id"], hiring.as_str());
}

#[test]
fn invalid_ticket_bodies_return_400() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);

    let (status, json) = http_post(
        server.port,
        "/tickets",
        r#"{"category": "Payroll", "title": "x"}"#,
    );
    assert_eq!(status, 400);
    assert!(json["error"].is_string());

    let (status, _) = http_post(
        server.port,
        "/tickets",
        r#"{"category": "Fairness", "title": "   "}"#,
    );
    assert_eq!(status, 400);

    let (status, _) = http_get(server.port, "/tickets?status=Sleeping");
    assert_eq!(status, 400);
}

#[test]
fn status_change_stamps_and_clears_closed_at() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);
    let id = create_ticket(server.port, "Performance", "Review appeal");

    let (status, closed) = http_post(
        server.port,
        &format!("/tickets/{}/status", id),
        r#"{"status": "Closed"}"#,
    );
    assert_eq!(status, 200);
    assert!(closed["closedAt"].is_string());

    let (_, reopened) = http_post(
        server.port,
        &format!("/tickets/{}/status", id),
        r#"{"status": "InProgress"}"#,
    );
    assert!(reopened["closedAt"].is_null());

    let (status, json) = http_post(
        server.port,
        "/tickets/tkt_missing/status",
        r#"{"status": "Closed"}"#,
    );
    assert_eq!(status, 404);
    assert!(json["error"].as_str().unwrap().contains("tkt_missing"));
}

// ──────────────────────────────────────────────
// Stop clock
// ──────────────────────────────────────────────

#[test]
fn pause_resume_and_sla() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);
    let port = server.port;
    let id = create_ticket(port, "Fairness", "Grading complaint");

    let (status, stop) = http_post(
        port,
        &format!("/tickets/{}/pause", id),
        r#"{"reason": "waiting for witness"}"#,
    );
    assert_eq!(status, 201);
    assert_eq!(stop["ticketId"], id.as_str());
    assert!(stop["endAt"].is_null());

    let (status, sla) = http_get(port, &format!("/tickets/{}/sla", id));
    assert_eq!(status, 200);
    assert_eq!(sla["paused"], true);
    assert_eq!(sla["targetHours"], 72.0);
    assert_eq!(sla["breached"], false);

    let (status, closed) = http_post_empty(port, &format!("/tickets/{}/resume", id));
    assert_eq!(status, 200);
    assert_eq!(closed["id"], stop["id"]);
    assert!(closed["endAt"].is_string());

    let (status, noop) = http_post_empty(port, &format!("/tickets/{}/resume", id));
    assert_eq!(status, 200);
    assert!(noop["resumed"].is_null());
}

#[test]
fn pause_without_body_uses_empty_reason() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);
    let id = create_ticket(server.port, "Other", "Parking");

    let (status, stop) = http_post_empty(server.port, &format!("/tickets/{}/pause", id));
    assert_eq!(status, 201);
    assert_eq!(stop["reason"], "");
}

#[test]
fn clock_on_unknown_ticket_returns_404() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);

    let (status, _) = http_post(server.port, "/tickets/tkt_ghost/pause", r#"{"reason": ""}"#);
    assert_eq!(status, 404);
    let (status, _) = http_post_empty(server.port, "/tickets/tkt_ghost/resume");
    assert_eq!(status, 404);
    let (status, _) = http_get(server.port, "/tickets/tkt_ghost/sla");
    assert_eq!(status, 404);
}

// ──────────────────────────────────────────────
// Requisitions and surveys
// ──────────────────────────────────────────────

#[test]
fn requisition_milestones() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);
    let port = server.port;

    // Orphaned ticket ids are accepted.
    let (status, req) = http_post(
        port,
        "/requisitions",
        r#"{"ticketId": "tkt_elsewhere", "keyRole": true}"#,
    );
    assert_eq!(status, 201);
    let req_id = req["id"].as_str().unwrap().to_string();
    assert!(req_id.starts_with("req_"));

    let (status, updated) = http_post(
        port,
        &format!("/requisitions/{}/milestones", req_id),
        r#"{"milestone": "firstInterview", "at": "2025-08-01T00:00:00Z"}"#,
    );
    assert_eq!(status, 200);
    assert_eq!(updated["firstInterviewAt"], "2025-08-01T00:00:00Z");

    let (status, json) = http_post(
        port,
        &format!("/requisitions/{}/milestones", req_id),
        r#"{"milestone": "hired"}"#,
    );
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("hired"));

    let (status, _) = http_post(
        port,
        "/requisitions/req_missing/milestones",
        r#"{"milestone": "approved"}"#,
    );
    assert_eq!(status, 404);

    let (status, list) = http_get(port, "/requisitions");
    assert_eq!(status, 200);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn survey_scores_are_validated() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);

    let (status, json) = http_post(server.port, "/surveys", r#"{"score": 11}"#);
    assert_eq!(status, 400);
    assert!(json["error"].is_string());

    let (status, _) = http_post(server.port, "/surveys", r#"{"score": -1}"#);
    assert_eq!(status, 400);

    let (status, saved) = http_post(
        server.port,
        "/surveys",
        r#"{"score": 9, "comment": "good onboarding"}"#,
    );
    assert_eq!(status, 201);
    assert_eq!(saved["score"], 9);
}

// ──────────────────────────────────────────────
// KPIs
// ──────────────────────────────────────────────

#[test]
fn kpis_empty_store_all_null() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);

    let (status, kpis) = http_get(server.port, "/kpis");
    assert_eq!(status, 200);
    for key in ["ttp", "ttf", "close72Rate", "poolMultiple", "eNPS"] {
        assert!(kpis[key].is_null(), "{key}: {kpis}");
    }
}

#[test]
fn kpis_reflect_recorded_activity() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), None);
    let port = server.port;

    let fairness = create_ticket(port, "Fairness", "Overtime split");
    http_post(
        port,
        &format!("/tickets/{}/status", fairness),
        r#"{"status": "Resolved"}"#,
    );
    create_ticket(port, "Hiring", "Recruiter");

    let (_, req) = http_post(
        port,
        "/requisitions",
        r#"{"ticketId": "tkt_x", "keyRole": true}"#,
    );
    let req_id = req["id"].as_str().unwrap().to_string();
    for (milestone, at) in [
        ("approved", "2025-07-01T00:00:00Z"),
        ("firstInterview", "2025-07-02T00:00:00Z"),
        ("offerSigned", "2025-07-03T12:00:00Z"),
        ("onboarded", "2025-07-11T00:00:00Z"),
    ] {
        let (status, _) = http_post(
            port,
            &format!("/requisitions/{}/milestones", req_id),
            &format!(r#"{{"milestone": "{}", "at": "{}"}}"#, milestone, at),
        );
        assert_eq!(status, 200);
    }

    for score in [10, 9, 3] {
        http_post(port, "/surveys", &format!(r#"{{"score": {}}}"#, score));
    }

    let (status, kpis) = http_get(port, "/kpis");
    assert_eq!(status, 200);
    assert_eq!(kpis["ttp"], 36.0);
    assert_eq!(kpis["ttf"], 240.0);
    assert_eq!(kpis["close72Rate"], 100);
    assert_eq!(kpis["poolMultiple"], 3);
    assert_eq!(kpis["eNPS"], 33);
}

#[test]
fn data_survives_restart() {
    let dir = TempDir::new().unwrap();
    let id = {
        let server = start_server(dir.path(), None);
        create_ticket(server.port, "Onboarding", "Badge access")
    };

    let server = start_server(dir.path(), None);
    let (status, ticket) = http_get(server.port, &format!("/tickets/{}", id));
    assert_eq!(status, 200);
    assert_eq!(ticket["title"], "Badge access");
}

// ──────────────────────────────────────────────
// API key
// ──────────────────────────────────────────────

#[test]
fn api_key_gates_everything_but_health() {
    let dir = TempDir::new().unwrap();
    let server = start_server(dir.path(), Some("s3cret"));
    let port = server.port;

    let (status, _) = http_get(port, "/health");
    assert_eq!(status, 200);

    let (status, _, body) = http_request(port, "GET", "/kpis", None, &[]);
    assert_eq!(status, 401);
    assert_eq!(to_json(&body)["error"], "authentication required");

    let (status, _, _) = http_request(
        port,
        "GET",
        "/kpis",
        None,
        &[("Authorization", "Bearer wrong")],
    );
    assert_eq!(status, 403);

    let (status, _, _) = http_request(
        port,
        "GET",
        "/kpis",
        None,
        &[("Authorization", "Bearer s3cret")],
    );
    assert_eq!(status, 200);

    let (status, _, _) = http_request(port, "GET", "/kpis", None, &[("X-API-Key", "s3cret")]);
    assert_eq!(status, 200);
}
