//! End-to-end tests of the JSON API against a mocked KakaoMap upstream.

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kakaobus_server::host::{ConfigEntryStore, FlowSessions, Integration};
use kakaobus_server::kakao::{KakaoClient, KakaoConfig};
use kakaobus_server::web::{AppState, create_router};

const STOP_JSON: &str = r#"{
    "name": "Lotte Castle",
    "lines": [
        {"name": "126", "arrival": {"direction": "Sujeong", "arrivalTime": 300, "arrivalTime2": 900, "realtimeState": "NORMAL"}},
        {"name": "720", "arrival": {"direction": "Seomyeon", "arrivalTime": 0, "realtimeState": "NOVEHICLE"}}
    ]
}"#;

struct TestApp {
    base: String,
    http: reqwest::Client,
    integration: Integration,
    _upstream: MockServer,
}

impl TestApp {
    async fn start() -> Self {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bus/stop.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(STOP_JSON))
            .mount(&upstream)
            .await;

        let client =
            KakaoClient::new(KakaoConfig::default().with_base_url(upstream.uri())).unwrap();
        let integration = Integration::new(client, ConfigEntryStore::in_memory());
        let app = create_router(AppState::new(integration.clone(), FlowSessions::default()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            http: reqwest::Client::new(),
            integration,
            _upstream: upstream,
        }
    }

    async fn post(&self, path: &str, body: Option<Value>) -> (u16, Value) {
        let mut request = self.http.post(format!("{}{path}", self.base));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .http
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    /// Run the setup flow for the mocked stop and return the entry id.
    async fn configure(&self, routes: &[&str]) -> String {
        let (_, form) = self
            .post("/api/flows", Some(json!({"stop_id": "BS219565"})))
            .await;
        let flow_id = form["flow_id"].as_str().unwrap().to_string();

        let (status, created) = self
            .post(&format!("/api/flows/{flow_id}"), Some(json!({"buses": routes})))
            .await;
        assert_eq!(status, 200);
        assert_eq!(created["type"], "create_entry");
        created["entry_id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_check() {
    let app = TestApp::start().await;
    let body = app
        .http
        .get(format!("{}/health", app.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn empty_flow_start_shows_stop_form() {
    let app = TestApp::start().await;

    let (status, body) = app.post("/api/flows", None).await;

    assert_eq!(status, 200);
    assert_eq!(body["type"], "form");
    assert_eq!(body["step_id"], "user");
    assert!(body["flow_id"].is_null());
}

#[tokio::test]
async fn setup_flow_offers_routes_then_creates_entry() {
    let app = TestApp::start().await;

    let (_, form) = app
        .post("/api/flows", Some(json!({"stop_id": "BS219565"})))
        .await;
    assert_eq!(form["type"], "form");
    assert_eq!(form["step_id"], "select_bus");
    let buses = form["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["key"] == "buses")
        .unwrap();
    assert_eq!(buses["default"], json!(["126", "720"]));

    let flow_id = form["flow_id"].as_str().unwrap();
    let (_, rejected) = app
        .post(&format!("/api/flows/{flow_id}"), Some(json!({"buses": ["999"]})))
        .await;
    assert_eq!(rejected["type"], "form");
    assert_eq!(rejected["errors"]["buses"], "invalid_route");

    let (_, created) = app
        .post(&format!("/api/flows/{flow_id}"), Some(json!({"buses": ["126"]})))
        .await;
    assert_eq!(created["type"], "create_entry");
    assert_eq!(created["title"], "Bus Stop BS219565");

    let (_, entries) = app.get("/api/entries").await;
    assert_eq!(entries["entries"].as_array().unwrap().len(), 1);
    assert_eq!(
        entries["entries"][0]["configuration"]["selected_routes"],
        json!(["126"])
    );

    app.integration.shutdown().await;
}

#[tokio::test]
async fn second_setup_of_same_stop_aborts() {
    let app = TestApp::start().await;
    app.configure(&["126"]).await;

    let (_, body) = app
        .post("/api/flows", Some(json!({"stop_id": "BS219565"})))
        .await;
    assert_eq!(body["type"], "abort");
    assert_eq!(body["reason"], "already_configured");

    app.integration.shutdown().await;
}

#[tokio::test]
async fn options_then_refresh_publishes_sensors() {
    let app = TestApp::start().await;
    let entry_id = app.configure(&["126"]).await;

    let (_, form) = app
        .post(&format!("/api/entries/{entry_id}/options"), None)
        .await;
    assert_eq!(form["step_id"], "init");
    let flow_id = form["flow_id"].as_str().unwrap();

    // Disable quiet hours so the refresh below does not depend on the clock.
    let (_, saved) = app
        .post(
            &format!("/api/options/{flow_id}"),
            Some(json!({"buses": ["126", "720"], "quiet_start": "none"})),
        )
        .await;
    assert_eq!(saved["entry_id"], entry_id.as_str());

    let (_, refreshed) = app
        .post(&format!("/api/entries/{entry_id}/refresh"), None)
        .await;
    assert_eq!(refreshed["outcome"], "updated");
    assert_eq!(refreshed["routes"], 2);

    let (status, sensors) = app.get(&format!("/api/entries/{entry_id}/sensors")).await;
    assert_eq!(status, 200);
    assert_eq!(sensors["status"]["last_update_success"], true);

    let sensors = sensors["sensors"].as_array().unwrap();
    assert_eq!(sensors.len(), 2);
    assert_eq!(sensors[0]["unique_id"], "BS219565_126");
    assert_eq!(sensors[0]["state"], 5);
    assert_eq!(sensors[0]["attributes"]["next_bus_min"], 15);
    assert_eq!(sensors[0]["attributes"]["direction"], "Sujeong");
    assert_eq!(sensors[1]["unique_id"], "BS219565_720");
    assert!(sensors[1]["state"].is_null());

    app.integration.shutdown().await;
}

#[tokio::test]
async fn deleted_entry_is_gone() {
    let app = TestApp::start().await;
    let entry_id = app.configure(&["126"]).await;

    let response = app
        .http
        .delete(format!("{}/api/entries/{entry_id}", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let (status, body) = app.get(&format!("/api/entries/{entry_id}/sensors")).await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().is_some());
    assert_eq!(app.integration.loaded().await, 0);
}

#[tokio::test]
async fn malformed_route_selection_is_rejected() {
    let app = TestApp::start().await;

    let (_, form) = app
        .post("/api/flows", Some(json!({"stop_id": "BS219565"})))
        .await;
    let flow_id = form["flow_id"].as_str().unwrap();

    let (status, body) = app
        .post(&format!("/api/flows/{flow_id}"), Some(json!({"buses": "126"})))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().is_some());

    let (_, entries) = app.get("/api/entries").await;
    assert!(entries["entries"].as_array().unwrap().is_empty());

    // The flow is still pending and accepts a corrected submission.
    let (_, created) = app
        .post(&format!("/api/flows/{flow_id}"), Some(json!({"buses": ["126"]})))
        .await;
    assert_eq!(created["type"], "create_entry");

    let (_, entries) = app.get("/api/entries").await;
    assert_eq!(
        entries["entries"][0]["configuration"]["selected_routes"],
        json!(["126"])
    );

    app.integration.shutdown().await;
}

#[tokio::test]
async fn malformed_options_leave_entry_unchanged() {
    let app = TestApp::start().await;
    let entry_id = app.configure(&["126", "720"]).await;

    let (_, form) = app
        .post(&format!("/api/entries/{entry_id}/options"), None)
        .await;
    let flow_id = form["flow_id"].as_str().unwrap();

    let (status, _) = app
        .post(
            &format!("/api/options/{flow_id}"),
            Some(json!({"buses": ["720"], "scan_interval": "300"})),
        )
        .await;
    assert_eq!(status, 400);

    let (_, entries) = app.get("/api/entries").await;
    let configuration = &entries["entries"][0]["configuration"];
    assert_eq!(configuration["selected_routes"], json!(["126", "720"]));
    assert_eq!(configuration["poll_interval_secs"], 90);

    let (status, saved) = app
        .post(
            &format!("/api/options/{flow_id}"),
            Some(json!({"buses": ["720"], "scan_interval": 300})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(saved["entry_id"], entry_id.as_str());

    let (_, entries) = app.get("/api/entries").await;
    let configuration = &entries["entries"][0]["configuration"];
    assert_eq!(configuration["selected_routes"], json!(["720"]));
    assert_eq!(configuration["poll_interval_secs"], 300);

    app.integration.shutdown().await;
}

#[tokio::test]
async fn unknown_flow_is_not_found() {
    let app = TestApp::start().await;

    let (status, _) = app
        .post("/api/options/0000000000000000", Some(json!({})))
        .await;
    assert_eq!(status, 404);
}
