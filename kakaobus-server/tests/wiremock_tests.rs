//! Integration tests for stop lookup and the configuration flows (wiremock-based)

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kakaobus_server::domain::{StopData, StopId, StopOptions};
use kakaobus_server::flow::{
    AbortReason, BASE_ERROR_KEY, FlowError, OptionsInput, OptionsStep, RouteSelection,
    SelectStep, StopInput, UserStep, config_flow, options_flow,
};
use kakaobus_server::host::{ConfigEntryStore, NewEntry};
use kakaobus_server::kakao::{KakaoClient, KakaoConfig, lookup_stop};

const STOP_JSON: &str = r#"{
    "name": "Lotte Castle",
    "lines": [
        {
            "name": "126",
            "arrival": {
                "direction": "Sujeong",
                "arrivalTime": 300,
                "arrivalTime2": 900,
                "realtimeState": "NORMAL",
                "vehicleType": "1"
            }
        },
        {
            "name": "720",
            "arrival": {
                "direction": "Seomyeon",
                "arrivalTime": 0,
                "realtimeState": "NOVEHICLE"
            }
        }
    ]
}"#;

fn client_for(server: &MockServer) -> KakaoClient {
    KakaoClient::new(KakaoConfig::default().with_base_url(server.uri()).with_timeout(5)).unwrap()
}

async fn mount_stop(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/bus/stop.json"))
        .and(query_param("busstopid", "BS219565"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn stop_id() -> StopId {
    StopId::parse("BS219565").unwrap()
}

fn stored_entry(routes: &[&str]) -> NewEntry {
    NewEntry {
        title: "Bus Stop BS219565".to_string(),
        unique_id: "BS219565".to_string(),
        data: StopData {
            stop_id: stop_id(),
            stop_name: "Lotte Castle".to_string(),
        },
        options: StopOptions::with_routes(routes.iter().map(|r| r.to_string()).collect()),
    }
}

#[tokio::test]
async fn lookup_returns_name_and_catalog() {
    let server = MockServer::start().await;
    mount_stop(&server, STOP_JSON).await;

    let info = lookup_stop(&client_for(&server), &stop_id()).await.unwrap();

    assert_eq!(info.stop_name, "Lotte Castle");
    assert_eq!(info.catalog.route_ids(), vec!["126", "720"]);
    assert_eq!(info.catalog.label("126"), Some("126 (Sujeong)"));
}

#[tokio::test]
async fn lookup_falls_back_to_stop_id_for_name() {
    let server = MockServer::start().await;
    mount_stop(&server, r#"{"lines":[{"name":"126"}]}"#).await;

    let info = lookup_stop(&client_for(&server), &stop_id()).await.unwrap();
    assert_eq!(info.stop_name, "BS219565");
    assert_eq!(info.catalog.label("126"), Some("126"));
}

#[tokio::test]
async fn lookup_without_routes_is_none() {
    let server = MockServer::start().await;
    mount_stop(&server, r#"{"name":"Nowhere","lines":[]}"#).await;

    assert!(lookup_stop(&client_for(&server), &stop_id()).await.is_none());
}

#[tokio::test]
async fn lookup_server_error_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bus/stop.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(lookup_stop(&client_for(&server), &stop_id()).await.is_none());
}

#[tokio::test]
async fn lookup_malformed_json_is_none() {
    let server = MockServer::start().await;
    mount_stop(&server, "<html>maintenance</html>").await;

    assert!(lookup_stop(&client_for(&server), &stop_id()).await.is_none());
}

#[tokio::test]
async fn invalid_stop_id_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STOP_JSON))
        .expect(0)
        .mount(&server)
        .await;

    let step = config_flow::step_user(
        &client_for(&server),
        &ConfigEntryStore::in_memory(),
        StopInput {
            stop_id: "not a stop!".to_string(),
        },
    )
    .await;

    let UserStep::Form(form) = step else {
        panic!("expected form, got {step:?}");
    };
    assert_eq!(form.error(BASE_ERROR_KEY), Some(FlowError::InvalidStopId));
}

#[tokio::test]
async fn unknown_stop_redisplays_form() {
    let server = MockServer::start().await;
    mount_stop(&server, r#"{"lines":[]}"#).await;

    let step = config_flow::step_user(
        &client_for(&server),
        &ConfigEntryStore::in_memory(),
        StopInput {
            stop_id: "BS219565".to_string(),
        },
    )
    .await;

    assert!(
        matches!(step, UserStep::Form(ref f) if f.error(BASE_ERROR_KEY) == Some(FlowError::InvalidStopId))
    );
}

#[tokio::test]
async fn configured_stop_aborts() {
    let server = MockServer::start().await;
    mount_stop(&server, STOP_JSON).await;
    let store = ConfigEntryStore::in_memory();
    store.add(stored_entry(&["126"])).await.unwrap();

    let step = config_flow::step_user(
        &client_for(&server),
        &store,
        StopInput {
            stop_id: " BS219565 ".to_string(),
        },
    )
    .await;

    assert!(matches!(step, UserStep::Abort(AbortReason::AlreadyConfigured)));
}

#[tokio::test]
async fn full_setup_flow_creates_entry() {
    let server = MockServer::start().await;
    mount_stop(&server, STOP_JSON).await;

    let step = config_flow::step_user(
        &client_for(&server),
        &ConfigEntryStore::in_memory(),
        StopInput {
            stop_id: "BS219565".to_string(),
        },
    )
    .await;

    let UserStep::SelectRoutes { draft, form } = step else {
        panic!("expected route selection, got {step:?}");
    };
    assert_eq!(draft.stop_name(), "Lotte Castle");
    assert!(form.field("buses").is_some());

    let selection = RouteSelection {
        routes: Some(vec!["720".to_string()]),
    };
    let SelectStep::Create(entry) = config_flow::step_select(&draft, selection) else {
        panic!("expected entry creation");
    };

    assert_eq!(entry.title, "Bus Stop BS219565");
    assert_eq!(entry.unique_id, "BS219565");
    assert_eq!(entry.data.stop_name, "Lotte Castle");
    assert_eq!(entry.options.routes, vec!["720".to_string()]);
    assert_eq!(entry.options.quiet_start, "00:00:00");
    assert_eq!(entry.options.quiet_end, "05:00:00");
    assert_eq!(entry.options.scan_interval, 90);
}

#[tokio::test]
async fn options_keep_route_missing_upstream() {
    let server = MockServer::start().await;
    mount_stop(&server, STOP_JSON).await;
    let store = ConfigEntryStore::in_memory();
    let entry = store.add(stored_entry(&["126", "987"])).await.unwrap();

    let (draft, form) = options_flow::step_init(&client_for(&server), &entry).await;

    assert!(!draft.lookup_failed());
    assert_eq!(form.error(BASE_ERROR_KEY), None);
    assert_eq!(draft.catalog().label("987"), Some("987 (old, not found)"));
    assert_eq!(draft.catalog().label("720"), Some("720 (Seomyeon)"));
    assert_eq!(
        form.field("buses").and_then(|f| f.default.clone()),
        Some(serde_json::json!(["126", "987"]))
    );

    let OptionsStep::Save(options) = options_flow::step_submit(&draft, OptionsInput::default())
    else {
        panic!("expected save");
    };
    assert_eq!(options.routes, vec!["126".to_string(), "987".to_string()]);
}

#[tokio::test]
async fn options_survive_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bus/stop.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let store = ConfigEntryStore::in_memory();
    let entry = store.add(stored_entry(&["126", "720"])).await.unwrap();

    let (draft, form) = options_flow::step_init(&client_for(&server), &entry).await;

    assert!(draft.lookup_failed());
    assert_eq!(form.error(BASE_ERROR_KEY), Some(FlowError::CannotConnect));
    assert_eq!(draft.catalog().label("126"), Some("126 (stale)"));
    assert_eq!(draft.catalog().route_ids(), vec!["126", "720"]);

    let input = OptionsInput {
        routes: Some(vec!["720".to_string()]),
        quiet_start: Some("23:00".to_string()),
        quiet_end: Some("06:00".to_string()),
        scan_interval: Some(5),
    };
    let OptionsStep::Save(options) = options_flow::step_submit(&draft, input) else {
        panic!("expected save");
    };
    assert_eq!(options.routes, vec!["720".to_string()]);
    assert_eq!(options.quiet_start, "23:00");
    assert_eq!(options.scan_interval, 30);
}
