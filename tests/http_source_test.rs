//! HTTP data source against an in-process stand-in for the backend

use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use upa_monitor::config::{Config, OAuthConfig};
use upa_monitor::monitor::QueueMonitor;
use upa_monitor::source::{HttpDataSource, UpaDataSource};
use upa_monitor::stats::StatisticsQuery;
use upa_monitor::Error;

#[derive(Default)]
struct Backend {
    issued: AtomicUsize,
    /// Tokens numbered below this are rejected
    min_valid: AtomicUsize,
    appointment_queries: Mutex<Vec<HashMap<String, String>>>,
}

impl Backend {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer token-"))
            .and_then(|n| n.parse::<usize>().ok())
            .is_some_and(|n| n >= self.min_valid.load(Ordering::SeqCst))
    }

    fn revoke_all(&self) {
        self.min_valid
            .store(self.issued.load(Ordering::SeqCst) + 1, Ordering::SeqCst);
    }
}

type Shared = Arc<Backend>;

async fn token(State(backend): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Response {
    let valid = form.get("grant_type").map(String::as_str) == Some("password")
        && form.get("client_id").map(String::as_str) == Some("mobile")
        && form.get("username").map(String::as_str) == Some("painel")
        && form.get("password").map(String::as_str) == Some("hunter2");
    if !valid {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "invalid_grant"}))).into_response();
    }

    let n = backend.issued.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({"access_token": format!("token-{n}"), "token_type": "Bearer", "expires_in": 3600}))
        .into_response()
}

async fn units(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        {"id": 1, "nome": "UPA Centro", "endereco": "Rua Principal, 100", "latitude": -23.5505, "longitude": -46.6333},
        {"id": 2, "nome": "UPA Zona Norte", "endereco": "Av. Norte, 500", "latitude": "-23.5405", "longitude": "-46.6233"}
    ]))
    .into_response()
}

async fn unit(State(backend): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found"}))).into_response();
    }
    Json(json!({"id": 1, "nome": "UPA Centro", "endereco": "Rua Principal, 100"})).into_response()
}

async fn services(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let all = vec![
        json!({"id": 1, "nome": "Clínica Geral", "unidadeId": 1}),
        json!({"id": 2, "nome": "Pediatria", "unidade": {"id": 1}}),
        json!({"id": 4, "nome": "Clínica Geral", "unidadeId": 2}),
    ];
    let filtered: Vec<Value> = match params.get("unidade").and_then(|u| u.parse::<i64>().ok()) {
        Some(unit_id) => all
            .into_iter()
            .filter(|s| {
                s["unidadeId"].as_i64() == Some(unit_id) || s["unidade"]["id"].as_i64() == Some(unit_id)
            })
            .collect(),
        None => all,
    };
    Json(Value::Array(filtered)).into_response()
}

async fn appointments(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let waiting_only = params.get("status").map(String::as_str) == Some("1");
    let malformed_batch = params.get("unidade").map(String::as_str) == Some("3");
    backend
        .appointment_queries
        .lock()
        .unwrap()
        .push(params);

    if waiting_only {
        return Json(json!([
            {"id": 100, "status": "aguardando", "servico": {"id": 1}},
            {"id": 101, "status": "aguardando", "servico": {"id": 2}}
        ]))
        .into_response();
    }

    if malformed_batch {
        return Json(json!([
            {"id": 20, "status": "finalizado", "dataInicio": "2025-03-10T13:40:00Z", "dataFim": "2025-03-10T14:00:00Z"},
            {"id": 21, "status": "finalizado", "dataInicio": "2025-03-10T13:40:00Z", "dataFim": 1741615200000_i64},
            {"id": 22, "status": null, "dataFim": "2025-03-10T14:00:00Z"},
            {"status": "finalizado", "dataInicio": "2025-03-10T13:30:00Z", "dataFim": "2025-03-10T14:00:00Z"},
            {"id": 24, "status": "finalizado", "dataInicio": "2025-03-10T13:00:00Z", "dt_fim": "2025-03-10T14:00:00Z"},
            {"id": 25, "status": "finalizado", "dataFim": "", "dt_fim": "2025-03-10T14:00:00Z"},
            "not an appointment"
        ]))
        .into_response();
    }

    // Service filter deliberately ignored
    Json(json!([
        {"id": 1, "status": "finalizado", "dataInicio": "2025-03-10T13:50:00Z", "dataFim": "2025-03-10T14:00:00Z", "servico": {"id": 1}},
        {"id": 2, "status": "finalizado", "dataInicio": "2025-03-10T13:40:00Z", "dataFim": "2025-03-10T14:00:00Z", "servico": {"id": 1}},
        {"id": 3, "status": "finalizado", "dataInicio": "2025-03-10T13:00:00Z", "dataFim": "2025-03-10T14:00:00Z", "servico": {"id": 2}},
        {"id": 4, "status": "finalizado", "dataInicio": "2025-03-10T08:00:00Z", "dataFim": "2025-03-10T14:00:00Z", "servico": {"id": 1}},
        {"id": 5, "status": "finalizado", "dataInicio": null, "dataFim": null, "servico": {"id": 1}},
        {"id": 6, "status": "aguardando", "dataInicio": "2025-03-10T13:55:00Z", "servico": {"id": 1}}
    ]))
    .into_response()
}

async fn panel(State(backend): State<Shared>, headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    if !backend.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([{"senha": "CG012", "servico": "Clínica Geral", "guiche": 2}])).into_response()
}

async fn spawn_backend() -> (String, Shared) {
    let backend: Shared = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/api/unidades", get(units))
        .route("/api/unidades/{id}", get(unit))
        .route("/api/servicos", get(services))
        .route("/api/atendimentos", get(appointments))
        .route("/api/painel/{id}", get(panel))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), backend)
}

fn config(base_url: &str, password: &str) -> Config {
    Config {
        api_base_url: Some(base_url.to_string()),
        oauth: OAuthConfig {
            client_id: "mobile".to_string(),
            client_secret: "s3cret".to_string(),
            username: "painel".to_string(),
            password: password.to_string(),
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_lists_units_and_reuses_token() {
    let (base_url, backend) = spawn_backend().await;
    let source = HttpDataSource::from_config(&config(&base_url, "hunter2")).unwrap();

    let units = source.list_units().await.unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[1].latitude, Some(-23.5405));

    let services = source.services_by_unit(1).await.unwrap();
    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Clínica Geral", "Pediatria"]);

    assert_eq!(backend.issued.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reauthenticates_after_rejected_token() {
    let (base_url, backend) = spawn_backend().await;
    let source = HttpDataSource::from_config(&config(&base_url, "hunter2")).unwrap();

    source.list_units().await.unwrap();
    backend.revoke_all();

    let units = source.list_units().await.unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(backend.issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_bad_credentials_are_auth_errors() {
    let (base_url, _backend) = spawn_backend().await;
    let source = HttpDataSource::from_config(&config(&base_url, "wrong")).unwrap();

    let err = source.list_units().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn test_missing_unit_is_not_found() {
    let (base_url, _backend) = spawn_backend().await;
    let source = HttpDataSource::from_config(&config(&base_url, "hunter2")).unwrap();

    assert_eq!(source.get_unit(1).await.unwrap().name, "UPA Centro");
    assert!(matches!(source.get_unit(7).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_statistics_refilter_by_service() {
    let (base_url, backend) = spawn_backend().await;
    let source = HttpDataSource::from_config(&config(&base_url, "hunter2")).unwrap();
    let monitor = QueueMonitor::new(Arc::new(source));

    // Service 1: 10 and 20 minutes averaged, the 6-hour record counted but
    // not averaged, the record without a finish time ignored
    let result = monitor.statistics(StatisticsQuery::for_service(1, 1)).await;
    assert_eq!(result.average_minutes, 15);
    assert_eq!(result.total_count, 3);

    let queries = backend.appointment_queries.lock().unwrap().clone();
    let last = queries.last().unwrap();
    assert_eq!(last.get("unidade").map(String::as_str), Some("1"));
    assert_eq!(last.get("servico").map(String::as_str), Some("1"));
    assert_eq!(last.get("limit").map(String::as_str), Some("1000"));
    assert!(!last.contains_key("status"));
}

#[tokio::test]
async fn test_queue_and_panel_endpoints() {
    let (base_url, backend) = spawn_backend().await;
    let source = HttpDataSource::from_config(&config(&base_url, "hunter2")).unwrap();

    let queue = source.queue_by_unit(1).await.unwrap();
    assert_eq!(queue.len(), 2);
    let queries = backend.appointment_queries.lock().unwrap().clone();
    assert_eq!(queries[0].get("status").map(String::as_str), Some("1"));

    let tickets = source.called_tickets(1).await.unwrap();
    assert_eq!(tickets[0].ticket, "CG012");
    assert_eq!(tickets[0].counter.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_unreachable_backend_degrades_statistics() {
    // Nothing listens on port 9 of localhost
    let source = HttpDataSource::from_config(&config("http://127.0.0.1:9", "hunter2")).unwrap();
    let monitor = QueueMonitor::new(Arc::new(source));

    let result = monitor.statistics(StatisticsQuery::for_unit(1)).await;
    assert_eq!(result.average_minutes, 15);
    assert_eq!(result.total_count, 0);
    assert!(monitor.unit_overviews().await.is_err());
}

#[tokio::test]
async fn test_malformed_records_do_not_sink_the_batch() {
    let (base_url, _backend) = spawn_backend().await;
    let source = HttpDataSource::from_config(&config(&base_url, "hunter2")).unwrap();

    // The bare string is skipped; every object decodes
    let records = source.appointments(&StatisticsQuery::for_unit(3)).await.unwrap();
    assert_eq!(records.len(), 6);

    // Averaged: 20 and 30 minutes. Counted: the numeric finish stamp and both
    // legacy-only finish stamps. The null status is not finalized.
    let monitor = QueueMonitor::new(Arc::new(source));
    let result = monitor.statistics(StatisticsQuery::for_unit(3)).await;
    assert_eq!(result.average_minutes, 25);
    assert_eq!(result.total_count, 5);
}
