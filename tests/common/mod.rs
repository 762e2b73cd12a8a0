//! In-process stand-in for the Django backend.
//!
//! Records every request and enforces CSRF like the real thing: a mutating
//! request needs an `X-CSRFToken` header matching the `csrftoken` cookie.

#![allow(dead_code)]

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const CSRF_TOKEN: &str = "tok123";
const SESSION: &str = "sess-alice";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub csrf: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone, Default)]
pub struct Backend {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_logout: Arc<AtomicBool>,
    garbage_me: Arc<AtomicBool>,
}

impl Backend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_logout(&self) {
        self.fail_logout.store(true, Ordering::SeqCst);
    }

    pub fn garbage_me(&self) {
        self.garbage_me.store(true, Ordering::SeqCst);
    }
}

pub struct MockServer {
    pub origin: String,
    pub backend: Backend,
}

pub async fn spawn() -> MockServer {
    let backend = Backend::default();

    let app = Router::new()
        .route("/api/users/csrf/", get(csrf))
        .route("/api/users/login/", post(login))
        .route("/api/users/register/", post(register))
        .route("/api/users/logout/", post(logout))
        .route("/api/users/me/", get(me))
        .route("/api/events/", get(list_events).post(create_event))
        .route(
            "/api/events/{id}/",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route(
            "/api/events/{id}/participate/",
            post(participate).delete(leave),
        )
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        origin: format!("http://{addr}"),
        backend,
    }
}

/// An origin nothing is listening on.
pub async fn dead_origin() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split("; ")
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    let csrf = header_str(headers, "x-csrftoken");
    let cookie_token = cookie(headers, "csrftoken").map(str::to_string);
    let call = Call {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        csrf: csrf.clone(),
        content_type: header_str(headers, "content-type"),
    };
    backend.calls.lock().unwrap().push(call);

    let safe = matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS);
    if !safe && (csrf.is_none() || csrf != cookie_token) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "CSRF Failed: CSRF token missing."})),
        )
            .into_response();
    }

    next.run(request).await
}

fn alice() -> Value {
    json!({"id": 1, "username": "alice", "email": "a@x.com"})
}

fn event_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Five-a-side, bring boots",
        "event_type": "match",
        "location": "Hackney Marshes",
        "latitude": "51.558900",
        "longitude": "-0.033100",
        "start_date": "2026-10-25T10:00:00Z",
        "end_date": "2026-10-25T12:00:00Z",
        "created_by": alice(),
        "participants": [],
        "participant_count": 0,
        "max_participants": 10,
        "is_active": true
    })
}

async fn csrf() -> Response {
    (
        [(header::SET_COOKIE, format!("csrftoken={CSRF_TOKEN}; Path=/"))],
        Json(json!({"detail": "CSRF cookie set"})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "alice" && body["password"] == "secret" {
        (
            [(header::SET_COOKIE, format!("sessionid={SESSION}; Path=/; HttpOnly"))],
            Json(alice()),
        )
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Username already taken"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, format!("sessionid={SESSION}; Path=/; HttpOnly"))],
        Json(json!({"id": 2, "username": body["username"], "email": body["email"]})),
    )
        .into_response()
}

async fn logout(State(backend): State<Backend>) -> Response {
    if backend.fail_logout.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Logout failed"})),
        )
            .into_response();
    }
    (
        [(header::SET_COOKIE, "sessionid=; Max-Age=0; Path=/")],
        Json(json!({})),
    )
        .into_response()
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.garbage_me.load(Ordering::SeqCst) {
        return (StatusCode::OK, "definitely not json").into_response();
    }
    match cookie(&headers, "sessionid") {
        Some(SESSION) => Json(alice()).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        )
            .into_response(),
    }
}

async fn list_events() -> Response {
    Json(json!([event_json(7, "Sunday kickabout")])).into_response()
}

async fn create_event(Json(body): Json<Value>) -> Response {
    let title = body["title"].as_str().unwrap_or_default().to_string();
    (StatusCode::CREATED, Json(event_json(8, &title))).into_response()
}

async fn get_event(Path(id): Path<i64>) -> Response {
    if id == 7 {
        Json(event_json(7, "Sunday kickabout")).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
    }
}

async fn update_event(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    let title = body["title"].as_str().unwrap_or("Sunday kickabout").to_string();
    Json(event_json(id, &title)).into_response()
}

async fn delete_event(Path(_id): Path<i64>) -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn participate(Path(id): Path<i64>) -> Response {
    if id == 9 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Event is full"})),
        )
            .into_response();
    }
    StatusCode::OK.into_response()
}

async fn leave(Path(_id): Path<i64>) -> Response {
    StatusCode::NO_CONTENT.into_response()
}
