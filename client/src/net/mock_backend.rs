//! In-process stand-in for the hotel backend, used by async tests.
//!
//! Every request lands in one fallback handler that counts hits per
//! `METHOD path`, records the `Authorization` header, and answers from
//! mutable fixtures. Authenticated routes accept exactly the current
//! `valid_access` token.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

pub(crate) const VALID_EMAIL: &str = "admin@hotel.test";
pub(crate) const VALID_PASSWORD: &str = "correct-horse";

pub(crate) struct MockState {
    pub valid_access: Mutex<String>,
    pub valid_refresh: Mutex<String>,
    /// Token handed out by the refresh endpoint.
    pub refreshed_access: Mutex<String>,
    pub refresh_fails: AtomicBool,
    pub logout_fails: AtomicBool,
    /// Overrides the `/auth/status/` body when set.
    pub status_body: Mutex<Option<Value>>,
    pub bookings: Mutex<Vec<Value>>,
    pub specials: Mutex<Vec<Value>>,
    pub menu_items: Mutex<Vec<Value>>,
    pub stats: Mutex<Value>,
    hits: Mutex<HashMap<String, usize>>,
    auth_headers: Mutex<Vec<Option<String>>>,
    queries: Mutex<Vec<String>>,
    bodies: Mutex<Vec<(String, String)>>,
}

impl MockState {
    fn new() -> Self {
        Self {
            valid_access: Mutex::new("access-1".into()),
            valid_refresh: Mutex::new("refresh-1".into()),
            refreshed_access: Mutex::new("access-2".into()),
            refresh_fails: AtomicBool::new(false),
            logout_fails: AtomicBool::new(false),
            status_body: Mutex::new(None),
            bookings: Mutex::new(Vec::new()),
            specials: Mutex::new(Vec::new()),
            menu_items: Mutex::new(Vec::new()),
            stats: Mutex::new(json!({ "total_bookings": 0 })),
            hits: Mutex::new(HashMap::new()),
            auth_headers: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `"METHOD /path/"` was requested (path relative to `/api`).
    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    /// `Authorization` headers seen, in arrival order.
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().unwrap().last().cloned()
    }

    /// Last raw body received for `"METHOD /path/"`.
    pub fn last_body(&self, key: &str) -> Option<String> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, body)| body.clone())
    }

    pub fn set_valid_access(&self, token: &str) {
        *self.valid_access.lock().unwrap() = token.to_owned();
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

pub(crate) struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub(crate) fn identity_json() -> Value {
    json!({
        "id": 1,
        "email": VALID_EMAIL,
        "first_name": "Front",
        "last_name": "Desk",
        "is_admin": true
    })
}

pub(crate) fn booking_json(id: i64, reference: &str, status: &str, total: &str, booking_date: &str) -> Value {
    json!({
        "id": id,
        "booking_reference": reference,
        "full_name": format!("Guest {id}"),
        "email": format!("guest{id}@example.com"),
        "phone": "555-0100",
        "check_in": "2030-01-10",
        "check_out": "2030-01-12",
        "adults": 2,
        "children": 0,
        "selected_rooms": [],
        "total_price": total,
        "nights": 2,
        "booking_date": booking_date,
        "status": status
    })
}

pub(crate) async fn spawn() -> MockBackend {
    let state = Arc::new(MockState::new());
    let app = Router::new().fallback(handle).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    MockBackend { base_url: format!("http://{addr}/api"), state, handle }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path()).to_owned();
    let key = format!("{method} {path}");
    *state.hits.lock().unwrap().entry(key.clone()).or_default() += 1;
    state.auth_headers.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned),
    );
    if let Some(query) = uri.query() {
        state.queries.lock().unwrap().push(query.to_owned());
    }
    let raw_body = String::from_utf8_lossy(&body).into_owned();
    state.bodies.lock().unwrap().push((key, raw_body.clone()));
    let json_body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "login"]) => login(&state, &json_body),
        ("POST", ["auth", "token", "refresh"]) => refresh(&state, &json_body),
        ("POST", ["auth", "logout"]) => {
            if state.logout_fails.load(Ordering::SeqCst) {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))).into_response()
            } else {
                Json(json!({ "success": true })).into_response()
            }
        }
        ("GET", ["always-401"]) => unauthorized(),
        _ if !state.authorized(&headers) => unauthorized(),
        ("GET", ["auth", "status"]) => {
            let body = state
                .status_body
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| json!({ "success": true, "user": identity_json() }));
            Json(body).into_response()
        }
        ("GET", ["room-bookings"]) => {
            Json(json!({ "data": state.bookings.lock().unwrap().clone() })).into_response()
        }
        ("GET", ["room-bookings", "stats"]) => {
            Json(json!({ "data": state.stats.lock().unwrap().clone() })).into_response()
        }
        ("GET", ["room-bookings", key]) => match find_booking(&state, key) {
            Some(booking) => Json(json!({ "data": booking })).into_response(),
            None => not_found(),
        },
        ("PATCH", ["room-bookings", key]) => {
            let mut bookings = state.bookings.lock().unwrap();
            let Some(booking) = bookings.iter_mut().find(|b| booking_matches(b, key)) else {
                return not_found();
            };
            if let Some(status) = json_body.get("status") {
                booking["status"] = status.clone();
            }
            Json(booking.clone()).into_response()
        }
        ("DELETE", ["room-bookings", key]) => {
            let mut bookings = state.bookings.lock().unwrap();
            let before = bookings.len();
            bookings.retain(|b| !booking_matches(b, key));
            if bookings.len() == before { not_found() } else { StatusCode::NO_CONTENT.into_response() }
        }
        ("GET", ["menu", "items"]) => {
            let items = state.menu_items.lock().unwrap().clone();
            Json(json!({ "count": items.len(), "results": items })).into_response()
        }
        ("POST", ["menu", "items"]) => {
            (StatusCode::CREATED, Json(created_menu_item(&raw_body))).into_response()
        }
        ("PATCH", ["menu", "items", _]) => Json(created_menu_item(&raw_body)).into_response(),
        ("DELETE", ["menu", "items", _]) => StatusCode::NO_CONTENT.into_response(),
        ("GET", ["menu", "daily-specials"]) => {
            Json(json!({ "results": state.specials.lock().unwrap().clone() })).into_response()
        }
        ("POST", ["menu", "daily-specials"]) => {
            if !raw_body.contains("name=\"name\"") {
                return (StatusCode::BAD_REQUEST, Json(json!({ "name": ["This field is required."] })))
                    .into_response();
            }
            (StatusCode::CREATED, Json(special_json(99, false))).into_response()
        }
        ("POST", ["menu", "daily-specials", id, action @ ("activate" | "deactivate")]) => {
            let id: i64 = id.parse().unwrap_or(0);
            let mut specials = state.specials.lock().unwrap();
            let Some(special) = specials.iter_mut().find(|s| s["id"] == id) else {
                return not_found();
            };
            special["is_active"] = Value::Bool(*action == "activate");
            Json(json!({ "success": true, "data": special.clone() })).into_response()
        }
        ("DELETE", ["menu", "daily-specials", _]) => StatusCode::NO_CONTENT.into_response(),
        _ => not_found(),
    }
}

pub(crate) fn special_json(id: i64, is_active: bool) -> Value {
    json!({
        "id": id,
        "name": format!("Special {id}"),
        "description": "Chef's choice",
        "price": "18.00",
        "image": null,
        "date": "2030-01-10",
        "is_active": is_active,
        "created_at": "2030-01-10T08:00:00Z",
        "updated_at": "2030-01-10T08:00:00Z"
    })
}

fn created_menu_item(raw_body: &str) -> Value {
    json!({
        "id": 501,
        "name": if raw_body.contains("Tomato Soup") { "Tomato Soup" } else { "Item" },
        "description": "",
        "price": "6.50",
        "image": null
    })
}

fn login(state: &MockState, body: &Value) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    if email == VALID_EMAIL && password == VALID_PASSWORD {
        Json(json!({
            "success": true,
            "tokens": {
                "access": state.valid_access.lock().unwrap().clone(),
                "refresh": state.valid_refresh.lock().unwrap().clone()
            },
            "user": identity_json()
        }))
        .into_response()
    } else if email.is_empty() {
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": "Email is required" }))).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "success": false, "message": "Invalid credentials" })))
            .into_response()
    }
}

fn refresh(state: &MockState, body: &Value) -> Response {
    let presented = body.get("refresh").and_then(Value::as_str).unwrap_or_default();
    if state.refresh_fails.load(Ordering::SeqCst) || presented != *state.valid_refresh.lock().unwrap() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Token is invalid or expired" })))
            .into_response();
    }
    let access = state.refreshed_access.lock().unwrap().clone();
    state.set_valid_access(&access);
    Json(json!({ "access": access })).into_response()
}

fn find_booking(state: &MockState, key: &str) -> Option<Value> {
    state
        .bookings
        .lock()
        .unwrap()
        .iter()
        .find(|b| booking_matches(b, key))
        .cloned()
}

fn booking_matches(booking: &Value, key: &str) -> bool {
    booking["booking_reference"] == key || key.parse::<i64>().is_ok_and(|id| booking["id"] == id)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Given token not valid for any token type" })),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}
