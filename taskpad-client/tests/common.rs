#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use taskpad_client::{ApiClient, EventDispatcher, SessionManager, TaskStore, TokenStore};
use taskpad_core::models::Task;
use taskpad_core::protocol::{LoginRequest, NewTask, SignupRequest, TaskUpdate};
use tokio::sync::Mutex;

pub const VALID_EMAIL: &str = "a@x.com";
pub const VALID_PASSWORD: &str = "secret";
pub const TEST_TOKEN: &str = "test-token-1";

/// Mutable backend state shared with the handlers, with failure-injection
/// switches so tests can simulate server rejections.
pub struct ServerState {
    pub tasks: Vec<Task>,
    pub next_id: i64,
    pub request_count: usize,
    /// Respond 401 to every bearer-authorized request.
    pub reject_authorized: bool,
    /// Respond 500 to `/logout`.
    pub fail_logout: bool,
    /// Respond 500 to task mutations without applying them.
    pub fail_mutations: bool,
    /// Apply a delete, then respond 500 anyway ("response lost").
    pub fail_delete_after_apply: bool,
}

impl ServerState {
    fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            request_count: 0,
            reject_authorized: false,
            fail_logout: false,
            fail_mutations: false,
            fail_delete_after_apply: false,
        }
    }
}

type SharedState = Arc<Mutex<ServerState>>;

/// In-process mock of the task service REST API, bound to a random port.
pub struct MockServer {
    pub addr: SocketAddr,
    pub state: SharedState,
}

impl MockServer {
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(ServerState::new()));

        let app = Router::new()
            .route("/signup", post(signup))
            .route("/login", post(login_handler))
            .route("/logout", post(logout))
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/tasks/:id", patch(update_task).delete(delete_task))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn request_count(&self) -> usize {
        self.state.lock().await.request_count
    }

    /// Inserts a task directly into the backend, bypassing the API.
    pub async fn seed_task(&self, title: &str, description: &str, completed: bool) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;
        state.tasks.push(Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            completed,
            created_at: Utc::now(),
        });
        id
    }

    pub async fn server_tasks(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }
}

/// Process-unique shared-cache in-memory database URL, so each test gets an
/// isolated token store that can still be reopened within the test.
pub fn unique_db_url() -> String {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    format!(
        "file:taskpad_it_{}?mode=memory&cache=shared",
        NEXT.fetch_add(1, Ordering::SeqCst)
    )
}

pub async fn build_session(
    server: &MockServer,
    db_url: &str,
    events: Arc<EventDispatcher>,
) -> Arc<SessionManager> {
    let api = ApiClient::new(server.url()).unwrap();
    let store = TokenStore::new(db_url).await.unwrap();
    Arc::new(SessionManager::new(api, store, events).await.unwrap())
}

/// A full client stack wired against a fresh mock server.
pub struct TestClient {
    pub server: MockServer,
    pub db_url: String,
    pub events: Arc<EventDispatcher>,
    pub session: Arc<SessionManager>,
    pub store: TaskStore,
}

pub async fn setup() -> TestClient {
    let server = MockServer::start().await;
    let db_url = unique_db_url();
    let events = Arc::new(EventDispatcher::new());
    let session = build_session(&server, &db_url, events.clone()).await;
    let api = ApiClient::new(server.url()).unwrap();
    let store = TaskStore::new(api, session.clone(), events.clone());

    TestClient {
        server,
        db_url,
        events,
        session,
        store,
    }
}

pub async fn login(client: &TestClient) {
    client
        .session
        .login(VALID_EMAIL, VALID_PASSWORD)
        .await
        .unwrap();
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TEST_TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "unauthorized"})),
    )
}

async fn signup(
    State(state): State<SharedState>,
    Json(body): Json<SignupRequest>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.request_count += 1;

    if body.email.is_empty() || body.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "email and password are required"})),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "token": TEST_TOKEN,
            "user": {"email": body.email, "firstName": body.first_name, "lastName": body.last_name}
        })),
    )
}

async fn login_handler(
    State(state): State<SharedState>,
    Json(body): Json<LoginRequest>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.request_count += 1;

    if body.email == VALID_EMAIL && body.password == VALID_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({"token": TEST_TOKEN, "user": {"email": body.email}})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "invalid credentials"})),
        )
    }
}

async fn logout(headers: HeaderMap, State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.request_count += 1;

    if !authorized(&headers) {
        return unauthorized();
    }
    if state.fail_logout {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "logout unavailable"})),
        );
    }

    (StatusCode::OK, Json(json!({})))
}

async fn list_tasks(
    headers: HeaderMap,
    State(state): State<SharedState>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.request_count += 1;

    if !authorized(&headers) || state.reject_authorized {
        return unauthorized();
    }

    (
        StatusCode::OK,
        Json(serde_json::to_value(&state.tasks).unwrap()),
    )
}

async fn create_task(
    headers: HeaderMap,
    State(state): State<SharedState>,
    Json(body): Json<NewTask>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.request_count += 1;

    if !authorized(&headers) || state.reject_authorized {
        return unauthorized();
    }
    if state.fail_mutations {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "create failed"})),
        );
    }
    if body.title.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "title is required"})),
        );
    }

    let id = state.next_id;
    state.next_id += 1;
    let task = Task {
        id,
        title: body.title,
        description: body.description,
        completed: false,
        created_at: Utc::now(),
    };
    state.tasks.push(task.clone());

    (StatusCode::CREATED, Json(serde_json::to_value(&task).unwrap()))
}

async fn update_task(
    Path(id): Path<i64>,
    headers: HeaderMap,
    State(state): State<SharedState>,
    Json(body): Json<TaskUpdate>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.request_count += 1;

    if !authorized(&headers) || state.reject_authorized {
        return unauthorized();
    }
    if state.fail_mutations {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "update failed"})),
        );
    }

    match state.tasks.iter_mut().find(|t| t.id == id) {
        Some(task) => {
            task.title = body.title;
            task.description = body.description;
            task.completed = body.completed;
            let task = task.clone();
            (StatusCode::OK, Json(serde_json::to_value(&task).unwrap()))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "no such task"})),
        ),
    }
}

async fn delete_task(
    Path(id): Path<i64>,
    headers: HeaderMap,
    State(state): State<SharedState>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().await;
    state.request_count += 1;

    if !authorized(&headers) || state.reject_authorized {
        return unauthorized();
    }
    if state.fail_delete_after_apply {
        // The delete lands, but the client never sees a success response.
        state.tasks.retain(|t| t.id != id);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "response lost"})),
        );
    }
    if state.fail_mutations {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "delete failed"})),
        );
    }

    state.tasks.retain(|t| t.id != id);
    (StatusCode::OK, Json(json!({})))
}
