use serde::{Deserialize, Serialize};

/// Body of `POST /signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful response to login/signup. The server sends additional fields
/// alongside the token; only the token matters to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Body of `POST /tasks`. The server assigns `id` and `createdAt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// Body of `PATCH /tasks/:id`.
///
/// The endpoint expects the full mutable field set on every update; a
/// partial payload would implicitly clear the omitted fields server-side,
/// so unchanged values are resent as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: String,
    pub description: String,
    pub completed: bool,
}
