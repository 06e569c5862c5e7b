use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task as the server reports it.
///
/// `id` and `created_at` are assigned server-side and never change; the
/// remaining fields are mutable only through explicit update calls. The wire
/// format is camelCase JSON (`createdAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
