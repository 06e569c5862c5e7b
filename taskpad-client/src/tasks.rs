use std::sync::Arc;

use taskpad_core::models::Task;
use taskpad_core::protocol::{NewTask, TaskUpdate};
use tokio::sync::Mutex;

use crate::errors::ClientError;
use crate::events::EventDispatcher;
use crate::http::ApiClient;
use crate::session::SessionManager;

/// Locally cached, server-authoritative view of the user's tasks.
///
/// Every operation requires an active session and fails closed without one.
/// Mutations are transactional from the caller's perspective: they either
/// fully succeed and patch the cache, or fail and leave it exactly as it
/// was. Only [`TaskStore::refresh`] may rebuild the cache wholesale; the
/// other operations patch the minimum state they touch so two in-flight
/// calls cannot clobber each other's unrelated entries.
pub struct TaskStore {
    api: ApiClient,
    session: Arc<SessionManager>,
    cache: Mutex<Vec<Task>>,
    events: Arc<EventDispatcher>,
}

impl TaskStore {
    pub fn new(
        api: ApiClient,
        session: Arc<SessionManager>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            api,
            session,
            cache: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Snapshot of the cached collection, in server order.
    pub async fn tasks(&self) -> Vec<Task> {
        self.cache.lock().await.clone()
    }

    /// Fetches the full collection and replaces the cache wholesale.
    pub async fn refresh(&self) -> Result<Vec<Task>, ClientError> {
        let token = self.session.bearer().await?;

        let tasks: Vec<Task> = match self.api.get_json("/tasks", Some(&token)).await {
            Ok(tasks) => tasks,
            Err(e) => return Err(self.fail(e).await),
        };

        *self.cache.lock().await = tasks.clone();
        tracing::info!("Task cache rebuilt with {} tasks", tasks.len());
        self.events.emit_tasks_refreshed(tasks.len());
        Ok(tasks)
    }

    /// Creates a task server-side, then refreshes so the server-assigned
    /// `id` and `created_at` land in the cache.
    ///
    /// Both fields must be non-empty. Repeated calls create duplicate tasks;
    /// the server applies no deduplication. Note the returned error does not
    /// imply the task was never created — a later [`TaskStore::refresh`]
    /// reconciles.
    pub async fn create(&self, title: &str, description: &str) -> Result<Task, ClientError> {
        let token = self.session.bearer().await?;

        if title.trim().is_empty() {
            return Err(ClientError::CreateFailed(
                "title must not be empty".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(ClientError::CreateFailed(
                "description must not be empty".to_string(),
            ));
        }

        let body = NewTask {
            title: title.to_string(),
            description: description.to_string(),
        };

        let created: Task = match self.api.post_json("/tasks", &body, Some(&token)).await {
            Ok(task) => task,
            Err(e) => return Err(self.fail(map_create(e)).await),
        };

        tracing::info!("Created task {} on server", created.id);
        self.events.emit_task_created(created.id);

        self.refresh().await?;
        Ok(created)
    }

    /// Flips a task's `completed` flag, confirm-then-patch: the cache entry
    /// changes only after the server acknowledged the update.
    ///
    /// The PATCH body resends the unchanged `title` and `description`
    /// alongside the flipped flag; the endpoint clears omitted fields.
    pub async fn toggle_completion(&self, id: i64) -> Result<Task, ClientError> {
        let token = self.session.bearer().await?;

        let update = {
            let cache = self.cache.lock().await;
            let task = cache
                .iter()
                .find(|t| t.id == id)
                .ok_or(ClientError::NotFound(id))?;
            TaskUpdate {
                title: task.title.clone(),
                description: task.description.clone(),
                completed: !task.completed,
            }
        };

        let path = format!("/tasks/{}", id);
        let confirmed: Task = match self.api.patch_json(&path, &update, Some(&token)).await {
            Ok(task) => task,
            Err(e) => return Err(self.fail(map_update(id, e)).await),
        };

        // Patch the single flag; the entry may have been removed by a
        // concurrent delete, in which case there is nothing to patch.
        let mut cache = self.cache.lock().await;
        if let Some(task) = cache.iter_mut().find(|t| t.id == id) {
            task.completed = confirmed.completed;
        }
        drop(cache);

        self.events.emit_task_updated(id);
        Ok(confirmed)
    }

    /// Deletes a task server-side and drops the matching cache entry.
    ///
    /// A returned error does not imply the server kept the task — the
    /// response may have been lost after the delete applied. A later
    /// [`TaskStore::refresh`] reconciles.
    pub async fn remove(&self, id: i64) -> Result<(), ClientError> {
        let token = self.session.bearer().await?;

        let path = format!("/tasks/{}", id);
        if let Err(e) = self.api.delete(&path, Some(&token)).await {
            return Err(self.fail(map_delete(id, e)).await);
        }

        self.cache.lock().await.retain(|t| t.id != id);
        tracing::info!("Deleted task {}", id);
        self.events.emit_task_removed(id);
        Ok(())
    }

    /// Routes an authorization rejection through implicit logout before the
    /// error is handed back to the caller.
    async fn fail(&self, err: ClientError) -> ClientError {
        if matches!(err, ClientError::AuthorizationExpired) {
            if let Err(e) = self.session.invalidate().await {
                tracing::error!("Failed to clear invalidated session: {}", e);
            }
        }
        self.events.emit_sync_error(&err.to_string());
        err
    }
}

fn map_create(err: ClientError) -> ClientError {
    match err {
        ClientError::Rejected { message, .. } | ClientError::Network(message) => {
            ClientError::CreateFailed(message)
        }
        other => other,
    }
}

fn map_update(id: i64, err: ClientError) -> ClientError {
    match err {
        ClientError::Rejected { message, .. } | ClientError::Network(message) => {
            ClientError::UpdateFailed {
                id,
                reason: message,
            }
        }
        other => other,
    }
}

fn map_delete(id: i64, err: ClientError) -> ClientError {
    match err {
        ClientError::Rejected { message, .. } | ClientError::Network(message) => {
            ClientError::DeleteFailed {
                id,
                reason: message,
            }
        }
        other => other,
    }
}
