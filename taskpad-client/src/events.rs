use std::sync::Mutex;

use crate::session::SessionState;

/// Notifications the presentation layer can subscribe to, e.g. to redirect
/// to the login screen when the session ends.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    SessionChanged(SessionState),
    TasksRefreshed(usize),
    TaskCreated(i64),
    TaskUpdated(i64),
    TaskRemoved(i64),
    SyncError(String),
}

type Listener = Box<dyn Fn(&ClientEvent) + Send + Sync>;

/// Fan-out of client events to registered listeners.
pub struct EventDispatcher {
    listeners: Mutex<Vec<Listener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push(Box::new(listener)),
            Err(_) => tracing::error!("Failed to acquire listener lock for subscription"),
        }
    }

    pub fn emit(&self, event: ClientEvent) {
        let listeners = match self.listeners.lock() {
            Ok(listeners) => listeners,
            Err(_) => {
                tracing::error!("Failed to acquire listener lock for event emission");
                return;
            }
        };

        for listener in listeners.iter() {
            listener(&event);
        }
    }

    pub fn emit_session_changed(&self, state: SessionState) {
        self.emit(ClientEvent::SessionChanged(state));
    }

    pub fn emit_tasks_refreshed(&self, count: usize) {
        self.emit(ClientEvent::TasksRefreshed(count));
    }

    pub fn emit_task_created(&self, id: i64) {
        self.emit(ClientEvent::TaskCreated(id));
    }

    pub fn emit_task_updated(&self, id: i64) {
        self.emit(ClientEvent::TaskUpdated(id));
    }

    pub fn emit_task_removed(&self, id: i64) {
        self.emit(ClientEvent::TaskRemoved(id));
    }

    pub fn emit_sync_error(&self, message: &str) {
        self.emit(ClientEvent::SyncError(message.to_string()));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
