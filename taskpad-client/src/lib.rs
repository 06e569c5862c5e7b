pub mod errors;
pub mod events;
pub mod http;
pub mod session;
pub mod tasks;
pub mod token_store;

pub use errors::ClientError;
pub use events::{ClientEvent, EventDispatcher};
pub use http::ApiClient;
pub use session::{SessionManager, SessionState};
pub use tasks::TaskStore;
pub use token_store::{TokenStore, TOKEN_KEY};
