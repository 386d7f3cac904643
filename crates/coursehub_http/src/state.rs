use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

pub type SharedState = Arc<AppState>;

/// Shared handler state.
///
/// SQLite connections are not `Sync`; every handler takes the lock, runs its
/// repository calls synchronously and releases it before returning.
pub struct AppState {
    pub db: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> SharedState {
        Arc::new(Self {
            db: Mutex::new(conn),
        })
    }
}
