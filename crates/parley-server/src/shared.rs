//! Shared driver handle.
//!
//! The model is strictly sequential, so a host that serves connections from
//! several tasks puts the whole driver behind one lock. Operations are short
//! and never await while holding it.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{ServerConfig, ServerDriver};

/// Driver guarded by a single async mutex.
pub type SharedServer = Arc<Mutex<ServerDriver>>;

/// Create a shared driver over an empty model.
pub fn create_shared_server(config: ServerConfig) -> SharedServer {
    Arc::new(Mutex::new(ServerDriver::new(config)))
}
