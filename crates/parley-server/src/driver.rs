//! Server driver.
//!
//! Action-based wrapper around [`ServerModel`]. The transport feeds
//! [`ServerEvent`]s in and executes the [`ServerAction`]s that come back.

use parley_core::ServerModel;
use parley_proto::{Broadcast, Command, ConnectionId, Intent};

use crate::DriverError;

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of simultaneously registered connections.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { max_connections: 10_000 }
    }
}

/// Something the transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A client connected and was assigned `conn_id`.
    ConnectionAccepted {
        /// Transport-assigned connection id.
        conn_id: ConnectionId,
    },

    /// A client went away.
    ConnectionClosed {
        /// Connection that closed.
        conn_id: ConnectionId,
    },

    /// A client sent a decoded command.
    CommandReceived {
        /// Connection the command arrived on.
        conn_id: ConnectionId,
        /// The decoded intent.
        intent: Intent,
    },
}

/// Something the transport must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAction {
    /// Deliver `broadcast` to each listed connection.
    SendToConnections {
        /// Recipients, ascending.
        conn_ids: Vec<ConnectionId>,
        /// Notification to frame and send.
        broadcast: Broadcast,
    },

    /// Close a connection without registering it.
    CloseConnection {
        /// Connection to close.
        conn_id: ConnectionId,
        /// Human-readable reason.
        reason: String,
    },
}

/// Sans-IO orchestrator over a single [`ServerModel`].
#[derive(Debug, Default)]
pub struct ServerDriver {
    model: ServerModel,
    config: ServerConfig,
}

impl ServerDriver {
    /// Create a driver over an empty model.
    pub fn new(config: ServerConfig) -> Self {
        Self { model: ServerModel::new(), config }
    }

    /// Read access to the model.
    pub fn model(&self) -> &ServerModel {
        &self.model
    }

    /// Driver configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.model.user_count()
    }

    /// Process one event and return the actions to execute.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::DuplicateConnection` if an accepted id is
    /// already registered, and `DriverError::UnknownConnection` for closes
    /// or commands on an id that is not.
    pub fn process_event(&mut self, event: ServerEvent) -> Result<Vec<ServerAction>, DriverError> {
        match event {
            ServerEvent::ConnectionAccepted { conn_id } => self.handle_accept(conn_id),
            ServerEvent::ConnectionClosed { conn_id } => self.handle_close(conn_id),
            ServerEvent::CommandReceived { conn_id, intent } => self.handle_command(conn_id, intent),
        }
    }

    fn handle_accept(&mut self, conn_id: ConnectionId) -> Result<Vec<ServerAction>, DriverError> {
        if self.model.nickname(conn_id).is_some() {
            return Err(DriverError::DuplicateConnection(conn_id));
        }

        if self.model.user_count() >= self.config.max_connections {
            tracing::warn!(conn_id, max = self.config.max_connections, "connection limit reached");
            return Ok(vec![ServerAction::CloseConnection {
                conn_id,
                reason: "server full".to_string(),
            }]);
        }

        let broadcast = self.model.register_user(conn_id);
        Ok(self.deliver(broadcast))
    }

    fn handle_close(&mut self, conn_id: ConnectionId) -> Result<Vec<ServerAction>, DriverError> {
        let broadcast =
            self.model.deregister_user(conn_id).ok_or(DriverError::UnknownConnection(conn_id))?;
        Ok(self.deliver(broadcast))
    }

    fn handle_command(
        &mut self,
        conn_id: ConnectionId,
        intent: Intent,
    ) -> Result<Vec<ServerAction>, DriverError> {
        // The registry is authoritative for who the sender is right now.
        let sender = self
            .model
            .nickname(conn_id)
            .ok_or(DriverError::UnknownConnection(conn_id))?
            .to_owned();

        let broadcast = self.model.handle(Command::new(conn_id, sender, intent));
        Ok(self.deliver(broadcast))
    }

    /// Resolve recipient nicknames against the post-transition registry.
    fn deliver(&self, broadcast: Broadcast) -> Vec<ServerAction> {
        let mut conn_ids = Vec::new();
        for nickname in broadcast.recipients() {
            match self.model.user_id(nickname) {
                Some(id) => conn_ids.push(id),
                None => tracing::warn!(%nickname, "recipient has no connection"),
            }
        }

        if conn_ids.is_empty() {
            return Vec::new();
        }
        conn_ids.sort_unstable();

        vec![ServerAction::SendToConnections { conn_ids, broadcast }]
    }
}
