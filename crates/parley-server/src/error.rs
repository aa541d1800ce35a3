//! Driver error types.

use parley_proto::ConnectionId;
use thiserror::Error;

/// Events the driver cannot act on.
///
/// These indicate a transport bookkeeping bug, not a client mistake; client
/// mistakes come back as [`Broadcast::Error`](parley_proto::Broadcast::Error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Event refers to a connection that is not registered.
    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    /// Connection id is already bound to a live session.
    #[error("connection already registered: {0}")]
    DuplicateConnection(ConnectionId),
}
