//! Parley core state machine.
//!
//! Tracks connected users, channel membership, ownership and privacy, and
//! turns each [`Command`] into a state mutation plus a [`Broadcast`]
//! describing who must be told.
//!
//! ## Architecture
//!
//! ```text
//! ServerModel
//!   ├─ Registry             (connection id <-> nickname)
//!   └─ BTreeMap<String, Channel>
//! ```
//!
//! The model never performs I/O. Operations are synchronous and total:
//! rejected commands come back as [`Broadcast::Error`] and leave the state
//! untouched. Callers sharing a model across tasks must serialize access
//! behind a single lock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod channel;
mod error;
mod model;
mod registry;

pub use channel::Channel;
pub use error::InvariantViolation;
pub use model::ServerModel;
pub use parley_proto::{
    Broadcast, Command, ConnectionId, Intent, Recipients, ServerResponse, is_valid_name,
};
pub use registry::{NICKNAME_PREFIX, Registry};
