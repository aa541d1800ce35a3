//! Parley protocol values.
//!
//! Everything that crosses the boundary between the chat state machine and
//! the transport that hosts it:
//!
//! - [`Command`]: one decoded client intent plus the sender's identity
//! - [`Broadcast`]: the notification instruction the state machine returns
//! - [`ServerResponse`]: the fixed error taxonomy
//! - [`validate_name`]: the shared nickname/channel-name rule
//!
//! Wire encoding is left to the transport. All values derive `serde` traits
//! so any format can be plugged in.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod broadcast;
mod command;
mod name;
mod response;

pub use broadcast::{Broadcast, Recipients};
pub use command::{Command, Intent};
pub use name::{NameError, is_valid_name, validate_name};
pub use response::{ResponseCodeError, ServerResponse};

/// Opaque connection identifier assigned by the transport.
///
/// Unique for the lifetime of the connection and never reused while bound.
pub type ConnectionId = u64;
