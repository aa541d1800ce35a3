//! Operations for model-based testing.
//!
//! Operations represent every client intent plus connect/disconnect. They
//! are generated randomly by proptest (or libFuzzer) and applied to both the
//! model and the real implementation.
//!
//! Names are drawn from small fixed pools so that collisions, invalid names
//! and references to absent users or channels come up often.

use arbitrary::Arbitrary;
use parley_proto::{Broadcast, Command, ConnectionId, ServerResponse};

/// Client slot; doubles as the connection id.
pub type ClientId = u8;

/// Nickname pool. Includes generated-style names so renames collide with
/// future registrations, plus two invalid names.
pub const NICKNAMES: [&str; 8] =
    ["User0", "User1", "User2", "User3", "alice", "bob", "bad nick", ""];

/// Channel name pool, including two invalid names.
pub const CHANNEL_NAMES: [&str; 5] = ["lobby", "vip", "c", "bad!", ""];

fn nickname(index: u8) -> &'static str {
    NICKNAMES[index as usize % NICKNAMES.len()]
}

fn channel(index: u8) -> &'static str {
    CHANNEL_NAMES[index as usize % CHANNEL_NAMES.len()]
}

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Client connects (no-op if already connected).
    Connect {
        /// Connecting client.
        client_id: ClientId,
    },

    /// Client disconnects (no-op if not connected).
    Disconnect {
        /// Departing client.
        client_id: ClientId,
    },

    /// Client changes nickname.
    Rename {
        /// Client renaming.
        client_id: ClientId,
        /// Index into [`NICKNAMES`].
        nickname: u8,
    },

    /// Client creates a channel.
    Create {
        /// Client creating.
        client_id: ClientId,
        /// Index into [`CHANNEL_NAMES`].
        channel: u8,
        /// Invite-only flag.
        invite_only: bool,
    },

    /// Client joins a channel.
    Join {
        /// Client joining.
        client_id: ClientId,
        /// Index into [`CHANNEL_NAMES`].
        channel: u8,
    },

    /// Client messages a channel.
    Message {
        /// Client sending.
        client_id: ClientId,
        /// Index into [`CHANNEL_NAMES`].
        channel: u8,
    },

    /// Client leaves a channel.
    Leave {
        /// Client leaving.
        client_id: ClientId,
        /// Index into [`CHANNEL_NAMES`].
        channel: u8,
    },

    /// Client invites someone into a channel.
    Invite {
        /// Client inviting.
        client_id: ClientId,
        /// Index into [`CHANNEL_NAMES`].
        channel: u8,
        /// Index into [`NICKNAMES`].
        target: u8,
    },

    /// Client kicks someone from a channel.
    Kick {
        /// Client kicking.
        client_id: ClientId,
        /// Index into [`CHANNEL_NAMES`].
        channel: u8,
        /// Index into [`NICKNAMES`].
        target: u8,
    },
}

impl Operation {
    /// Client performing the operation.
    pub fn client_id(&self) -> ClientId {
        match self {
            Self::Connect { client_id }
            | Self::Disconnect { client_id }
            | Self::Rename { client_id, .. }
            | Self::Create { client_id, .. }
            | Self::Join { client_id, .. }
            | Self::Message { client_id, .. }
            | Self::Leave { client_id, .. }
            | Self::Invite { client_id, .. }
            | Self::Kick { client_id, .. } => *client_id,
        }
    }

    /// Connection id of the acting client.
    pub fn conn_id(&self) -> ConnectionId {
        ConnectionId::from(self.client_id())
    }

    /// Same operation for a client id reduced modulo `num_clients`.
    #[must_use]
    pub fn clamped(mut self, num_clients: usize) -> Self {
        let limit = u8::try_from(num_clients).unwrap_or(u8::MAX).max(1);
        match &mut self {
            Self::Connect { client_id }
            | Self::Disconnect { client_id }
            | Self::Rename { client_id, .. }
            | Self::Create { client_id, .. }
            | Self::Join { client_id, .. }
            | Self::Message { client_id, .. }
            | Self::Leave { client_id, .. }
            | Self::Invite { client_id, .. }
            | Self::Kick { client_id, .. } => *client_id %= limit,
        }
        self
    }

    /// Build the command this operation sends on behalf of `sender`.
    ///
    /// `None` for connect and disconnect, which are not commands.
    pub fn to_command(&self, sender: &str) -> Option<Command> {
        let id = self.conn_id();
        let command = match *self {
            Self::Connect { .. } | Self::Disconnect { .. } => return None,
            Self::Rename { nickname: n, .. } => Command::nickname(id, sender, nickname(n)),
            Self::Create { channel: c, invite_only, .. } => {
                Command::create(id, sender, channel(c), invite_only)
            },
            Self::Join { channel: c, .. } => Command::join(id, sender, channel(c)),
            Self::Message { channel: c, .. } => Command::message(id, sender, channel(c), "hi"),
            Self::Leave { channel: c, .. } => Command::leave(id, sender, channel(c)),
            Self::Invite { channel: c, target, .. } => {
                Command::invite(id, sender, channel(c), nickname(target))
            },
            Self::Kick { channel: c, target, .. } => {
                Command::kick(id, sender, channel(c), nickname(target))
            },
        };
        Some(command)
    }
}

/// Result of applying an operation, comparable across implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Succeeded; these nicknames are notified, ascending.
    Ok {
        /// Recipients, sorted.
        recipients: Vec<String>,
    },

    /// Rejected with a taxonomy code.
    Error(ServerResponse),

    /// Not applicable (connect while connected, command while disconnected).
    Skipped,
}

impl OperationResult {
    /// Success with the given recipients.
    pub fn ok<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut recipients: Vec<String> = recipients.into_iter().map(Into::into).collect();
        recipients.sort();
        recipients.dedup();
        Self::Ok { recipients }
    }

    /// Summarize a real broadcast.
    pub fn from_broadcast(broadcast: &Broadcast) -> Self {
        match broadcast.response() {
            Some(response) => Self::Error(response),
            None => Self::ok(broadcast.recipients()),
        }
    }

    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Check if operation was rejected.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_wrap_around() {
        assert_eq!(nickname(0), "User0");
        assert_eq!(nickname(8), "User0");
        assert_eq!(channel(5), "lobby");
    }

    #[test]
    fn clamped_reduces_client_id() {
        let op = Operation::Join { client_id: 7, channel: 0 }.clamped(3);
        assert_eq!(op.client_id(), 1);
    }

    #[test]
    fn connect_is_not_a_command() {
        assert!(Operation::Connect { client_id: 0 }.to_command("User0").is_none());
        assert!(Operation::Disconnect { client_id: 0 }.to_command("User0").is_none());
    }

    #[test]
    fn kick_maps_pools() {
        let op = Operation::Kick { client_id: 2, channel: 1, target: 4 };
        assert_eq!(op.to_command("User2"), Some(Command::kick(2, "User2", "vip", "alice")));
    }

    #[test]
    fn ok_sorts_and_dedups() {
        assert_eq!(OperationResult::ok(["b", "a", "b"]), OperationResult::Ok {
            recipients: vec!["a".to_string(), "b".to_string()]
        });
    }
}
