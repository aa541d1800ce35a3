//! Client commands.
//!
//! A [`Command`] is what the transport hands to the state machine after
//! decoding one client message. The sender identity is trusted: the transport
//! guarantees `sender` is the nickname currently bound to `sender_id`.

use serde::{Deserialize, Serialize};

use crate::ConnectionId;

/// What the client wants to happen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Change the sender's nickname.
    Nickname {
        /// Proposed nickname.
        new_nickname: String,
    },

    /// Create a channel owned by the sender.
    Create {
        /// Proposed channel name.
        channel: String,
        /// Whether the channel is invite-only.
        invite_only: bool,
    },

    /// Join a public channel.
    Join {
        /// Channel to join.
        channel: String,
    },

    /// Send a message to every member of a channel.
    Message {
        /// Target channel.
        channel: String,
        /// Message body, opaque to the server.
        message: String,
    },

    /// Leave a channel.
    Leave {
        /// Channel to leave.
        channel: String,
    },

    /// Add a user to a private channel (owner only).
    Invite {
        /// Target channel.
        channel: String,
        /// Nickname of the user to add.
        user_to_invite: String,
    },

    /// Remove a user from a channel (owner only).
    Kick {
        /// Target channel.
        channel: String,
        /// Nickname of the user to remove.
        user_to_kick: String,
    },
}

/// A client intent stamped with the sender's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Connection the command arrived on.
    pub sender_id: ConnectionId,
    /// Nickname bound to `sender_id` when the command was decoded.
    pub sender: String,
    /// The requested state transition.
    pub intent: Intent,
}

impl Command {
    /// Wrap an intent with a sender identity.
    pub fn new(sender_id: ConnectionId, sender: impl Into<String>, intent: Intent) -> Self {
        Self { sender_id, sender: sender.into(), intent }
    }

    /// Nickname change.
    pub fn nickname(
        sender_id: ConnectionId,
        sender: impl Into<String>,
        new_nickname: impl Into<String>,
    ) -> Self {
        Self::new(sender_id, sender, Intent::Nickname { new_nickname: new_nickname.into() })
    }

    /// Channel creation.
    pub fn create(
        sender_id: ConnectionId,
        sender: impl Into<String>,
        channel: impl Into<String>,
        invite_only: bool,
    ) -> Self {
        Self::new(sender_id, sender, Intent::Create { channel: channel.into(), invite_only })
    }

    /// Channel join.
    pub fn join(
        sender_id: ConnectionId,
        sender: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self::new(sender_id, sender, Intent::Join { channel: channel.into() })
    }

    /// Channel message.
    pub fn message(
        sender_id: ConnectionId,
        sender: impl Into<String>,
        channel: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            sender_id,
            sender,
            Intent::Message { channel: channel.into(), message: message.into() },
        )
    }

    /// Channel leave.
    pub fn leave(
        sender_id: ConnectionId,
        sender: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self::new(sender_id, sender, Intent::Leave { channel: channel.into() })
    }

    /// Invite into a private channel.
    pub fn invite(
        sender_id: ConnectionId,
        sender: impl Into<String>,
        channel: impl Into<String>,
        user_to_invite: impl Into<String>,
    ) -> Self {
        Self::new(
            sender_id,
            sender,
            Intent::Invite { channel: channel.into(), user_to_invite: user_to_invite.into() },
        )
    }

    /// Kick from a channel.
    pub fn kick(
        sender_id: ConnectionId,
        sender: impl Into<String>,
        channel: impl Into<String>,
        user_to_kick: impl Into<String>,
    ) -> Self {
        Self::new(
            sender_id,
            sender,
            Intent::Kick { channel: channel.into(), user_to_kick: user_to_kick.into() },
        )
    }

    /// Channel this command targets, if any.
    pub fn channel(&self) -> Option<&str> {
        match &self.intent {
            Intent::Nickname { .. } => None,
            Intent::Create { channel, .. }
            | Intent::Join { channel }
            | Intent::Message { channel, .. }
            | Intent::Leave { channel }
            | Intent::Invite { channel, .. }
            | Intent::Kick { channel, .. } => Some(channel),
        }
    }

    /// Short tag naming the intent, for logs.
    pub fn name(&self) -> &'static str {
        match self.intent {
            Intent::Nickname { .. } => "nick",
            Intent::Create { .. } => "create",
            Intent::Join { .. } => "join",
            Intent::Message { .. } => "message",
            Intent::Leave { .. } => "leave",
            Intent::Invite { .. } => "invite",
            Intent::Kick { .. } => "kick",
        }
    }
}
