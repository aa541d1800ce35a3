//! Notification instructions.
//!
//! Every state transition produces exactly one [`Broadcast`]. It names the
//! outcome and the nicknames that must hear about it; turning nicknames into
//! sockets and framing the payload is the transport's job.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Command, ServerResponse};

/// Nicknames to notify, in lexicographic order.
pub type Recipients = BTreeSet<String>;

/// Outcome of one state-machine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Broadcast {
    /// A new connection was registered under `nickname`.
    Connected {
        /// Generated nickname.
        nickname: String,
    },

    /// A connection went away.
    Disconnected {
        /// Nickname the connection held.
        nickname: String,
        /// Everyone who shared a channel with it.
        recipients: Recipients,
    },

    /// Membership changed; carries the authoritative member list.
    Names {
        /// Command that caused the change.
        command: Command,
        /// Channel members after the change.
        recipients: Recipients,
        /// Channel owner.
        owner: String,
    },

    /// Command succeeded.
    Okay {
        /// Command that succeeded.
        command: Command,
        /// Who must be told.
        recipients: Recipients,
    },

    /// Command was rejected; only the sender is told.
    Error {
        /// Command that failed.
        command: Command,
        /// Why it failed.
        response: ServerResponse,
    },
}

impl Broadcast {
    /// Registration succeeded.
    pub fn connected(nickname: impl Into<String>) -> Self {
        Self::Connected { nickname: nickname.into() }
    }

    /// Connection went away.
    pub fn disconnected(nickname: impl Into<String>, recipients: Recipients) -> Self {
        Self::Disconnected { nickname: nickname.into(), recipients }
    }

    /// Membership changed.
    pub fn names(command: Command, recipients: Recipients, owner: impl Into<String>) -> Self {
        Self::Names { command, recipients, owner: owner.into() }
    }

    /// Command succeeded.
    pub fn okay(command: Command, recipients: Recipients) -> Self {
        Self::Okay { command, recipients }
    }

    /// Command failed.
    pub fn error(command: Command, response: ServerResponse) -> Self {
        Self::Error { command, response }
    }

    /// Nicknames the transport must deliver this broadcast to.
    pub fn recipients(&self) -> BTreeSet<&str> {
        match self {
            Self::Connected { nickname } => BTreeSet::from([nickname.as_str()]),
            Self::Disconnected { recipients, .. }
            | Self::Names { recipients, .. }
            | Self::Okay { recipients, .. } => recipients.iter().map(String::as_str).collect(),
            Self::Error { command, .. } => BTreeSet::from([command.sender.as_str()]),
        }
    }

    /// Originating command, if the broadcast answers one.
    pub fn command(&self) -> Option<&Command> {
        match self {
            Self::Connected { .. } | Self::Disconnected { .. } => None,
            Self::Names { command, .. } | Self::Okay { command, .. } | Self::Error { command, .. } => {
                Some(command)
            },
        }
    }

    /// Rejection reason, if the command failed.
    pub fn response(&self) -> Option<ServerResponse> {
        match self {
            Self::Error { response, .. } => Some(*response),
            _ => None,
        }
    }

    /// Whether the command was rejected.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// One-line summary, e.g. `okay join by User1 -> [User0, User1]`.
impl fmt::Display for Broadcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected { nickname } => write!(f, "connected {nickname}"),
            Self::Disconnected { nickname, recipients } => {
                write!(f, "disconnected {nickname} -> ")?;
                write_set(f, recipients)
            },
            Self::Names { command, recipients, owner } => {
                write!(f, "names {} by {} -> ", command.name(), command.sender)?;
                write_set(f, recipients)?;
                write!(f, " owner {owner}")
            },
            Self::Okay { command, recipients } => {
                write!(f, "okay {} by {} -> ", command.name(), command.sender)?;
                write_set(f, recipients)
            },
            Self::Error { command, response } => {
                write!(f, "error {} by {}: {response}", command.name(), command.sender)
            },
        }
    }
}

fn write_set(f: &mut fmt::Formatter<'_>, set: &Recipients) -> fmt::Result {
    f.write_str("[")?;
    for (i, nick) in set.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(nick)?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> Recipients {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn error_goes_to_sender_only() {
        let cmd = Command::join(1, "User1", "vip");
        let broadcast = Broadcast::error(cmd, ServerResponse::JoinPrivateChannel);

        assert!(broadcast.is_error());
        assert_eq!(broadcast.response(), Some(ServerResponse::JoinPrivateChannel));
        assert_eq!(broadcast.recipients(), BTreeSet::from(["User1"]));
    }

    #[test]
    fn connected_goes_to_new_user() {
        let broadcast = Broadcast::connected("User0");
        assert_eq!(broadcast.recipients(), BTreeSet::from(["User0"]));
        assert_eq!(broadcast.command(), None);
    }

    #[test]
    fn recipient_sets_ignore_insertion_order() {
        let cmd = Command::message(0, "User0", "c", "hi");
        let a = Broadcast::okay(cmd.clone(), set(&["User1", "User0"]));
        let b = Broadcast::okay(cmd, set(&["User0", "User1"]));
        assert_eq!(a, b);
    }

    #[test]
    fn display_summaries() {
        let names = Broadcast::names(
            Command::join(1, "User1", "lobby"),
            set(&["User1", "User0"]),
            "User0",
        );
        assert_eq!(names.to_string(), "names join by User1 -> [User0, User1] owner User0");

        let gone = Broadcast::disconnected("User2", set(&[]));
        assert_eq!(gone.to_string(), "disconnected User2 -> []");

        let err = Broadcast::error(Command::nickname(0, "User0", "a b"), ServerResponse::InvalidName);
        assert_eq!(err.to_string(), "error nick by User0: INVALID_NAME");
    }
}
