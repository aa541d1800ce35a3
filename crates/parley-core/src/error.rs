//! Structural invariant violations.
//!
//! Command rejections are not errors in this crate; they are returned as
//! [`Broadcast::Error`](parley_proto::Broadcast::Error). The type here only
//! reports state that should be unreachable, for harnesses and fuzzers.

use parley_proto::ConnectionId;
use thiserror::Error;

/// A broken state-machine invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Forward and reverse registry indices disagree.
    #[error("registry indices disagree")]
    RegistryMismatch,

    /// A registered nickname fails name validation.
    #[error("connection {conn_id} holds invalid nickname {nickname:?}")]
    InvalidNickname {
        /// Connection holding the nickname.
        conn_id: ConnectionId,
        /// The invalid nickname.
        nickname: String,
    },

    /// A channel key fails name validation.
    #[error("invalid channel name {channel:?}")]
    InvalidChannelName {
        /// The invalid channel name.
        channel: String,
    },

    /// A channel's owner is missing from its member set.
    #[error("owner {owner} of channel {channel} is not a member")]
    OwnerNotMember {
        /// Channel name.
        channel: String,
        /// Owner nickname.
        owner: String,
    },

    /// A channel member is not a registered user.
    #[error("member {nickname} of channel {channel} is not registered")]
    UnregisteredMember {
        /// Channel name.
        channel: String,
        /// Member nickname.
        nickname: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = InvariantViolation::OwnerNotMember {
            channel: "lobby".to_string(),
            owner: "User0".to_string(),
        };
        assert_eq!(err.to_string(), "owner User0 of channel lobby is not a member");
    }
}
