//! Server response taxonomy.
//!
//! The set of codes is fixed. Transports may map them onto their own wire
//! representation, but the numeric values below are the canonical ones and
//! must not be renumbered.

use std::fmt;

use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

/// Reason a command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum ServerResponse {
    /// Proposed nickname or channel name is empty or not alphanumeric.
    InvalidName = 401,
    /// Another connection already holds the proposed nickname.
    NameAlreadyInUse = 402,
    /// No channel with the given name exists.
    NoSuchChannel = 403,
    /// No registered user holds the given nickname.
    NoSuchUser = 404,
    /// A channel with the proposed name already exists.
    ChannelAlreadyExists = 405,
    /// The user is not a member of the channel.
    UserNotInChannel = 406,
    /// Only the channel owner may do this.
    UserNotOwner = 407,
    /// Private channels cannot be joined without an invite.
    JoinPrivateChannel = 408,
    /// Public channels do not accept invites.
    InviteToPublicChannel = 409,
}

/// A numeric code that does not name any [`ServerResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown response code {0}")]
pub struct ResponseCodeError(pub u16);

impl ServerResponse {
    /// Every response, in code order.
    pub const ALL: [Self; 9] = [
        Self::InvalidName,
        Self::NameAlreadyInUse,
        Self::NoSuchChannel,
        Self::NoSuchUser,
        Self::ChannelAlreadyExists,
        Self::UserNotInChannel,
        Self::UserNotOwner,
        Self::JoinPrivateChannel,
        Self::InviteToPublicChannel,
    ];

    /// Numeric wire code.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Stable symbolic name, e.g. `NO_SUCH_CHANNEL`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidName => "INVALID_NAME",
            Self::NameAlreadyInUse => "NAME_ALREADY_IN_USE",
            Self::NoSuchChannel => "NO_SUCH_CHANNEL",
            Self::NoSuchUser => "NO_SUCH_USER",
            Self::ChannelAlreadyExists => "CHANNEL_ALREADY_EXISTS",
            Self::UserNotInChannel => "USER_NOT_IN_CHANNEL",
            Self::UserNotOwner => "USER_NOT_OWNER",
            Self::JoinPrivateChannel => "JOIN_PRIVATE_CHANNEL",
            Self::InviteToPublicChannel => "INVITE_TO_PUBLIC_CHANNEL",
        }
    }
}

impl fmt::Display for ServerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u16> for ServerResponse {
    type Error = ResponseCodeError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::ALL.into_iter().find(|r| r.code() == code).ok_or(ResponseCodeError(code))
    }
}
