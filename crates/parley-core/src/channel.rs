//! A single channel: owner, privacy flag and member set.
//!
//! The channel name is the key in the model's channel table and is not
//! stored here. Deleting a channel when its owner leaves is the model's job;
//! a `Channel` happily holds an empty or ownerless member set.

use std::collections::BTreeSet;

/// One channel's membership record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    owner: String,
    private: bool,
    members: BTreeSet<String>,
}

impl Channel {
    /// Create a channel whose first member is its owner.
    pub fn new(owner: impl Into<String>, private: bool) -> Self {
        let owner = owner.into();
        let members = BTreeSet::from([owner.clone()]);
        Self { owner, private, members }
    }

    /// Nickname of the owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Replace the owner reference. Used when the owner changes nickname.
    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.owner = owner.into();
    }

    /// Whether the channel is invite-only.
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Current members, in lexicographic order.
    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    /// Whether `nickname` is a member.
    pub fn is_member(&self, nickname: &str) -> bool {
        self.members.contains(nickname)
    }

    /// Whether `nickname` owns the channel.
    pub fn is_owner(&self, nickname: &str) -> bool {
        self.owner == nickname
    }

    /// Add a member. Returns `false` if already present.
    pub fn add_member(&mut self, nickname: impl Into<String>) -> bool {
        self.members.insert(nickname.into())
    }

    /// Remove a member. Returns `false` if it was not present.
    pub fn remove_member(&mut self, nickname: &str) -> bool {
        self.members.remove(nickname)
    }
}
