//! Server Model
//!
//! The central authority over users and channels.
//!
//! ## Responsibilities
//!
//! - Registration: bind connections to generated nicknames, cascade cleanup
//!   on disconnect
//! - Command handling: validate, mutate, and describe who to notify
//! - Introspection: detached snapshots of registry and channel state
//!
//! ## Validation order
//!
//! Each command runs its checks in a fixed order and the first failing check
//! decides the response. An unregistered invitee to a missing channel is
//! `NO_SUCH_USER`, never `NO_SUCH_CHANNEL`. State is only mutated once every
//! check has passed.
//!
//! ## Ownership
//!
//! Channels have no succession. When the owner leaves, is kicked (including
//! by themself) or disconnects, the channel is deleted.

use std::collections::{BTreeMap, BTreeSet};

use parley_proto::{
    Broadcast, Command, ConnectionId, Intent, Recipients, ServerResponse, is_valid_name,
    validate_name,
};

use crate::{Channel, InvariantViolation, Registry};

/// Successful outcome of a command handler, before it is paired with the
/// command into a [`Broadcast`].
enum Outcome {
    Okay(Recipients),
    Names { recipients: Recipients, owner: String },
}

/// Authoritative chat server state.
#[derive(Debug, Clone, Default)]
pub struct ServerModel {
    /// Channels keyed by name.
    channels: BTreeMap<String, Channel>,
    /// Connection id <-> nickname bindings.
    registry: Registry,
}

impl ServerModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection under a generated nickname.
    ///
    /// Registering an id that is already bound changes nothing; the
    /// broadcast carries the nickname it already holds.
    pub fn register_user(&mut self, conn_id: ConnectionId) -> Broadcast {
        if let Some(existing) = self.registry.lookup_nickname(conn_id) {
            tracing::warn!(conn_id, nickname = %existing, "register of bound connection");
            return Broadcast::connected(existing);
        }

        let nickname = self.registry.register(conn_id);
        tracing::debug!(conn_id, %nickname, "user registered");
        Broadcast::connected(nickname)
    }

    /// Remove a connection and everything that depended on it.
    ///
    /// The user leaves every channel it was in, and every channel it owned
    /// is deleted. Recipients are the members left behind in each affected
    /// channel, gathered before any deletion.
    ///
    /// Returns `None` if `conn_id` is not registered.
    pub fn deregister_user(&mut self, conn_id: ConnectionId) -> Option<Broadcast> {
        let Some(nickname) = self.registry.deregister(conn_id) else {
            tracing::warn!(conn_id, "deregister of unknown connection");
            return None;
        };

        let mut recipients = Recipients::new();
        self.channels.retain(|name, channel| {
            if !channel.remove_member(&nickname) {
                return true;
            }
            recipients.extend(channel.members().iter().cloned());

            let owned = channel.is_owner(&nickname);
            if owned {
                tracing::debug!(channel = %name, owner = %nickname, "channel closed by disconnect");
            }
            !owned
        });

        tracing::debug!(conn_id, %nickname, notified = recipients.len(), "user deregistered");
        Some(Broadcast::disconnected(nickname, recipients))
    }

    /// Apply one client command.
    ///
    /// Never fails: a rejected command yields [`Broadcast::Error`] and leaves
    /// the state unchanged.
    pub fn handle(&mut self, command: Command) -> Broadcast {
        let sender = command.sender.as_str();
        let result = match &command.intent {
            Intent::Nickname { new_nickname } => {
                self.change_nickname(command.sender_id, sender, new_nickname)
            },
            Intent::Create { channel, invite_only } => {
                self.create_channel(sender, channel, *invite_only)
            },
            Intent::Join { channel } => self.join_channel(sender, channel),
            Intent::Message { channel, .. } => self.send_message(sender, channel),
            Intent::Leave { channel } => self.leave_channel(sender, channel),
            Intent::Invite { channel, user_to_invite } => {
                self.invite_user(sender, channel, user_to_invite)
            },
            Intent::Kick { channel, user_to_kick } => self.kick_user(sender, channel, user_to_kick),
        };

        match result {
            Ok(Outcome::Okay(recipients)) => {
                tracing::debug!(
                    conn_id = command.sender_id,
                    sender = %command.sender,
                    command = command.name(),
                    notified = recipients.len(),
                    "command applied"
                );
                Broadcast::okay(command, recipients)
            },
            Ok(Outcome::Names { recipients, owner }) => {
                tracing::debug!(
                    conn_id = command.sender_id,
                    sender = %command.sender,
                    command = command.name(),
                    members = recipients.len(),
                    "membership changed"
                );
                Broadcast::names(command, recipients, owner)
            },
            Err(response) => {
                tracing::trace!(
                    conn_id = command.sender_id,
                    sender = %command.sender,
                    command = command.name(),
                    %response,
                    "command rejected"
                );
                Broadcast::error(command, response)
            },
        }
    }

    fn change_nickname(
        &mut self,
        conn_id: ConnectionId,
        old: &str,
        new: &str,
    ) -> Result<Outcome, ServerResponse> {
        if let Err(reason) = validate_name(new) {
            tracing::trace!(conn_id, nickname = new, %reason, "nickname rejected");
            return Err(ServerResponse::InvalidName);
        }
        if self.registry.contains_nickname(new) {
            return Err(ServerResponse::NameAlreadyInUse);
        }

        // Channels are rewritten under the registry's name for the sender.
        let old = match self.registry.lookup_nickname(conn_id) {
            Some(current) if current == old => current.to_owned(),
            Some(current) => {
                tracing::warn!(conn_id, stamped = old, current, "stale sender nickname");
                current.to_owned()
            },
            None => {
                tracing::warn!(conn_id, nickname = old, "rename from unregistered connection");
                return Err(ServerResponse::NoSuchUser);
            },
        };
        let old = old.as_str();

        let mut recipients = Recipients::new();
        for channel in self.channels.values_mut() {
            if !channel.remove_member(old) {
                continue;
            }
            channel.add_member(new);
            if channel.is_owner(old) {
                channel.set_owner(new);
            }
            recipients.extend(channel.members().iter().cloned());
        }

        self.registry.rename(conn_id, old, new);
        recipients.insert(new.to_owned());

        Ok(Outcome::Okay(recipients))
    }

    fn create_channel(
        &mut self,
        sender: &str,
        name: &str,
        invite_only: bool,
    ) -> Result<Outcome, ServerResponse> {
        if !is_valid_name(name) {
            return Err(ServerResponse::InvalidName);
        }
        if self.channels.contains_key(name) {
            return Err(ServerResponse::ChannelAlreadyExists);
        }

        self.channels.insert(name.to_owned(), Channel::new(sender, invite_only));
        tracing::debug!(channel = name, owner = sender, private = invite_only, "channel created");

        Ok(Outcome::Okay(Recipients::from([sender.to_owned()])))
    }

    fn join_channel(&mut self, sender: &str, name: &str) -> Result<Outcome, ServerResponse> {
        let channel = self.channels.get_mut(name).ok_or(ServerResponse::NoSuchChannel)?;
        if channel.is_private() {
            return Err(ServerResponse::JoinPrivateChannel);
        }

        channel.add_member(sender);

        Ok(Outcome::Names {
            recipients: channel.members().clone(),
            owner: channel.owner().to_owned(),
        })
    }

    fn send_message(&self, sender: &str, name: &str) -> Result<Outcome, ServerResponse> {
        let channel = self.channels.get(name).ok_or(ServerResponse::NoSuchChannel)?;
        if !channel.is_member(sender) {
            return Err(ServerResponse::UserNotInChannel);
        }

        Ok(Outcome::Okay(channel.members().clone()))
    }

    fn leave_channel(&mut self, sender: &str, name: &str) -> Result<Outcome, ServerResponse> {
        let channel = self.channels.get_mut(name).ok_or(ServerResponse::NoSuchChannel)?;
        if !channel.is_member(sender) {
            return Err(ServerResponse::UserNotInChannel);
        }

        let recipients = channel.members().clone();
        if channel.is_owner(sender) {
            self.channels.remove(name);
            tracing::debug!(channel = name, owner = sender, "channel closed by owner leaving");
        } else {
            channel.remove_member(sender);
        }

        Ok(Outcome::Okay(recipients))
    }

    fn invite_user(
        &mut self,
        sender: &str,
        name: &str,
        invitee: &str,
    ) -> Result<Outcome, ServerResponse> {
        if !self.registry.contains_nickname(invitee) {
            return Err(ServerResponse::NoSuchUser);
        }
        let channel = self.channels.get_mut(name).ok_or(ServerResponse::NoSuchChannel)?;
        if !channel.is_private() {
            return Err(ServerResponse::InviteToPublicChannel);
        }
        if !channel.is_owner(sender) {
            return Err(ServerResponse::UserNotOwner);
        }

        channel.add_member(invitee);

        Ok(Outcome::Names { recipients: channel.members().clone(), owner: sender.to_owned() })
    }

    fn kick_user(
        &mut self,
        sender: &str,
        name: &str,
        target: &str,
    ) -> Result<Outcome, ServerResponse> {
        if !self.registry.contains_nickname(target) {
            return Err(ServerResponse::NoSuchUser);
        }
        let channel = self.channels.get_mut(name).ok_or(ServerResponse::NoSuchChannel)?;
        if !channel.is_member(target) {
            return Err(ServerResponse::UserNotInChannel);
        }
        if !channel.is_owner(sender) {
            return Err(ServerResponse::UserNotOwner);
        }

        let recipients = channel.members().clone();
        if channel.is_owner(target) {
            self.channels.remove(name);
            tracing::debug!(channel = name, owner = sender, "channel closed by self-kick");
        } else {
            channel.remove_member(target);
        }

        Ok(Outcome::Okay(recipients))
    }
}

// Introspection. Every collection returned here is a snapshot.
impl ServerModel {
    /// Connection bound to `nickname`.
    pub fn user_id(&self, nickname: &str) -> Option<ConnectionId> {
        self.registry.lookup_id(nickname)
    }

    /// Nickname bound to `conn_id`.
    pub fn nickname(&self, conn_id: ConnectionId) -> Option<&str> {
        self.registry.lookup_nickname(conn_id)
    }

    /// Every registered nickname.
    pub fn registered_users(&self) -> BTreeSet<String> {
        self.registry.all_nicknames()
    }

    /// Every channel name.
    pub fn channels(&self) -> BTreeSet<String> {
        self.channels.keys().cloned().collect()
    }

    /// Members of `name`; empty if the channel does not exist.
    pub fn users_in_channel(&self, name: &str) -> BTreeSet<String> {
        self.channels.get(name).map(|c| c.members().clone()).unwrap_or_default()
    }

    /// Owner of `name`.
    pub fn owner(&self, name: &str) -> Option<&str> {
        self.channels.get(name).map(Channel::owner)
    }

    /// Privacy flag of `name`.
    pub fn is_private(&self, name: &str) -> Option<bool> {
        self.channels.get(name).map(Channel::is_private)
    }

    /// Read access to a channel record.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Read access to the registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of registered connections.
    pub fn user_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of live channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Verify every structural invariant of the current state.
    ///
    /// Holds after any sequence of operations, provided command senders are
    /// the nicknames actually bound to their connections.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !self.registry.is_consistent() {
            return Err(InvariantViolation::RegistryMismatch);
        }
        for (conn_id, nickname) in self.registry.iter() {
            if !is_valid_name(nickname) {
                return Err(InvariantViolation::InvalidNickname {
                    conn_id,
                    nickname: nickname.to_owned(),
                });
            }
        }

        for (name, channel) in &self.channels {
            if !is_valid_name(name) {
                return Err(InvariantViolation::InvalidChannelName { channel: name.clone() });
            }
            if !channel.is_member(channel.owner()) {
                return Err(InvariantViolation::OwnerNotMember {
                    channel: name.clone(),
                    owner: channel.owner().to_owned(),
                });
            }
            let stray = channel.members().iter().find(|m| !self.registry.contains_nickname(m));
            if let Some(stray) = stray {
                return Err(InvariantViolation::UnregisteredMember {
                    channel: name.clone(),
                    nickname: stray.clone(),
                });
            }
        }

        Ok(())
    }
}
