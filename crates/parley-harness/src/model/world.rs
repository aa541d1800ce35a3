//! Model world - the reference chat server.
//!
//! Users and channels live in plain vectors and every lookup is a linear
//! scan. The world is the oracle against which `ServerModel` is verified.

use parley_proto::{Command, ConnectionId, Intent, ServerResponse};

use super::operation::{Operation, OperationResult};

/// Channel as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChannel {
    /// Channel name.
    pub name: String,
    /// Owner nickname.
    pub owner: String,
    /// Invite-only flag.
    pub private: bool,
    /// Members, sorted.
    pub members: Vec<String>,
}

impl ModelChannel {
    fn has(&self, nickname: &str) -> bool {
        self.members.iter().any(|m| m == nickname)
    }

    fn add(&mut self, nickname: &str) {
        if !self.has(nickname) {
            self.members.push(nickname.to_string());
            self.members.sort();
        }
    }

    fn remove(&mut self, nickname: &str) {
        self.members.retain(|m| m != nickname);
    }
}

/// Observable state for oracle comparison.
///
/// This is the subset of world state that can be compared against the real
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// (connection id, nickname), ascending by id.
    pub users: Vec<(ConnectionId, String)>,
    /// Channels, ascending by name.
    pub channels: Vec<ModelChannel>,
}

/// Model world - the reference implementation.
#[derive(Debug, Clone, Default)]
pub struct ModelWorld {
    users: Vec<(ConnectionId, String)>,
    channels: Vec<ModelChannel>,
}

fn valid(name: &str) -> bool {
    !name.is_empty() && name.chars().all(char::is_alphanumeric)
}

impl ModelWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nickname of a connected client.
    pub fn nickname(&self, conn_id: ConnectionId) -> Option<&str> {
        self.users.iter().find(|(id, _)| *id == conn_id).map(|(_, n)| n.as_str())
    }

    fn registered(&self, nickname: &str) -> bool {
        self.users.iter().any(|(_, n)| n == nickname)
    }

    fn channel_mut(&mut self, name: &str) -> Option<&mut ModelChannel> {
        self.channels.iter_mut().find(|c| c.name == name)
    }

    fn delete_channel(&mut self, name: &str) {
        self.channels.retain(|c| c.name != name);
    }

    /// Apply an operation and return the result.
    ///
    /// This is the main entry point for model-based testing. The result
    /// should match the real implementation's result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let conn_id = op.conn_id();
        match op {
            Operation::Connect { .. } => self.apply_connect(conn_id),
            Operation::Disconnect { .. } => self.apply_disconnect(conn_id),
            _ => {
                let Some(sender) = self.nickname(conn_id) else {
                    return OperationResult::Skipped;
                };
                match op.to_command(sender) {
                    Some(command) => self.apply_command(&command),
                    None => OperationResult::Skipped,
                }
            },
        }
    }

    fn apply_connect(&mut self, conn_id: ConnectionId) -> OperationResult {
        if self.nickname(conn_id).is_some() {
            return OperationResult::Skipped;
        }

        let mut n = 0;
        while self.registered(&format!("User{n}")) {
            n += 1;
        }
        let nickname = format!("User{n}");
        self.users.push((conn_id, nickname.clone()));
        self.users.sort();

        OperationResult::ok([nickname])
    }

    fn apply_disconnect(&mut self, conn_id: ConnectionId) -> OperationResult {
        let Some(nickname) = self.nickname(conn_id).map(str::to_string) else {
            return OperationResult::Skipped;
        };
        self.users.retain(|(id, _)| *id != conn_id);

        let mut recipients = Vec::new();
        let mut kept = Vec::new();
        for mut channel in std::mem::take(&mut self.channels) {
            if channel.has(&nickname) {
                channel.remove(&nickname);
                recipients.extend(channel.members.iter().cloned());
                if channel.owner == nickname {
                    continue;
                }
            }
            kept.push(channel);
        }
        self.channels = kept;

        OperationResult::ok(recipients)
    }

    /// Apply one command from a connected sender.
    pub fn apply_command(&mut self, command: &Command) -> OperationResult {
        match self.command_result(command) {
            Ok(recipients) => OperationResult::ok(recipients),
            Err(response) => OperationResult::Error(response),
        }
    }

    fn command_result(&mut self, command: &Command) -> Result<Vec<String>, ServerResponse> {
        let sender = command.sender.as_str();
        match &command.intent {
            Intent::Nickname { new_nickname } => {
                if !valid(new_nickname) {
                    return Err(ServerResponse::InvalidName);
                }
                if self.registered(new_nickname) {
                    return Err(ServerResponse::NameAlreadyInUse);
                }
                let mut recipients = vec![new_nickname.clone()];
                for channel in &mut self.channels {
                    if channel.has(sender) {
                        channel.remove(sender);
                        channel.add(new_nickname);
                        if channel.owner == sender {
                            channel.owner.clone_from(new_nickname);
                        }
                        recipients.extend(channel.members.iter().cloned());
                    }
                }
                for (_, nickname) in &mut self.users {
                    if nickname == sender {
                        nickname.clone_from(new_nickname);
                    }
                }
                Ok(recipients)
            },

            Intent::Create { channel, invite_only } => {
                if !valid(channel) {
                    return Err(ServerResponse::InvalidName);
                }
                if self.channels.iter().any(|c| &c.name == channel) {
                    return Err(ServerResponse::ChannelAlreadyExists);
                }
                self.channels.push(ModelChannel {
                    name: channel.clone(),
                    owner: sender.to_string(),
                    private: *invite_only,
                    members: vec![sender.to_string()],
                });
                self.channels.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(vec![sender.to_string()])
            },

            Intent::Join { channel } => {
                let channel = self.channel_mut(channel).ok_or(ServerResponse::NoSuchChannel)?;
                if channel.private {
                    return Err(ServerResponse::JoinPrivateChannel);
                }
                channel.add(sender);
                Ok(channel.members.clone())
            },

            Intent::Message { channel, .. } => {
                let channel = self.channel_mut(channel).ok_or(ServerResponse::NoSuchChannel)?;
                if !channel.has(sender) {
                    return Err(ServerResponse::UserNotInChannel);
                }
                Ok(channel.members.clone())
            },

            Intent::Leave { channel: name } => {
                let channel = self.channel_mut(name).ok_or(ServerResponse::NoSuchChannel)?;
                if !channel.has(sender) {
                    return Err(ServerResponse::UserNotInChannel);
                }
                let before = channel.members.clone();
                if channel.owner == sender {
                    self.delete_channel(name);
                } else {
                    channel.remove(sender);
                }
                Ok(before)
            },

            Intent::Invite { channel, user_to_invite } => {
                if !self.registered(user_to_invite) {
                    return Err(ServerResponse::NoSuchUser);
                }
                let channel = self.channel_mut(channel).ok_or(ServerResponse::NoSuchChannel)?;
                if !channel.private {
                    return Err(ServerResponse::InviteToPublicChannel);
                }
                if channel.owner != sender {
                    return Err(ServerResponse::UserNotOwner);
                }
                channel.add(user_to_invite);
                Ok(channel.members.clone())
            },

            Intent::Kick { channel: name, user_to_kick } => {
                if !self.registered(user_to_kick) {
                    return Err(ServerResponse::NoSuchUser);
                }
                let channel = self.channel_mut(name).ok_or(ServerResponse::NoSuchChannel)?;
                if !channel.has(user_to_kick) {
                    return Err(ServerResponse::UserNotInChannel);
                }
                if channel.owner != sender {
                    return Err(ServerResponse::UserNotOwner);
                }
                let before = channel.members.clone();
                if channel.owner == *user_to_kick {
                    self.delete_channel(name);
                } else {
                    channel.remove(user_to_kick);
                }
                Ok(before)
            },
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState { users: self.users.clone(), channels: self.channels.clone() }
    }
}
