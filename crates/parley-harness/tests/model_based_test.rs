//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! server model behaves identically to the reference world.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelWorld    RealWorld       Compare
//!      (reference)   (ServerModel)   results + state
//! ```

use std::collections::BTreeSet;

use parley_core::ServerModel;
use parley_harness::{ModelChannel, ModelWorld, ObservableState, Operation, OperationResult};
use proptest::prelude::*;

/// Real system wrapper that mirrors ModelWorld's interface.
struct RealWorld {
    server: ServerModel,
}

impl RealWorld {
    fn new() -> Self {
        Self { server: ServerModel::new() }
    }

    fn apply(&mut self, op: &Operation) -> OperationResult {
        let conn_id = op.conn_id();
        match op {
            Operation::Connect { .. } => {
                if self.server.nickname(conn_id).is_some() {
                    return OperationResult::Skipped;
                }
                OperationResult::from_broadcast(&self.server.register_user(conn_id))
            },
            Operation::Disconnect { .. } => match self.server.deregister_user(conn_id) {
                Some(broadcast) => OperationResult::from_broadcast(&broadcast),
                None => OperationResult::Skipped,
            },
            _ => {
                let Some(sender) = self.server.nickname(conn_id) else {
                    return OperationResult::Skipped;
                };
                match op.to_command(sender) {
                    Some(command) => OperationResult::from_broadcast(&self.server.handle(command)),
                    None => OperationResult::Skipped,
                }
            },
        }
    }

    fn observable_state(&self) -> ObservableState {
        let users = self
            .server
            .registry()
            .iter()
            .map(|(id, nickname)| (id, nickname.to_string()))
            .collect();

        let channels = self
            .server
            .channels()
            .into_iter()
            .filter_map(|name| {
                let channel = self.server.channel(&name)?;
                Some(ModelChannel {
                    owner: channel.owner().to_string(),
                    private: channel.is_private(),
                    members: channel.members().iter().cloned().collect(),
                    name,
                })
            })
            .collect();

        ObservableState { users, channels }
    }
}

fn operation_strategy(num_clients: usize) -> impl Strategy<Value = Operation> {
    let client_id = 0..num_clients as u8;
    let nickname = any::<u8>();
    let channel = any::<u8>();

    prop_oneof![
        2 => client_id.clone().prop_map(|c| Operation::Connect { client_id: c }),
        1 => client_id.clone().prop_map(|c| Operation::Disconnect { client_id: c }),
        1 => (client_id.clone(), nickname.clone())
            .prop_map(|(c, n)| Operation::Rename { client_id: c, nickname: n }),
        3 => (client_id.clone(), channel.clone(), any::<bool>()).prop_map(|(c, ch, i)| {
            Operation::Create { client_id: c, channel: ch, invite_only: i }
        }),
        3 => (client_id.clone(), channel.clone())
            .prop_map(|(c, ch)| Operation::Join { client_id: c, channel: ch }),
        2 => (client_id.clone(), channel.clone())
            .prop_map(|(c, ch)| Operation::Message { client_id: c, channel: ch }),
        1 => (client_id.clone(), channel.clone())
            .prop_map(|(c, ch)| Operation::Leave { client_id: c, channel: ch }),
        2 => (client_id.clone(), channel.clone(), nickname.clone()).prop_map(|(c, ch, t)| {
            Operation::Invite { client_id: c, channel: ch, target: t }
        }),
        1 => (client_id, channel, nickname).prop_map(|(c, ch, t)| {
            Operation::Kick { client_id: c, channel: ch, target: t }
        }),
    ]
}

proptest! {
    /// Verify that operation results match between model and real implementation.
    ///
    /// Every step compares the result (recipients or rejection code) and the
    /// full observable state afterwards.
    #[test]
    fn prop_model_matches_real(
        num_clients in 2..6usize,
        ops in prop::collection::vec(operation_strategy(6), 0..80)
    ) {
        let mut model = ModelWorld::new();
        let mut real = RealWorld::new();

        for (i, op) in ops.into_iter().enumerate() {
            let op = op.clamped(num_clients);

            let model_result = model.apply(&op);
            let real_result = real.apply(&op);

            prop_assert_eq!(
                &model_result,
                &real_result,
                "Divergence at operation {}: {:?}",
                i, op
            );
            prop_assert_eq!(model.observable_state(), real.observable_state());
        }
    }

    /// Verify structural invariants hold after any operation sequence.
    #[test]
    fn prop_invariants_hold(
        num_clients in 2..6usize,
        ops in prop::collection::vec(operation_strategy(6), 0..120)
    ) {
        let mut real = RealWorld::new();

        for op in ops {
            real.apply(&op.clamped(num_clients));

            prop_assert_eq!(real.server.check_invariants(), Ok(()));

            let state = real.observable_state();
            let unique: BTreeSet<&str> = state.users.iter().map(|(_, n)| n.as_str()).collect();
            prop_assert_eq!(unique.len(), state.users.len());

            for channel in &state.channels {
                prop_assert!(channel.members.contains(&channel.owner));
                prop_assert!(channel.members.iter().all(|m| unique.contains(m.as_str())));
            }
        }
    }

    /// Rejected commands never change state.
    #[test]
    fn prop_rejections_are_pure(
        num_clients in 2..6usize,
        ops in prop::collection::vec(operation_strategy(6), 0..80)
    ) {
        let mut real = RealWorld::new();

        for op in ops {
            let before = real.observable_state();
            let result = real.apply(&op.clamped(num_clients));
            if result.is_err() {
                prop_assert_eq!(before, real.observable_state());
            }
        }
    }
}

#[cfg(test)]
mod smoke_tests {
    use super::*;

    fn run(ops: &[Operation]) -> (Vec<OperationResult>, Vec<OperationResult>) {
        let mut model = ModelWorld::new();
        let mut real = RealWorld::new();
        let model_results = ops.iter().map(|op| model.apply(op)).collect();
        let real_results = ops.iter().map(|op| real.apply(op)).collect();
        (model_results, real_results)
    }

    #[test]
    fn private_channel_session() {
        let ops = [
            Operation::Connect { client_id: 0 },
            Operation::Connect { client_id: 1 },
            Operation::Create { client_id: 0, channel: 1, invite_only: true },
            Operation::Join { client_id: 1, channel: 1 },
            Operation::Invite { client_id: 0, channel: 1, target: 1 },
            Operation::Message { client_id: 1, channel: 1 },
            Operation::Kick { client_id: 1, channel: 1, target: 0 },
            Operation::Leave { client_id: 0, channel: 1 },
        ];

        let (model, real) = run(&ops);
        assert_eq!(model, real);
        assert_eq!(real, vec![
            OperationResult::ok(["User0"]),
            OperationResult::ok(["User1"]),
            OperationResult::ok(["User0"]),
            OperationResult::Error(parley_proto::ServerResponse::JoinPrivateChannel),
            OperationResult::ok(["User0", "User1"]),
            OperationResult::ok(["User0", "User1"]),
            OperationResult::Error(parley_proto::ServerResponse::UserNotOwner),
            OperationResult::ok(["User0", "User1"]),
        ]);
    }

    #[test]
    fn rename_frees_generated_name() {
        let ops = [
            Operation::Connect { client_id: 0 },
            Operation::Rename { client_id: 0, nickname: 4 },
            Operation::Connect { client_id: 1 },
        ];

        let (model, real) = run(&ops);
        assert_eq!(model, real);
        assert_eq!(real[2], OperationResult::ok(["User0"]));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let ops = [
            Operation::Connect { client_id: 0 },
            Operation::Rename { client_id: 0, nickname: 6 },
            Operation::Create { client_id: 0, channel: 3, invite_only: false },
        ];

        let (model, real) = run(&ops);
        assert_eq!(model, real);
        assert!(real[1].is_err());
        assert!(real[2].is_err());
    }
}
