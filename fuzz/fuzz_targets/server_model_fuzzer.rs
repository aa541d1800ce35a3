//! Fuzz target for [`ServerModel`]
//!
//! Drive the server model and the reference world with the same event
//! sequence and require identical results.
//!
//! # Strategy
//!
//! - Pooled operations: every command kind over small name pools, so
//!   collisions and missing targets are frequent
//! - Raw names: arbitrary UTF-8 nicknames and channel names to probe name
//!   validation
//!
//! # Invariants
//!
//! - Model and reference agree on every result and on observable state
//! - `check_invariants` holds after every event
//! - NEVER panic on any input

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_core::ServerModel;
use parley_harness::{ModelWorld, Operation, OperationResult};
use parley_proto::Command;

const MAX_CLIENTS: usize = 6;

#[derive(Debug, Clone, Arbitrary)]
enum FuzzEvent {
    Pooled(Operation),
    RawNick { client_id: u8, name: String },
    RawCreate { client_id: u8, name: String, invite_only: bool },
}

fn apply_real(server: &mut ServerModel, op: &Operation) -> OperationResult {
    let conn_id = op.conn_id();
    match op {
        Operation::Connect { .. } if server.nickname(conn_id).is_some() => OperationResult::Skipped,
        Operation::Connect { .. } => {
            OperationResult::from_broadcast(&server.register_user(conn_id))
        },
        Operation::Disconnect { .. } => server
            .deregister_user(conn_id)
            .map_or(OperationResult::Skipped, |b| OperationResult::from_broadcast(&b)),
        _ => {
            let Some(command) = server.nickname(conn_id).and_then(|sender| op.to_command(sender))
            else {
                return OperationResult::Skipped;
            };
            OperationResult::from_broadcast(&server.handle(command))
        },
    }
}

fn raw_command(
    server: &ServerModel,
    client_id: u8,
    build: impl FnOnce(u64, String) -> Command,
) -> Option<Command> {
    let conn_id = u64::from(client_id) % MAX_CLIENTS as u64;
    let sender = server.nickname(conn_id)?.to_string();
    Some(build(conn_id, sender))
}

fuzz_target!(|events: Vec<FuzzEvent>| {
    let mut server = ServerModel::new();
    let mut world = ModelWorld::new();

    for event in events.into_iter().take(256) {
        let (real, model) = match event {
            FuzzEvent::Pooled(op) => {
                let op = op.clamped(MAX_CLIENTS);
                (apply_real(&mut server, &op), world.apply(&op))
            },
            FuzzEvent::RawNick { client_id, name } => {
                let Some(command) = raw_command(&server, client_id, |id, sender| {
                    Command::nickname(id, sender, name)
                }) else {
                    continue;
                };
                let real = OperationResult::from_broadcast(&server.handle(command.clone()));
                (real, world.apply_command(&command))
            },
            FuzzEvent::RawCreate { client_id, name, invite_only } => {
                let Some(command) = raw_command(&server, client_id, |id, sender| {
                    Command::create(id, sender, name, invite_only)
                }) else {
                    continue;
                };
                let real = OperationResult::from_broadcast(&server.handle(command.clone()));
                (real, world.apply_command(&command))
            },
        };

        assert_eq!(real, model, "server and reference diverged");
        if let Err(violation) = server.check_invariants() {
            panic!("invariant violated: {violation}");
        }
    }
});
