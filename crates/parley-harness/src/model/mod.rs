//! Reference model for model-based testing.
//!
//! The model is a deliberately naive implementation of the chat server:
//! linear scans over vectors, no indices. It serves as the oracle against
//! which the real implementation is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Independence: Shares no code with the real state machine
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod world;

pub use operation::{CHANNEL_NAMES, ClientId, NICKNAMES, Operation, OperationResult};
pub use world::{ModelChannel, ModelWorld, ObservableState};
