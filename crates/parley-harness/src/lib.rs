//! Test harness for the Parley state machine.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation written for
//! obviousness rather than speed. Operations are applied to both the model
//! and the real `ServerModel`, and their results and observable states are
//! compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;

pub use model::{
    CHANNEL_NAMES, ClientId, ModelChannel, ModelWorld, NICKNAMES, ObservableState, Operation,
    OperationResult,
};
