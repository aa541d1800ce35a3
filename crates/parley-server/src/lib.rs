//! Parley server driver.
//!
//! Sits between a transport and the [`ServerModel`]:
//!
//! ```text
//! transport ──ServerEvent──▶ ServerDriver ──Command──▶ ServerModel
//!     ▲                           │                       │
//!     └──────ServerAction─────────┴◀──────Broadcast───────┘
//! ```
//!
//! The driver owns connection bookkeeping that the model deliberately leaves
//! to its host: stamping commands with the sender's current nickname,
//! resolving recipient nicknames back to connection ids, and capping the
//! number of live connections. It performs no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod error;
mod shared;

pub use driver::{ServerAction, ServerConfig, ServerDriver, ServerEvent};
pub use error::DriverError;
pub use parley_core::ServerModel;
pub use shared::{SharedServer, create_shared_server};
