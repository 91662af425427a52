//! MEW HA Master
//!
//! Master-side coordination for replicated transactions.
//!
//! Replicas run transactions locally and call the master to take locks,
//! allocate ids and create relationship types on their behalf. The master
//! backs each remote transaction with an execution context on its own
//! engine, which can only have one context bound at a time.
//!
//! Responsibilities:
//! - Track which context backs each remote transaction (`ActiveContexts`)
//! - Switch the engine to a transaction's context and back around each call
//! - Translate lock manager signals into lock outcomes
//! - Hand out blocks of ids
//! - Intern relationship type names

mod alloc;
mod config;
mod contexts;
mod error;
mod intern;
mod lock;
mod master;
mod switch;

pub use alloc::IdBlockAllocator;
pub use config::{ConfigError, ConfigResult, MasterConfig};
pub use contexts::ActiveContexts;
pub use error::{MasterError, MasterResult};
pub use intern::NameInterner;
pub use lock::LockCoordinator;
pub use master::{Master, MasterBuilder, MasterCoordinator};
pub use switch::{switch_back, switch_to, PreviousContext, Switch};
