//! MEW HA Core Types
//!
//! Value types shared by the master coordination core and its kernel:
//! - Entity identities (NodeId, RelationshipId, EntityRef)
//! - Remote transaction keys and opaque context handles
//! - Lock kinds, outcomes and status codes
//! - Id categories and allocation blocks
//! - The response envelope and its change-stream placeholder

mod alloc;
mod id;
mod key;
mod lock;
mod response;

pub use alloc::*;
pub use id::*;
pub use key::*;
pub use lock::*;
pub use response::*;
