//! Crate-wide primitives shared by every component: the error taxonomy (§7)
//! and the handful of cross-cutting value types components pass between each
//! other.

pub mod error;

pub use error::{CoreError, CoreResult};

/// An opaque external user identifier (§3: "in practice a chat-platform ID").
/// A thin alias rather than a newtype: the core never validates its shape,
/// only ever compares and stores it.
pub type UserId = String;
