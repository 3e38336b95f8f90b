//! Credential-domain identifiers and bearer credential models.

pub mod credential;
pub mod id;

pub use credential::*;
pub use id::*;
