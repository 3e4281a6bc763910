//! Shared foundational types used across the viewcache workspace.
//!
//! Currently this is the content fingerprint used to decide whether a
//! template's compiled artifact is still valid.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{ContentHash, ParseHashError};
