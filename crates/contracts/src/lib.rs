//! Shared contracts between the storefront backend and its admin client.
//!
//! Everything here compiles for both the server and a wasm client, so the
//! admin editor and the server enforce the same selection rules.

pub mod domain;
pub mod enums;
pub mod shared;
