//! # webmods domain layer
//!
//! Core types shared by every other crate in the workspace. Nothing in here
//! performs I/O; adapters live in `webmods-providers` and cross-cutting
//! concerns in `webmods-infrastructure`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Workspace-wide error type and `Result` alias |
//! | [`value_objects`] | Log attributes and provider configuration values |
//! | [`ports`] | Traits implemented by KV and object-storage providers |
//! | [`constants`] | Domain constants |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::{Attr, AttrValue};
