//! Port traits
//!
//! | Port | Implementations (in `webmods-providers`) |
//! |------|------------------------------------------|
//! | [`KvClient`] | Redis (single node / cluster), in-memory |
//! | [`ObjectStorage`] | Local filesystem |

pub mod kv;
pub mod object_storage;

pub use kv::{KvClient, KvMessage, KvMessageStream};
pub use object_storage::{ObjectInfo, ObjectStorage};
