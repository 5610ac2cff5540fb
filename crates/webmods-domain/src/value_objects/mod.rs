//! Value objects

pub mod attr;
pub mod config;

pub use attr::{Attr, AttrValue};
pub use config::{KvConfig, StorageConfig};
