//! Layered configuration
//!
//! Files below a configuration directory are merged in layers and the
//! environment is laid on top. The result is an immutable [`ConfigStore`].
//!
//! | Layer (lowest first) | Used when |
//! |----------------------|-----------|
//! | `default.*` | no `<cmd>/default.*` exists |
//! | `<mode>.*` | no `<cmd>/default.*` exists |
//! | `<cmd>/default.*` | it exists (replaces both global layers) |
//! | `<cmd>/<mode>.*` | always, when present |
//! | `A__B__C` environment variables | always |
//! | any variable, read by exact path (`PORT` → `port`) | always, raw string |

pub mod loader;
pub mod store;
pub mod types;

pub use loader::ConfigLoader;
pub use store::ConfigStore;
pub use types::*;
