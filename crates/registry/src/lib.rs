//! Registry bookkeeping for npm.
//!
//! Combines a built-in [`catalog`] of well-known registries with the user's
//! [`record`] file of custom ones, switches npm between them through a
//! [`ConfigBackend`], and measures how fast each one answers.

pub mod backend;
pub mod catalog;
pub mod entry;
pub mod error;
pub mod manager;
pub mod probe;
pub mod propagate;
pub mod record;
pub mod resolver;

pub use backend::{ConfigBackend, MemoryConfig, NpmCli, PublishOptions, Publisher};
pub use catalog::{DEFAULT_REGISTRY, DEFAULT_REGISTRY_NAME};
pub use entry::RegistryEntry;
pub use error::{RegistryError, Result};
pub use manager::{AuthRequest, PublishTarget, RegistryManager};
pub use probe::{HttpProbe, ProbeResult, Prober, ReqwestProbe};
pub use record::{CustomRegistries, RecordStore};
