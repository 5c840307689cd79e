//! Capabilities the registry manager borrows from the package manager.
//!
//! The manager never touches npm's own configuration files. It goes through
//! [`ConfigBackend`] for `get`/`set`/`delete` and through [`Publisher`] for
//! `publish`, so tests can swap in [`MemoryConfig`].

mod memory;
mod npm;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use self::memory::MemoryConfig;
pub use self::npm::NpmCli;

/// Key/value access to the package manager configuration.
///
/// `get("registry")` must reflect the most recent successful `set` or `delete`.
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    /// Read a key. `None` means the key is unset.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Options forwarded to the package manager's publish command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub tag: Option<String>,
    pub access: Option<String>,
    pub otp: Option<String>,
    pub dry_run: bool,
}

impl PublishOptions {
    /// Options as config keys, in the order they are propagated.
    pub fn as_config(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(access) = &self.access {
            pairs.push(("access", access.clone()));
        }
        if let Some(otp) = &self.otp {
            pairs.push(("otp", otp.clone()));
        }
        if self.dry_run {
            pairs.push(("dry-run", "true".to_string()));
        }
        pairs
    }

    /// Options as command line flags for a direct publish.
    pub fn as_flags(&self) -> Vec<String> {
        self.as_config()
            .into_iter()
            .flat_map(|(key, value)| match key {
                "dry-run" => vec![format!("--{key}")],
                _ => vec![format!("--{key}"), value],
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.as_config().is_empty()
    }
}

/// Runs the package manager's publish command.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `target` (a tarball or folder, or the working directory when `None`).
    async fn publish(&self, target: Option<&Path>, options: &PublishOptions) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_config_order() {
        let options = PublishOptions {
            tag: Some("beta".to_string()),
            access: Some("public".to_string()),
            otp: None,
            dry_run: true,
        };

        assert_eq!(
            options.as_flags(),
            vec!["--tag", "beta", "--access", "public", "--dry-run"]
        );
        assert!(PublishOptions::default().is_empty());
    }
}
