//! Writing registry attributes into the package manager config.
//!
//! A propagation is planned as an ordered list of [`ConfigStep`]s and then
//! executed one step at a time. The first failing step stops the run; steps
//! after it are never sent.

use std::fmt;

use tracing::debug;

use crate::backend::ConfigBackend;
use crate::entry::AttributeSource;
use crate::error::{RegistryError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStep {
    Set { key: String, value: String },
    Delete { key: String },
}

impl ConfigStep {
    pub fn key(&self) -> &str {
        match self {
            ConfigStep::Set { key, .. } | ConfigStep::Delete { key } => key,
        }
    }
}

// values are left out, they may be credentials
impl fmt::Display for ConfigStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigStep::Set { key, .. } => write!(f, "set {key}"),
            ConfigStep::Delete { key } => write!(f, "delete {key}"),
        }
    }
}

/// Plan one step per attribute: `set` when `source` has a value, `delete` otherwise.
pub fn plan<S, K>(attributes: &[K], source: &S) -> Vec<ConfigStep>
where
    S: AttributeSource + ?Sized,
    K: AsRef<str>,
{
    attributes
        .iter()
        .map(|key| {
            let key = key.as_ref();
            match source.attribute(key) {
                Some(value) => ConfigStep::Set {
                    key: key.to_string(),
                    value,
                },
                None => ConfigStep::Delete {
                    key: key.to_string(),
                },
            }
        })
        .collect()
}

/// Execute `steps` in order, stopping at the first failure.
pub async fn apply(backend: &dyn ConfigBackend, steps: &[ConfigStep]) -> Result<()> {
    for step in steps {
        debug!("Propagating {}", step);

        let outcome = match step {
            ConfigStep::Set { key, value } => backend.set(key, value).await,
            ConfigStep::Delete { key } => backend.delete(key).await,
        };

        outcome.map_err(|source| RegistryError::Propagation {
            key: step.key().to_string(),
            source: Box::new(source),
        })?;
    }
    Ok(())
}

/// Plan and apply in one go.
pub async fn propagate<S, K>(backend: &dyn ConfigBackend, attributes: &[K], source: &S) -> Result<()>
where
    S: AttributeSource + ?Sized,
    K: AsRef<str>,
{
    apply(backend, &plan(attributes, source)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryConfig;
    use crate::entry::RegistryEntry;

    fn corp() -> RegistryEntry {
        let mut entry = RegistryEntry::new("corp", "https://npm.corp.example/");
        entry.auth = Some("dXNlcjpwYXNz".to_string());
        entry
    }

    #[test]
    fn absent_attributes_plan_as_deletes() {
        let steps = plan(&["registry", "_auth", "always-auth"], &corp());

        assert_eq!(
            steps,
            vec![
                ConfigStep::Set {
                    key: "registry".to_string(),
                    value: "https://npm.corp.example/".to_string()
                },
                ConfigStep::Set {
                    key: "_auth".to_string(),
                    value: "dXNlcjpwYXNz".to_string()
                },
                ConfigStep::Delete {
                    key: "always-auth".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn steps_run_in_order() {
        let backend = MemoryConfig::new().with_value("always-auth", "true");

        propagate(&backend, &["registry", "_auth", "always-auth"], &corp())
            .await
            .unwrap();

        assert_eq!(
            backend.writes(),
            vec![
                "set registry=https://npm.corp.example/",
                "set _auth=dXNlcjpwYXNz",
                "delete always-auth",
            ]
        );
        assert_eq!(backend.value("always-auth"), None);
    }

    #[tokio::test]
    async fn first_failure_stops_the_run() {
        let backend = MemoryConfig::new();
        backend.fail_on("_auth");

        let err = propagate(&backend, &["registry", "_auth", "email"], &corp())
            .await
            .unwrap_err();

        match err {
            RegistryError::Propagation { key, .. } => assert_eq!(key, "_auth"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.writes(), vec!["set registry=https://npm.corp.example/"]);
    }
}
