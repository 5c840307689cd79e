use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::ConfigBackend;
use crate::error::{RegistryError, Result};

/// In-process configuration store.
///
/// Records every write in order and can be told to fail on a specific key,
/// which makes it the stand-in for npm in tests.
#[derive(Debug, Default)]
pub struct MemoryConfig {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    values: BTreeMap<String, String>,
    writes: Vec<String>,
    fail_on: Option<String>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.lock().values.insert(key.to_string(), value.to_string());
        self
    }

    /// Make every later `set` or `delete` of `key` fail.
    pub fn fail_on(&self, key: &str) {
        self.lock().fail_on = Some(key.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    /// Writes so far, as `set key=value` / `delete key` lines.
    pub fn writes(&self) -> Vec<String> {
        self.lock().writes.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(state: &MemoryState, key: &str, command: &str) -> Result<()> {
        if state.fail_on.as_deref() == Some(key) {
            return Err(RegistryError::Backend {
                command: format!("config {command} {key}"),
                status: "exit status: 1".to_string(),
                stderr: format!("refusing to {command} {key}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigBackend for MemoryConfig {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, key, "set")?;
        state.values.insert(key.to_string(), value.to_string());
        state.writes.push(format!("set {key}={value}"));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, key, "delete")?;
        state.values.remove(key);
        state.writes.push(format!("delete {key}"));
        Ok(())
    }
}
