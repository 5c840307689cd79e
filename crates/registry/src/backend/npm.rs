use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{ConfigBackend, PublishOptions, Publisher};
use crate::error::{RegistryError, Result};

/// Talks to npm by spawning the `npm` executable.
#[derive(Debug, Clone)]
pub struct NpmCli {
    program: String,
}

impl Default for NpmCli {
    fn default() -> Self {
        Self::new("npm")
    }
}

impl NpmCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn capture(&self, args: &[&str]) -> Result<String> {
        // the value of `config set` may be a credential
        let shown = &args[..args.len().min(3)];
        debug!("Running {} {}", self.program, shown.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RegistryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RegistryError::Backend {
                command: format!("{} {}", self.program, shown.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ConfigBackend for NpmCli {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.capture(&["config", "get", key]).await?;
        // npm prints `undefined` for unset keys
        match value.as_str() {
            "" | "undefined" | "null" => Ok(None),
            _ => Ok(Some(value)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.capture(&["config", "set", key, value]).await.map(|_| ())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.capture(&["config", "delete", key]).await.map(|_| ())
    }
}

#[async_trait]
impl Publisher for NpmCli {
    async fn publish(&self, target: Option<&Path>, options: &PublishOptions) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.arg("publish");
        if let Some(target) = target {
            command.arg(target);
        }
        command.args(options.as_flags());

        debug!("Running {} publish {:?}", self.program, target);

        // publish output and otp prompts go straight to the user's terminal
        let status = command.status().await.map_err(|source| RegistryError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(RegistryError::Backend {
                command: format!("{} publish", self.program),
                status: status.to_string(),
                stderr: "see output above".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let npm = NpmCli::new("regswitch-test-no-such-npm");

        let err = npm.get("registry").await.unwrap_err();
        assert!(matches!(err, RegistryError::Spawn { .. }));
    }
}
