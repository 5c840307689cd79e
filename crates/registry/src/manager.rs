//! Registry operations: switching, editing the record file, publishing.
//!
//! Every operation is a fresh read-modify-write of the record file. When an
//! operation also changes the package manager config, the config is written
//! first and the record file is only saved once that succeeded.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{info, warn};
use url::Url;

use crate::backend::{ConfigBackend, PublishOptions, Publisher};
use crate::catalog::DEFAULT_REGISTRY_NAME;
use crate::entry::{
    FIELD_ALWAYS_AUTH, FIELD_AUTH, FIELD_EMAIL, FIELD_REGISTRY, FIELD_REPOSITORY, RegistryEntry,
    normalize_registry_url,
};
use crate::error::{RegistryError, Result};
use crate::propagate::propagate;
use crate::record::{CustomRegistries, RecordStore};
use crate::resolver;

/// Credentials given to `set-auth`.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    /// Ready-made `_auth` value.
    pub value: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub always_auth: bool,
}

impl AuthRequest {
    /// The `_auth` value: `value` as given, or base64 of `username:password`.
    pub fn credential(&self) -> Result<String> {
        if let Some(value) = self.value.as_deref().filter(|v| !v.is_empty()) {
            return Ok(value.to_string());
        }
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(BASE64.encode(format!("{username}:{password}")))
            }
            _ => Err(RegistryError::Validation(
                "your username & password or auth value is required".to_string(),
            )),
        }
    }
}

/// Where `publish` sent the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    /// The hosted repository of the current custom registry.
    Repository { name: String, url: String },
    /// Whatever registry npm was already using.
    Live(String),
}

pub struct RegistryManager {
    records: RecordStore,
    backend: Arc<dyn ConfigBackend>,
    fallback: String,
}

impl RegistryManager {
    pub fn new(records: RecordStore, backend: Arc<dyn ConfigBackend>) -> Self {
        Self {
            records,
            backend,
            fallback: DEFAULT_REGISTRY_NAME.to_string(),
        }
    }

    /// Registry activated when the live custom registry is deleted.
    pub fn with_fallback(mut self, name: impl Into<String>) -> Self {
        self.fallback = name.into();
        self
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Catalog plus custom registries.
    pub async fn registries(&self) -> Result<Vec<RegistryEntry>> {
        Ok(resolver::merge(&self.records.load().await?))
    }

    pub async fn find(&self, name: &str) -> Result<RegistryEntry> {
        let merged = self.registries().await?;
        resolver::find(&merged, name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// The registry URL npm uses right now.
    pub async fn current_url(&self) -> Result<String> {
        resolver::live_registry(self.backend.as_ref()).await
    }

    /// Name of the known registry matching [`Self::current_url`], if any.
    pub async fn current_name(&self) -> Result<Option<String>> {
        let live = self.current_url().await?;
        let merged = self.registries().await?;
        Ok(resolver::name_for_url(&merged, &live).map(str::to_string))
    }

    /// Switch npm to the named registry and return the registry now live.
    pub async fn use_registry(&self, name: &str) -> Result<String> {
        let entry = self.find(name).await?;
        self.activate(&entry).await
    }

    async fn activate(&self, entry: &RegistryEntry) -> Result<String> {
        propagate(self.backend.as_ref(), &entry.use_attributes(), entry).await?;

        let live = self.current_url().await?;
        let mut custom = self.records.load().await?;
        custom.clear_current();
        if let Some(stored) = custom.get_mut(&entry.name)
            && stored.registry == live
        {
            stored.is_current = true;
        }
        self.records.save(&custom).await?;

        info!("Switched registry to '{}' ({})", entry.name, live);
        Ok(live)
    }

    /// Add a custom registry. Returns `false` when the name is already taken.
    pub async fn add(&self, name: &str, url: &str, home: Option<&str>) -> Result<bool> {
        let mut custom = self.records.load().await?;
        if custom.contains(name) {
            return Ok(false);
        }

        Url::parse(url.trim()).map_err(|source| RegistryError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let mut entry = RegistryEntry::new(name, normalize_registry_url(url));
        entry.home = home.map(str::to_string);
        custom.insert(entry);

        self.records.save(&custom).await?;
        info!("Added registry '{}'", name);
        Ok(true)
    }

    /// Delete a custom registry.
    ///
    /// When npm currently points at it, the fallback registry is activated
    /// first; its name is returned in that case.
    pub async fn delete(&self, name: &str) -> Result<Option<String>> {
        let custom = self.records.load().await?;
        let entry = custom
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        let live = self.current_url().await?;
        let mut fallback_used = None;
        if entry.registry == live {
            let fallback = self.fallback_entry(&custom, name)?;
            warn!(
                "Registry '{}' is in use, switching to '{}' before deleting it",
                name, fallback.name
            );
            self.activate(&fallback).await?;
            fallback_used = Some(fallback.name);
        }

        let mut custom = self.records.load().await?;
        custom.remove(name);
        self.records.save(&custom).await?;

        info!("Deleted registry '{}'", name);
        Ok(fallback_used)
    }

    fn fallback_entry(&self, custom: &CustomRegistries, deleting: &str) -> Result<RegistryEntry> {
        let mut remaining = custom.clone();
        remaining.remove(deleting);
        let merged = resolver::merge(&remaining);

        resolver::find(&merged, &self.fallback).cloned().ok_or_else(|| {
            RegistryError::Validation(format!(
                "fallback registry '{}' is not available, refusing to delete the registry in use",
                self.fallback
            ))
        })
    }

    pub async fn set_auth(&self, name: &str, request: &AuthRequest) -> Result<()> {
        self.update(name, |entry| {
            entry.auth = Some(request.credential()?);
            let mut keys = vec![FIELD_AUTH];
            if request.always_auth {
                entry.always_auth = Some(true);
                keys.push(FIELD_ALWAYS_AUTH);
            }
            Ok(keys)
        })
        .await
    }

    pub async fn set_email(&self, name: &str, email: &str) -> Result<()> {
        self.update(name, |entry| {
            entry.email = Some(email.to_string());
            Ok(vec![FIELD_EMAIL])
        })
        .await
    }

    /// Set the hosted repository `publish` targets for this registry.
    pub async fn set_repository(&self, name: &str, repository: &str) -> Result<()> {
        self.update(name, |entry| {
            entry.repository = Some(repository.to_string());
            Ok(vec![FIELD_REPOSITORY])
        })
        .await
    }

    /// Mutate one custom entry, propagating the returned keys if it is current.
    async fn update<F>(&self, name: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut RegistryEntry) -> Result<Vec<&'static str>>,
    {
        let mut custom = self.records.load().await?;
        let entry = custom
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        let keys = mutate(entry)?;
        if entry.is_current {
            propagate(self.backend.as_ref(), &keys, &*entry).await?;
        }

        self.records.save(&custom).await
    }

    /// Publish through `publisher`.
    ///
    /// If the live registry is the current custom registry, npm is pointed at
    /// its hosted repository for the duration of the publish and pointed back
    /// afterwards, even when publishing fails.
    pub async fn publish(
        &self,
        publisher: &dyn Publisher,
        target: Option<&Path>,
        options: &PublishOptions,
    ) -> Result<PublishTarget> {
        let live = self.current_url().await?;
        let custom = self.records.load().await?;

        let Some(current) = custom
            .iter()
            .find(|entry| entry.is_current && entry.registry == live)
            .cloned()
        else {
            info!("Current registry is not a custom registry, publishing to {}", live);
            publisher.publish(target, options).await?;
            return Ok(PublishTarget::Live(live));
        };

        let repository = current
            .repository
            .clone()
            .ok_or_else(|| RegistryError::PublishPrecondition {
                name: current.name.clone(),
            })?;

        let mut keys = vec![FIELD_REGISTRY.to_string()];
        let mut overrides = BTreeMap::new();
        overrides.insert(FIELD_REGISTRY.to_string(), repository.clone());
        for (key, value) in options.as_config() {
            keys.push(key.to_string());
            overrides.insert(key.to_string(), value);
        }

        let outcome = match propagate(self.backend.as_ref(), &keys, &overrides).await {
            Ok(()) => publisher.publish(target, &PublishOptions::default()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            warn!("Publishing to {} failed: {}", repository, e);
        }

        propagate(self.backend.as_ref(), &keys, &current).await?;
        outcome?;

        Ok(PublishTarget::Repository {
            name: current.name,
            url: repository,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_value_wins_over_username() {
        let request = AuthRequest {
            value: Some("dG9rZW4=".to_string()),
            username: Some("alice".to_string()),
            password: Some("secret".to_string()),
            always_auth: false,
        };
        assert_eq!(request.credential().unwrap(), "dG9rZW4=");
    }

    #[test]
    fn username_and_password_are_base64_encoded() {
        let request = AuthRequest {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..Default::default()
        };
        assert_eq!(request.credential().unwrap(), "dXNlcjpwYXNz");
    }

    #[test]
    fn missing_password_is_a_validation_error() {
        let request = AuthRequest {
            username: Some("user".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            request.credential(),
            Err(RegistryError::Validation(_))
        ));
    }
}
