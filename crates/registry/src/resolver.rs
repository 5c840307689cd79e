//! Merging the catalog with the record file, and reading what npm uses now.

use crate::backend::ConfigBackend;
use crate::catalog::{self, DEFAULT_REGISTRY};
use crate::entry::{FIELD_REGISTRY, RegistryEntry};
use crate::error::Result;
use crate::record::CustomRegistries;

/// Catalog entries overlaid by custom ones.
///
/// Catalog order comes first; a custom entry with a catalog name replaces it
/// in place, and the remaining custom entries follow in record order.
pub fn merge(custom: &CustomRegistries) -> Vec<RegistryEntry> {
    let mut merged: Vec<RegistryEntry> = catalog::catalog()
        .iter()
        .map(|entry| custom.get(&entry.name).unwrap_or(entry).clone())
        .collect();

    merged.extend(
        custom
            .iter()
            .filter(|entry| catalog::lookup(&entry.name).is_none())
            .cloned(),
    );
    merged
}

pub fn find<'a>(merged: &'a [RegistryEntry], name: &str) -> Option<&'a RegistryEntry> {
    merged.iter().find(|entry| entry.name == name)
}

/// Name of the first entry whose registry URL is `live`.
pub fn name_for_url<'a>(merged: &'a [RegistryEntry], live: &str) -> Option<&'a str> {
    merged
        .iter()
        .find(|entry| entry.registry == live)
        .map(|entry| entry.name.as_str())
}

/// The registry npm is configured with right now.
pub async fn live_registry(backend: &dyn ConfigBackend) -> Result<String> {
    let value = backend.get(FIELD_REGISTRY).await?;
    Ok(value.unwrap_or_else(|| DEFAULT_REGISTRY.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryConfig;

    #[test]
    fn custom_entries_shadow_catalog_in_place() {
        let mut custom = CustomRegistries::default();
        custom.insert(RegistryEntry::new("local", "http://localhost:4873/"));
        custom.insert(RegistryEntry::new("yarn", "https://yarn.mirror.example/"));

        let merged = merge(&custom);

        assert_eq!(merged.len(), catalog::catalog().len() + 1);
        assert_eq!(merged[1].name, "yarn");
        assert_eq!(merged[1].registry, "https://yarn.mirror.example/");
        assert_eq!(merged.last().unwrap().name, "local");
        assert_eq!(catalog::lookup("yarn").unwrap().registry, "https://registry.yarnpkg.com/");
    }

    #[test]
    fn url_lookup_prefers_first_match() {
        let merged = merge(&CustomRegistries::default());
        assert_eq!(name_for_url(&merged, DEFAULT_REGISTRY), Some("npm"));
        assert_eq!(name_for_url(&merged, "https://unknown.example/"), None);
    }

    #[tokio::test]
    async fn unset_registry_reports_npm_default() {
        let backend = MemoryConfig::new();
        assert_eq!(live_registry(&backend).await.unwrap(), DEFAULT_REGISTRY);
    }
}
