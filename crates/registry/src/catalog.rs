//! Built-in table of well-known npm registries.

use once_cell::sync::Lazy;

use crate::entry::RegistryEntry;

/// Registry npm talks to when nothing else is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Name of the catalog entry for [`DEFAULT_REGISTRY`].
pub const DEFAULT_REGISTRY_NAME: &str = "npm";

const WELL_KNOWN: &[(&str, &str, &str)] = &[
    ("npm", DEFAULT_REGISTRY, "https://www.npmjs.org"),
    ("yarn", "https://registry.yarnpkg.com/", "https://yarnpkg.com"),
    ("tencent", "https://mirrors.cloud.tencent.com/npm/", "https://mirrors.cloud.tencent.com/npm/"),
    ("cnpm", "https://r.cnpmjs.org/", "https://cnpmjs.org"),
    ("taobao", "https://registry.npmmirror.com/", "https://npmmirror.com"),
    ("npmMirror", "https://skimdb.npmjs.com/registry/", "https://skimdb.npmjs.com/"),
];

static CATALOG: Lazy<Vec<RegistryEntry>> = Lazy::new(|| {
    WELL_KNOWN
        .iter()
        .map(|(name, registry, home)| RegistryEntry::new(*name, *registry).with_home(*home))
        .collect()
});

/// The immutable catalog, in display order.
pub fn catalog() -> &'static [RegistryEntry] {
    &CATALOG
}

pub fn lookup(name: &str) -> Option<&'static RegistryEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_in_catalog() {
        let npm = lookup(DEFAULT_REGISTRY_NAME).unwrap();
        assert_eq!(npm.registry, DEFAULT_REGISTRY);
    }

    #[test]
    fn catalog_urls_are_normalized() {
        assert!(catalog().iter().all(|entry| entry.registry.ends_with('/')));
    }
}
