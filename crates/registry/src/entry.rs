//! Registry entries and the attribute keys they expose to the package manager.

use std::collections::BTreeMap;

pub const FIELD_REGISTRY: &str = "registry";
pub const FIELD_HOME: &str = "home";
pub const FIELD_AUTH: &str = "_auth";
pub const FIELD_ALWAYS_AUTH: &str = "always-auth";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_REPOSITORY: &str = "repository";
pub const FIELD_IS_CURRENT: &str = "is-current";

/// Local bookkeeping keys that never reach the package manager config on `use`.
pub const IGNORED_FIELDS: &[&str] = &[FIELD_IS_CURRENT, FIELD_REPOSITORY];

const KNOWN_FIELDS: &[&str] = &[
    FIELD_REGISTRY,
    FIELD_HOME,
    FIELD_AUTH,
    FIELD_ALWAYS_AUTH,
    FIELD_EMAIL,
    FIELD_REPOSITORY,
    FIELD_IS_CURRENT,
];

/// Anything the propagator can read attribute values from.
pub trait AttributeSource {
    fn attribute(&self, key: &str) -> Option<String>;
}

impl AttributeSource for BTreeMap<String, String> {
    fn attribute(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A named registry, either from the built-in catalog or the record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub registry: String,
    pub home: Option<String>,
    pub auth: Option<String>,
    pub always_auth: Option<bool>,
    pub email: Option<String>,
    /// Hosted repository that `publish` targets instead of `registry`.
    pub repository: Option<String>,
    pub is_current: bool,
    /// Keys this tool does not interpret, kept in record file order.
    pub extra: Vec<(String, String)>,
}

impl RegistryEntry {
    pub fn new(name: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: normalize_registry_url(&registry.into()),
            home: None,
            auth: None,
            always_auth: None,
            email: None,
            repository: None,
            is_current: false,
            extra: Vec::new(),
        }
    }

    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Build an entry from the key/value pairs of one record file section.
    ///
    /// Returns `None` when the section carries no `registry` key.
    pub fn from_pairs<'a, I>(name: &str, pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = None;
        let mut entry = Self::new(name, "");

        for (key, value) in pairs {
            match key {
                FIELD_REGISTRY => registry = Some(normalize_registry_url(value)),
                FIELD_HOME => entry.home = Some(value.to_string()),
                FIELD_AUTH => entry.auth = Some(value.to_string()),
                FIELD_ALWAYS_AUTH => entry.always_auth = Some(parse_flag(value)),
                FIELD_EMAIL => entry.email = Some(value.to_string()),
                FIELD_REPOSITORY => entry.repository = Some(value.to_string()),
                FIELD_IS_CURRENT => entry.is_current = parse_flag(value),
                _ => entry.extra.push((key.to_string(), value.to_string())),
            }
        }

        entry.registry = registry?;
        Some(entry)
    }

    /// Keys this entry carries a value for, in the order they are written.
    pub fn present_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = KNOWN_FIELDS
            .iter()
            .filter(|key| self.attribute(key).is_some())
            .map(|key| key.to_string())
            .collect();
        keys.extend(self.extra.iter().map(|(key, _)| key.clone()));
        keys
    }

    /// Key/value pairs for the record file section of this entry.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.present_keys()
            .into_iter()
            .filter_map(|key| self.attribute(&key).map(|value| (key, value)))
            .collect()
    }

    /// Attributes written to the package manager config when switching to this entry.
    ///
    /// `registry` always comes first so a partial failure never leaves
    /// credentials attached to the previous registry URL.
    pub fn use_attributes(&self) -> Vec<String> {
        self.present_keys()
            .into_iter()
            .filter(|key| !IGNORED_FIELDS.contains(&key.as_str()))
            .collect()
    }
}

impl AttributeSource for RegistryEntry {
    fn attribute(&self, key: &str) -> Option<String> {
        match key {
            FIELD_REGISTRY => Some(self.registry.clone()),
            FIELD_HOME => self.home.clone(),
            FIELD_AUTH => self.auth.clone(),
            FIELD_ALWAYS_AUTH => self.always_auth.map(|flag| flag.to_string()),
            FIELD_EMAIL => self.email.clone(),
            FIELD_REPOSITORY => self.repository.clone(),
            FIELD_IS_CURRENT => self.is_current.then(|| "true".to_string()),
            _ => self
                .extra
                .iter()
                .find(|(extra_key, _)| extra_key == key)
                .map(|(_, value)| value.clone()),
        }
    }
}

/// Ensure a registry URL ends with exactly one `/`.
pub fn normalize_registry_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{}/", trimmed.trim_end_matches('/'))
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_separator() {
        assert_eq!(
            normalize_registry_url("https://example.com/repo"),
            "https://example.com/repo/"
        );
        assert_eq!(
            normalize_registry_url("https://example.com/repo//"),
            "https://example.com/repo/"
        );
    }

    #[test]
    fn use_attributes_start_with_registry_and_skip_bookkeeping() {
        let mut entry = RegistryEntry::new("corp", "https://npm.corp.example/");
        entry.auth = Some("dXNlcjpwYXNz".to_string());
        entry.repository = Some("https://npm.corp.example/hosted/".to_string());
        entry.is_current = true;
        entry.extra.push(("strict-ssl".to_string(), "false".to_string()));

        assert_eq!(
            entry.use_attributes(),
            vec!["registry", "_auth", "strict-ssl"]
        );
    }

    #[test]
    fn unknown_keys_survive_pair_conversion() {
        let pairs = [
            ("registry", "https://npm.corp.example"),
            ("is-current", "true"),
            ("ca", "corp-root"),
        ];
        let entry = RegistryEntry::from_pairs("corp", pairs).unwrap();

        assert!(entry.is_current);
        assert_eq!(entry.registry, "https://npm.corp.example/");
        assert_eq!(
            entry.to_pairs(),
            vec![
                ("registry".to_string(), "https://npm.corp.example/".to_string()),
                ("is-current".to_string(), "true".to_string()),
                ("ca".to_string(), "corp-root".to_string()),
            ]
        );
    }

    #[test]
    fn section_without_registry_is_rejected() {
        assert!(RegistryEntry::from_pairs("broken", [("home", "https://x.test")]).is_none());
    }
}
