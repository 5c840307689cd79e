//! The user's record file of custom registries.
//!
//! The file is an ini document with one section per registry name, e.g.
//!
//! ```text
//! [corp]
//! registry=https://npm.corp.example/
//! home=https://wiki.corp.example/npm
//! is-current=true
//! ```
//!
//! Keys this tool does not know about are kept and written back unchanged.
//! Values are taken literally: no escape sequences, no quote stripping.
//! A section without a `registry` key is not a usable registry; it is kept
//! as raw pairs and written back, but never listed.

use std::path::{Path, PathBuf};

use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::entry::RegistryEntry;
use crate::error::{RegistryError, Result};

type Pairs = Vec<(String, String)>;

/// Custom registries loaded from the record file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomRegistries {
    entries: Vec<RegistryEntry>,
    /// Section-less keys at the top of the file.
    general: Pairs,
    /// Sections lacking a `registry` key, by name.
    incomplete: Vec<(String, Pairs)>,
}

fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

fn write_options() -> WriteOption {
    WriteOption {
        escape_policy: EscapePolicy::Nothing,
        ..Default::default()
    }
}

impl CustomRegistries {
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RegistryEntry> {
        self.entries.iter_mut().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace the entry with the same name, keeping its position.
    ///
    /// An incomplete section of that name is replaced as well.
    pub fn insert(&mut self, entry: RegistryEntry) {
        self.incomplete.retain(|(name, _)| *name != entry.name);
        match self.get_mut(&entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<RegistryEntry> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index))
    }

    pub fn clear_current(&mut self) {
        for entry in &mut self.entries {
            entry.is_current = false;
        }
    }

    /// The entry flagged as applied to the package manager config, if any.
    pub fn current(&self) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.is_current)
    }

    /// Names of sections that were skipped for lacking a `registry` key.
    pub fn incomplete_sections(&self) -> impl Iterator<Item = &str> {
        self.incomplete.iter().map(|(name, _)| name.as_str())
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let document = Ini::load_from_str_opt(content, parse_options()).map_err(|e| {
            RegistryError::RecordParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let mut registries = Self::default();
        for (section, properties) in document.iter() {
            match section {
                None => registries.general.extend(
                    properties
                        .iter()
                        .map(|(key, value)| (key.to_string(), value.to_string())),
                ),
                Some(name) => match RegistryEntry::from_pairs(name, properties.iter()) {
                    Some(entry) => registries.insert(entry),
                    None => {
                        warn!(
                            "Skipping [{}] in {}: no registry key",
                            name,
                            path.display()
                        );
                        let pairs: Pairs = properties
                            .iter()
                            .map(|(key, value)| (key.to_string(), value.to_string()))
                            .collect();
                        registries.incomplete.push((name.to_string(), pairs));
                    }
                },
            }
        }
        Ok(registries)
    }

    pub fn render(&self) -> Result<String> {
        let mut document = Ini::new();

        for (key, value) in &self.general {
            document.set_to(None::<String>, key.clone(), value.clone());
        }

        for entry in &self.entries {
            for (key, value) in entry.to_pairs() {
                document.set_to(Some(entry.name.as_str()), key, value);
            }
        }

        for (name, pairs) in &self.incomplete {
            for (key, value) in pairs {
                document.set_to(Some(name.as_str()), key.clone(), value.clone());
            }
        }

        let mut buffer = Vec::new();
        document
            .write_to_opt(&mut buffer, write_options())
            .map_err(|e| RegistryError::io("render record file", PathBuf::new(), e))?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Reads and writes [`CustomRegistries`] at a fixed path.
///
/// Every call goes to disk; nothing is cached between operations.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record file. A missing file is an empty set of registries.
    pub async fn load(&self) -> Result<CustomRegistries> {
        if !fs::try_exists(&self.path)
            .await
            .map_err(|e| RegistryError::io("stat record file", &self.path, e))?
        {
            debug!("Record file {} does not exist yet", self.path.display());
            return Ok(CustomRegistries::default());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| RegistryError::io("read record file", &self.path, e))?;
        CustomRegistries::parse(&self.path, &content)
    }

    pub async fn save(&self, registries: &CustomRegistries) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RegistryError::io("create record directory", parent, e))?;
        }

        let content = registries.render()?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| RegistryError::io("write record file", &self.path, e))?;

        info!(
            "Saved {} custom registries to {}",
            registries.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
proxy=http://proxy.corp.example:3128
[corp]
registry=https://npm.corp.example/
_auth=dXNlcjpwYXNz
always-auth=true
is-current=true
strict-ssl=false
[mirror]
registry=https://mirror.example/npm/
home=https://mirror.example
";

    #[test]
    fn parse_reads_known_and_unknown_keys() {
        let registries = CustomRegistries::parse(Path::new(".nrmrc"), SAMPLE).unwrap();

        assert_eq!(registries.len(), 2);
        let corp = registries.get("corp").unwrap();
        assert_eq!(corp.auth.as_deref(), Some("dXNlcjpwYXNz"));
        assert_eq!(corp.always_auth, Some(true));
        assert!(corp.is_current);
        assert_eq!(
            corp.extra,
            vec![("strict-ssl".to_string(), "false".to_string())]
        );
        assert_eq!(registries.current().map(|e| e.name.as_str()), Some("corp"));
    }

    #[test]
    fn render_then_parse_keeps_everything() {
        let registries = CustomRegistries::parse(Path::new(".nrmrc"), SAMPLE).unwrap();
        let rendered = registries.render().unwrap();
        let reparsed = CustomRegistries::parse(Path::new(".nrmrc"), &rendered).unwrap();

        assert_eq!(registries, reparsed);
    }

    #[test]
    fn values_are_kept_literally() {
        let content = r#"[corp]
registry=https://npm.corp.example/
cafile=C:\certs\corp.pem
path=C:\npm\cache
ca="quoted value"
"#;
        let registries = CustomRegistries::parse(Path::new(".nrmrc"), content).unwrap();
        let expected = vec![
            ("cafile".to_string(), r"C:\certs\corp.pem".to_string()),
            ("path".to_string(), r"C:\npm\cache".to_string()),
            ("ca".to_string(), r#""quoted value""#.to_string()),
        ];
        assert_eq!(registries.get("corp").unwrap().extra, expected);

        let rendered = registries.render().unwrap();
        assert!(rendered.contains(r"path=C:\npm\cache"));
        assert!(rendered.contains(r#"ca="quoted value""#));
        let reparsed = CustomRegistries::parse(Path::new(".nrmrc"), &rendered).unwrap();
        assert_eq!(reparsed.get("corp").unwrap().extra, expected);
    }

    #[test]
    fn section_without_registry_is_skipped_and_kept() {
        let content = "[corp]\nregistry=https://npm.corp.example/\n[draft]\nhome=https://draft.example\n";
        let registries = CustomRegistries::parse(Path::new(".nrmrc"), content).unwrap();

        assert_eq!(registries.len(), 1);
        assert!(registries.contains("corp"));
        assert!(!registries.contains("draft"));
        assert_eq!(registries.incomplete_sections().collect::<Vec<_>>(), vec!["draft"]);

        let rendered = registries.render().unwrap();
        assert!(rendered.contains("[draft]"));
        assert!(rendered.contains("home=https://draft.example"));
        let reparsed = CustomRegistries::parse(Path::new(".nrmrc"), &rendered).unwrap();
        assert_eq!(registries, reparsed);
    }

    #[test]
    fn inserting_over_incomplete_section_replaces_it() {
        let mut registries =
            CustomRegistries::parse(Path::new(".nrmrc"), "[draft]\nhome=x\n").unwrap();
        registries.insert(RegistryEntry::new("draft", "https://draft.example/"));

        assert_eq!(registries.incomplete_sections().count(), 0);
        assert_eq!(registries.get("draft").unwrap().registry, "https://draft.example/");
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join(".nrmrc"));

        let registries = store.load().await.unwrap();
        assert!(registries.is_empty());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("nested").join(".nrmrc"));

        let mut registries = CustomRegistries::default();
        registries.insert(RegistryEntry::new("local", "http://localhost:4873"));
        store.save(&registries).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.get("local").unwrap().registry, "http://localhost:4873/");
    }
}
