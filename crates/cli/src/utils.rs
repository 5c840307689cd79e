//! Output formatting and browser helpers shared by the command handlers.

use eyre::{Result, WrapErr};
use regswitch_registry::RegistryEntry;
use tokio::process::Command;

/// Marker shown in front of the registry npm is using.
pub fn current_marker(registry: &str, live: &str) -> &'static str {
    if registry == live { "* " } else { "  " }
}

/// Column width for a list of registry names.
pub fn name_width<'a>(names: impl IntoIterator<Item = &'a str>) -> usize {
    names.into_iter().map(str::len).max().unwrap_or(0) + 3
}

/// ` ---- ` filler between a name and its value, at least one dash wide.
pub fn dashes(name: &str, width: usize) -> String {
    let count = width.saturating_sub(name.len()).max(1);
    format!(" {} ", "-".repeat(count))
}

pub fn format_row(prefix: &str, name: &str, width: usize, value: &str) -> String {
    format!("{}{}{}{}", prefix, name, dashes(name, width), value)
}

/// One `ls` line per registry, the live one marked with `*`.
pub fn registry_rows(entries: &[RegistryEntry], live: &str) -> Vec<String> {
    let width = name_width(entries.iter().map(|e| e.name.as_str()));
    entries
        .iter()
        .map(|entry| {
            format_row(
                current_marker(&entry.registry, live),
                &entry.name,
                width,
                &entry.registry,
            )
        })
        .collect()
}

/// Open `url` with `browser`, or with the platform's default opener.
pub async fn open_url(url: &str, browser: Option<&str>) -> Result<()> {
    let mut command = opener(url, browser);
    tracing::debug!("Opening {} with {:?}", url, command.as_std());

    let status = command
        .status()
        .await
        .wrap_err_with(|| format!("Failed to launch a browser for {}", url))?;

    if !status.success() {
        return Err(eyre::eyre!("Browser exited with {} while opening {}", status, url));
    }
    Ok(())
}

fn opener(url: &str, browser: Option<&str>) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        if let Some(browser) = browser {
            command.args(["-a", browser]);
        }
        command.arg(url);
        return command;
    }

    if let Some(browser) = browser {
        let mut command = Command::new(browser);
        command.arg(url);
        return command;
    }

    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_pad_to_width() {
        assert_eq!(dashes("npm", 8), " ----- ");
        assert_eq!(dashes("npmMirror", 8), " - ");
    }

    #[test]
    fn rows_mark_the_live_registry() {
        let entries = vec![
            RegistryEntry::new("npm", "https://registry.npmjs.org/"),
            RegistryEntry::new("local", "http://localhost:4873/"),
        ];

        let rows = registry_rows(&entries, "http://localhost:4873/");

        assert_eq!(
            rows,
            vec![
                "  npm ----- https://registry.npmjs.org/",
                "* local --- http://localhost:4873/",
            ]
        );
    }
}
