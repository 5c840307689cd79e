use std::io::{self, BufRead, Write};
use std::path::Path;

use eyre::{Result, WrapErr};

use crate::cli::ConfigCommands;
use crate::config::Config;

/// Handle `config set/get/show/reset` against the file at `config_path`.
pub async fn handle_config_command(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(config_path).await?;
            config
                .set_value(&key, &value)
                .wrap_err_with(|| format!("Cannot set '{}'", key))?;
            config.save(config_path).await?;
            println!("✅ {} = {}", key, value);
        }
        ConfigCommands::Get { key } => {
            let value = Config::load(config_path)
                .await?
                .get_value(&key)
                .wrap_err_with(|| format!("Cannot read '{}'", key))?;
            println!("{}", value);
        }
        ConfigCommands::Show => {
            let config = Config::load(config_path).await?;
            println!("📄 {}", config_path.display());
            println!("{}", config.show_all());
        }
        ConfigCommands::Reset { force } => {
            if !force && !confirm(&mut io::stdin().lock(), "Reset regswitch configuration?")? {
                println!("❌ Cancelled");
                return Ok(());
            }
            Config::reset(config_path).await?;
            println!("✅ Configuration reset to defaults");
        }
    }
    Ok(())
}

fn confirm(input: &mut impl BufRead, question: &str) -> Result<bool> {
    print!("{} (y/N): ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn only_yes_confirms() {
        assert!(confirm(&mut "y\n".as_bytes(), "?").unwrap());
        assert!(confirm(&mut "YES\n".as_bytes(), "?").unwrap());
        assert!(!confirm(&mut "\n".as_bytes(), "?").unwrap());
        assert!(!confirm(&mut "yolo\n".as_bytes(), "?").unwrap());
    }

    #[tokio::test]
    async fn set_writes_through_to_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        handle_config_command(
            ConfigCommands::Set {
                key: "record.fallback".to_string(),
                value: "yarn".to_string(),
            },
            &path,
        )
        .await
        .unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.get_value("record.fallback").unwrap(), "yarn");
    }

    #[tokio::test]
    async fn unknown_key_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let result = handle_config_command(
            ConfigCommands::Set {
                key: "no.such.key".to_string(),
                value: "x".to_string(),
            },
            &path,
        )
        .await;
        assert!(result.is_err());
    }
}
