use eyre::Result;
use regswitch_registry::RegistryManager;

use super::lenient;
use crate::utils::{open_url, registry_rows};

/// Handle the ls command - list catalog and custom registries
pub async fn handle_list_command(manager: &RegistryManager) -> Result<()> {
    let live = manager.current_url().await?;
    let registries = manager.registries().await?;

    println!();
    for row in registry_rows(&registries, &live) {
        println!("{}", row);
    }
    println!();
    Ok(())
}

/// Handle the current command - print the name of the registry npm uses
pub async fn handle_current_command(manager: &RegistryManager) -> Result<()> {
    match manager.current_name().await? {
        Some(name) => println!("{}", name),
        None => {
            let live = manager.current_url().await?;
            println!("❓ npm uses {}, which is not a known registry", live);
            println!("💡 Use 'regswitch add <name> {}' to name it", live);
        }
    }
    Ok(())
}

pub async fn handle_use_command(name: String, manager: &RegistryManager) -> Result<()> {
    match lenient(manager.use_registry(&name).await)? {
        Some(live) => {
            println!();
            println!("   ✅ Registry has been set to: {}", live);
            println!();
        }
        None => {
            println!();
            println!("   ❌ Not find registry: {}", name);
            println!();
        }
    }
    Ok(())
}

pub async fn handle_add_command(
    name: String,
    url: String,
    home: Option<String>,
    manager: &RegistryManager,
) -> Result<()> {
    if manager.add(&name, &url, home.as_deref()).await? {
        println!("✅ Added registry '{}'", name);
    } else {
        println!("❌ Registry '{}' already exists", name);
        println!("💡 Use 'regswitch del {}' to remove it first", name);
    }
    Ok(())
}

pub async fn handle_del_command(name: String, manager: &RegistryManager) -> Result<()> {
    let Some(fallback) = lenient(manager.delete(&name).await)? else {
        return Ok(());
    };

    if let Some(fallback) = fallback {
        println!("🔄 '{}' was in use, switched to '{}'", name, fallback);
    }
    println!("✅ Deleted registry '{}'", name);
    Ok(())
}

/// Handle the home command - open a registry's homepage
pub async fn handle_home_command(
    name: String,
    browser: Option<String>,
    manager: &RegistryManager,
) -> Result<()> {
    let Some(entry) = lenient(manager.find(&name).await)? else {
        return Ok(());
    };

    match entry.home {
        Some(home) => open_url(&home, browser.as_deref()).await,
        None => {
            tracing::debug!("Registry '{}' has no homepage", name);
            Ok(())
        }
    }
}
