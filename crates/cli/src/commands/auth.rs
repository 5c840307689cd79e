//! Handlers that attach credentials and metadata to a custom registry.

use eyre::Result;
use regswitch_registry::{AuthRequest, RegistryManager};

use super::lenient;

pub async fn handle_set_auth_command(
    name: String,
    request: AuthRequest,
    manager: &RegistryManager,
) -> Result<()> {
    if lenient(manager.set_auth(&name, &request).await)?.is_some() {
        println!("✅ Set authorize info to registry '{}'", name);
    }
    Ok(())
}

pub async fn handle_set_email_command(
    name: String,
    email: String,
    manager: &RegistryManager,
) -> Result<()> {
    if lenient(manager.set_email(&name, &email).await)?.is_some() {
        println!("✅ Set email to registry '{}'", name);
    }
    Ok(())
}

pub async fn handle_set_hosted_repo_command(
    name: String,
    repository: String,
    manager: &RegistryManager,
) -> Result<()> {
    if lenient(manager.set_repository(&name, &repository).await)?.is_some() {
        println!("✅ Set repository to registry '{}'", name);
    }
    Ok(())
}
