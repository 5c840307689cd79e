//! Publish command handler.

use std::path::PathBuf;

use eyre::{Result, WrapErr};
use regswitch_registry::{PublishOptions, PublishTarget, Publisher, RegistryManager};
use tracing::info;

pub async fn handle_publish_command(
    target: Option<PathBuf>,
    options: PublishOptions,
    manager: &RegistryManager,
    publisher: &dyn Publisher,
) -> Result<()> {
    info!("Publishing {:?} (tag: {:?}, access: {:?})", target, options.tag, options.access);

    let published = manager
        .publish(publisher, target.as_deref(), &options)
        .await
        .wrap_err("Publish failed")?;

    match published {
        PublishTarget::Repository { name, url } => {
            println!(
                "✅ Current registry '{}' is a custom registry, published to its repository {}",
                name, url
            );
        }
        PublishTarget::Live(url) => {
            println!(
                "✅ Current registry is not a custom registry, published directly to {}",
                url
            );
        }
    }
    Ok(())
}
