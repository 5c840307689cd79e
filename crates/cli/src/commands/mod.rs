pub mod auth;
pub mod config;
pub mod latency;
pub mod publish;
pub mod registry;

pub use auth::{handle_set_auth_command, handle_set_email_command, handle_set_hosted_repo_command};
pub use config::handle_config_command;
pub use latency::handle_test_command;
pub use publish::handle_publish_command;
pub use registry::{
    handle_add_command, handle_current_command, handle_del_command, handle_home_command,
    handle_list_command, handle_use_command,
};

/// Unknown registry names are a quiet no-op: map `NotFound` to `None`.
pub(crate) fn lenient<T>(result: regswitch_registry::Result<T>) -> eyre::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            tracing::debug!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
