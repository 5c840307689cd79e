use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[clap(
    name = "regswitch",
    version,
    about = "Switch npm between registries",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Enable debug logging
    #[clap(short, long, global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the process was started with no arguments at all.
    pub fn is_bare_invocation<I>(args: I) -> bool
    where
        I: IntoIterator,
    {
        args.into_iter().nth(1).is_none()
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List all the registries
    Ls,
    /// Show current registry name
    Current,
    /// Change registry to registry
    Use {
        /// Registry name
        name: String,
    },
    /// Add one custom registry
    Add {
        /// Registry name
        name: String,
        /// Registry URL
        url: String,
        /// Homepage URL
        home: Option<String>,
    },
    /// Set authorize information for a custom registry with a base64 encoded string or username and password
    SetAuth {
        /// Registry name
        name: String,
        /// Base64 encoded auth value
        value: Option<String>,
        /// Set always-auth
        #[clap(short = 'a', long)]
        always_auth: bool,
        /// Your user name for this registry
        #[clap(short, long)]
        username: Option<String>,
        /// Your password for this registry
        #[clap(short, long)]
        password: Option<String>,
    },
    /// Set email for a custom registry
    SetEmail {
        /// Registry name
        name: String,
        /// Email address
        value: String,
    },
    /// Set hosted npm repository for a custom registry to publish packages
    SetHostedRepo {
        /// Registry name
        name: String,
        /// Repository URL
        value: String,
    },
    /// Delete one custom registry
    Del {
        /// Registry name
        name: String,
    },
    /// Open the homepage of registry with optional browser
    Home {
        /// Registry name
        name: String,
        /// Browser to open the homepage with
        browser: Option<String>,
    },
    /// Publish package to current registry if current registry is a custom registry.
    /// If you're not using a custom registry, this runs npm publish directly
    Publish {
        /// Tarball or folder to publish
        target: Option<PathBuf>,
        /// Add tag
        #[clap(short, long)]
        tag: Option<String>,
        /// Set access
        #[clap(short, long, value_parser = ["public", "restricted"])]
        access: Option<String>,
        /// Set one-time password
        #[clap(short, long)]
        otp: Option<String>,
        /// Report what would be published without publishing
        #[clap(long)]
        dry_run: bool,
    },
    /// Show response time for specific or all registries
    Test {
        /// Registry name
        name: Option<String>,
    },
    /// Manage configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g. record.fallback)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[clap(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_is_detected() {
        assert!(Cli::is_bare_invocation(["regswitch"]));
        assert!(!Cli::is_bare_invocation(["regswitch", "ls"]));
        assert!(!Cli::is_bare_invocation(["regswitch", "-v"]));
    }

    #[test]
    fn set_auth_flags_parse() {
        let cli = Cli::parse_from([
            "regswitch", "set-auth", "corp", "-a", "-u", "alice", "-p", "secret",
        ]);
        match cli.command {
            Commands::SetAuth {
                name,
                value,
                always_auth,
                username,
                password,
            } => {
                assert_eq!(name, "corp");
                assert_eq!(value, None);
                assert!(always_auth);
                assert_eq!(username.as_deref(), Some("alice"));
                assert_eq!(password.as_deref(), Some("secret"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn publish_rejects_unknown_access() {
        assert!(Cli::try_parse_from(["regswitch", "publish", "--access", "secret"]).is_err());
    }

    #[test]
    fn no_arguments_prints_help() {
        let err = Cli::try_parse_from(["regswitch"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }
}
