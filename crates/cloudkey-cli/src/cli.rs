use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Output format for `cloudkey list`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListFormat {
    #[default]
    Table,
    /// Table with the account and ARN of every profile
    Wide,
    Json,
}

impl ListFormat {
    /// Whether the profiles need an identity lookup
    #[allow(dead_code)]
    pub fn needs_identity(self) -> bool {
        matches!(self, ListFormat::Wide | ListFormat::Json)
    }
}

/// Output format for `cloudkey version`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VersionFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Parser)]
#[command(name = "cloudkey")]
#[command(version, about = "cloudkey - AWS credential profiles and access key rotation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.config/cloudkey/config.toml)
    #[arg(long, global = true, env = "CLOUDKEY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rotate the access key behind a profile
    Rotate(RotateArgs),

    /// List credential profiles
    List(ListArgs),

    /// Print build information
    Version(VersionArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Credentials file profile to rotate (defaults to the current profile)
    #[arg(short, long)]
    pub profile: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: ListFormat,

    /// Only show profiles from this source (env, file)
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Print just the version number
    #[arg(short, long)]
    pub short: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: VersionFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rotate_profile() {
        let cli = Cli::try_parse_from(["cloudkey", "rotate", "-p", "staging"]).unwrap();
        match cli.command {
            Commands::Rotate(args) => assert_eq!(args.profile.as_deref(), Some("staging")),
            _ => panic!("expected rotate"),
        }
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["cloudkey", "list"]).unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.output, ListFormat::Table);
                assert!(args.source.is_none());
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_parse_list_wide_with_global_flags() {
        let cli = Cli::try_parse_from([
            "cloudkey", "list", "-o", "wide", "--source", "file", "-v", "--config", "/tmp/c.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        match cli.command {
            Commands::List(args) => {
                assert!(args.output.needs_identity());
                assert_eq!(args.source.as_deref(), Some("file"));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_parse_version_yaml() {
        let cli = Cli::try_parse_from(["cloudkey", "version", "-s", "-o", "yaml"]).unwrap();
        match cli.command {
            Commands::Version(args) => {
                assert!(args.short);
                assert_eq!(args.output, VersionFormat::Yaml);
            }
            _ => panic!("expected version"),
        }
    }

    #[test]
    fn test_reject_unknown_list_format() {
        assert!(Cli::try_parse_from(["cloudkey", "list", "-o", "csv"]).is_err());
    }
}
