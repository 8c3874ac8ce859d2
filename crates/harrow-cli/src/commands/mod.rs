//! CLI commands and argument parsing.

pub mod run;
pub mod validate;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Harrow - removes old container image tags according to retention policies
#[derive(Parser, Debug)]
#[command(name = "harrow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the cleanup configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Log the configuration, fetched tags and deletion responses
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Docker Engine address (unix:// or tcp://)
    #[arg(long, env = "DOCKER_HOST", value_name = "URI")]
    pub docker_host: Option<String>,

    /// Docker request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub timeout: u64,

    /// Runs the cleanup when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Validate the configuration without contacting Docker
    Validate,

    /// Print version information
    Version,
}

/// Rewrites the single-dash `-config` spelling into `--config`.
///
/// Without this, clap reads `-config` as `-c onfig`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(|arg| {
            let arg = arg.into();
            match arg.to_str() {
                Some("-config") => OsString::from("--config"),
                Some(s) if s.starts_with("-config=") => OsString::from(format!("-{s}")),
                _ => arg,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["harrow"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(!cli.verbose);
        assert!(!cli.dry_run);
        assert_eq!(cli.timeout, 120);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "harrow",
            "-c",
            "/etc/harrow/cleanup.json",
            "--verbose",
            "--dry-run",
            "--docker-host",
            "tcp://10.0.0.5:2375",
            "--timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/harrow/cleanup.json"));
        assert!(cli.verbose);
        assert!(cli.dry_run);
        assert_eq!(cli.docker_host.as_deref(), Some("tcp://10.0.0.5:2375"));
        assert_eq!(cli.timeout, 30);
    }

    #[test]
    fn test_single_dash_config() {
        let cli = Cli::try_parse_from(normalize_args(["harrow", "-config", "x.json"])).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.json"));

        let cli = Cli::try_parse_from(normalize_args(["harrow", "-v", "-config=x.json"])).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.json"));
        assert!(cli.verbose);

        let cli =
            Cli::try_parse_from(normalize_args(["harrow", "validate", "-config", "x.json"])).unwrap();
        assert_eq!(cli.command, Some(Commands::Validate));
        assert_eq!(cli.config, PathBuf::from("x.json"));
    }

    #[test]
    fn test_normalize_keeps_other_spellings() {
        let input = ["harrow", "-c", "a.json", "--config=b.json", "x.json"];
        let expected: Vec<OsString> = input.iter().map(OsString::from).collect();
        assert_eq!(normalize_args(input), expected);
    }

    #[test]
    fn test_validate_accepts_global_config() {
        let cli = Cli::try_parse_from(["harrow", "validate", "--config", "other.json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Validate));
        assert_eq!(cli.config, PathBuf::from("other.json"));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        assert!(Cli::try_parse_from(["harrow", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["harrow", "prune"]).is_err());
    }
}
