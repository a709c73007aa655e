//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// shmgr - versioned shell library loader
///
/// Resolves `alias:version` requests to shell library source, served from a
/// local cache and filled from installed providers. Use it as
/// `eval "$(shmgr load foo:1.2)"`.
#[derive(Parser, Debug)]
#[command(name = "shmgr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SHMGR_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the source of the requested libraries
    Load(LoadArgs),

    /// List installed and cached libraries
    List(ListArgs),

    /// Manage the library cache
    Cache(CacheArgs),
}

/// Arguments for the load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Library requests, e.g. `foo:1` or `bar:2.3.1`
    #[arg(required = true, value_name = "ALIAS:VERSION")]
    pub libraries: Vec<String>,

    /// Cache root (overrides SHMGR_CACHE_DIR and the config file)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show this alias
    pub alias: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Cache root (overrides SHMGR_CACHE_DIR and the config file)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,

    /// Cache root (overrides SHMGR_CACHE_DIR and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the cache root
    Path,

    /// List cached libraries
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove cached libraries so the next load refetches them
    Clear {
        /// Only clear this alias
        alias: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_load() {
        let cli = Cli::parse_from(["shmgr", "load", "foo:1", "bar:2.3"]);
        match cli.command {
            Commands::Load(args) => {
                assert_eq!(args.libraries, vec!["foo:1", "bar:2.3"]);
                assert!(args.cache_dir.is_none());
            }
            _ => panic!("expected Load command"),
        }
    }

    #[test]
    fn cli_load_requires_a_library() {
        assert!(Cli::try_parse_from(["shmgr", "load"]).is_err());
    }

    #[test]
    fn cli_parses_load_cache_dir() {
        let cli = Cli::parse_from(["shmgr", "load", "--cache-dir", "/tmp/c", "foo:1"]);
        match cli.command {
            Commands::Load(args) => assert_eq!(args.cache_dir, Some(PathBuf::from("/tmp/c"))),
            _ => panic!("expected Load command"),
        }
    }

    #[test]
    fn cli_parses_list() {
        let cli = Cli::parse_from(["shmgr", "list", "foo", "--format", "json"]);
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.alias.as_deref(), Some("foo"));
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn cli_parses_cache_clear() {
        let cli = Cli::parse_from(["shmgr", "cache", "clear", "foo", "--yes"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { alias, yes },
                ..
            }) => {
                assert_eq!(alias.as_deref(), Some("foo"));
                assert!(yes);
            }
            _ => panic!("expected cache clear"),
        }
    }

    #[test]
    fn cli_parses_cache_path_with_dir() {
        let cli = Cli::parse_from(["shmgr", "cache", "path", "--cache-dir", "/c"]);
        match cli.command {
            Commands::Cache(args) => {
                assert!(matches!(args.action, CacheAction::Path));
                assert_eq!(args.cache_dir, Some(PathBuf::from("/c")));
            }
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["shmgr", "list"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["shmgr", "-v", "list"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["shmgr", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }
}
