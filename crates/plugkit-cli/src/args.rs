use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "plugkit")]
#[command(about = "Validate, scaffold and analyze Claude Code plugin marketplaces")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory holding config.toml (default: ~/.plugkit)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count commands, agents and hooks in a .claude directory
    Analyze {
        /// Directory to analyze (uses <path>/.claude when present)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate a marketplace.json file
    ValidateMarketplace {
        /// Path to marketplace.json
        file: PathBuf,
    },

    /// Validate a plugin.json file
    ValidatePlugin {
        /// Path to plugin.json
        file: PathBuf,
    },

    /// Scaffold a marketplace with one sample plugin
    Generate {
        /// Directory to create the marketplace in
        path: PathBuf,

        /// Marketplace name
        name: String,

        /// Owner name written to marketplace.json
        #[arg(long)]
        owner: Option<String>,

        /// Author name written to the sample plugin.json
        #[arg(long)]
        author: Option<String>,
    },

    /// Audit plugins against best practices
    Check {
        /// Directory containing plugin folders
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Audit a single plugin by folder name
        #[arg(short, long)]
        plugin: Option<String>,
    },

    /// Rewrite plugin.json skills arrays to match skills/ directories
    SyncSkills {
        /// Directory containing plugin folders
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Report changes without writing
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., generator.owner_name)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Value
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Write a commented default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_defaults_to_current_dir() {
        let cli = Cli::parse_from(["plugkit", "analyze"]);
        match cli.command {
            Some(Commands::Analyze { path }) => assert_eq!(path, PathBuf::from(".")),
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn generate_takes_path_and_name() {
        let cli = Cli::parse_from(["plugkit", "generate", "/tmp/mp", "Test Market"]);
        match cli.command {
            Some(Commands::Generate { path, name, .. }) => {
                assert_eq!(path, PathBuf::from("/tmp/mp"));
                assert_eq!(name, "Test Market");
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn kebab_case_subcommands() {
        assert!(Cli::try_parse_from(["plugkit", "validate-marketplace", "m.json"]).is_ok());
        assert!(Cli::try_parse_from(["plugkit", "validate-plugin", "p.json"]).is_ok());
        assert!(Cli::try_parse_from(["plugkit", "sync-skills", "--dry-run"]).is_ok());
    }
}
