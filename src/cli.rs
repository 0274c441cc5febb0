use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// freshbox - set up a new Mac in one guided pass
#[derive(Parser, Debug)]
#[command(name = "freshbox")]
#[command(about = "Interactive setup wizard for a fresh macOS machine")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: build the task list and log every task without
    /// running any command or touching any file.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Treat this directory as the home directory
    #[arg(long, global = true, env = "FRESHBOX_HOME")]
    pub home: Option<PathBuf>,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the installer, interactively or from a saved profile
    Install {
        /// Profile to install from (skips the wizard)
        #[arg(short, long, conflicts_with = "save_profile")]
        profile: Option<PathBuf>,

        /// Save the wizard's final selections to this file
        #[arg(long)]
        save_profile: Option<PathBuf>,
    },
    /// Print the tasks a profile would run
    Plan {
        #[arg(short, long)]
        profile: PathBuf,
    },
    /// Print what is already installed
    Probe,
    /// Validate a profile
    Validate {
        /// Path to the profile to validate
        profile: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs_wizard() {
        let cli = Cli::try_parse_from(["freshbox"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["freshbox", "plan", "-p", "p.json", "--dry-run", "--home", "/tmp/h"])
                .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/h")));
        assert!(matches!(cli.command, Some(Commands::Plan { .. })));
    }

    #[test]
    fn test_profile_and_save_profile_conflict() {
        let result = Cli::try_parse_from([
            "freshbox",
            "install",
            "--profile",
            "a.json",
            "--save-profile",
            "b.json",
        ]);
        assert!(result.is_err());
    }
}
