//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{EventsCommand, FileCommand, LimitCommand, PrintStructureCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Inspect EventIO files
#[derive(Debug, Parser, Clone)]
#[command(name = "eventio")]
#[command(author = "eventio contributors")]
#[command(version = "0.8.2")]
#[command(about = "Read-only inspection of EventIO files (sim_telarray, CORSIKA IACT)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to reader configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the object tree of a file
    PrintStructure(PrintStructureCommand),

    /// Print per-type statistics of the objects in a file
    PrintObjectInformation(FileCommand),

    /// Print the recorded simulation history
    History(FileCommand),

    /// List the assembled array events
    Events(EventsCommand),

    /// List the MC events of a sim_telarray file, triggered or not
    McEvents(LimitCommand),

    /// List the showers of a CORSIKA IACT file
    IactEvents(LimitCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_print_structure() {
        let cli = Cli::try_parse_from(["eventio", "print-structure", "run.simtel.gz", "--max-depth", "1"])
            .unwrap();
        match cli.command {
            Command::PrintStructure(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("run.simtel.gz"));
                assert_eq!(cmd.max_depth, Some(1));
            }
            other => panic!("Expected PrintStructure, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["eventio", "history", "run.simtel", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::History(_)));
    }

    #[test]
    fn test_parse_events_with_telescopes() {
        let cli = Cli::try_parse_from([
            "eventio",
            "events",
            "run.simtel",
            "--telescopes",
            "1,2,105",
            "--skip-calibration",
            "--limit",
            "3",
        ])
        .unwrap();
        match cli.command {
            Command::Events(cmd) => {
                assert_eq!(cmd.telescopes, Some(vec![1, 2, 105]));
                assert!(cmd.skip_calibration);
                assert_eq!(cmd.limit, Some(3));
            }
            other => panic!("Expected Events, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_argument_fails() {
        assert!(Cli::try_parse_from(["eventio", "events"]).is_err());
    }

    #[test]
    fn test_parse_iact_events() {
        let cli = Cli::try_parse_from(["eventio", "iact-events", "shower.dat", "--limit", "2", "--json"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Command::IactEvents(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("shower.dat"));
                assert_eq!(cmd.limit, Some(2));
            }
            other => panic!("Expected IactEvents, got {:?}", other),
        }
    }
}
