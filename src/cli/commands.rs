//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Commands that only need a file
#[derive(Debug, Args, Clone)]
pub struct FileCommand {
    /// Path to the EventIO file (plain or gzip compressed)
    pub file: PathBuf,
}

/// Print the object tree
#[derive(Debug, Args, Clone)]
pub struct PrintStructureCommand {
    /// Path to the EventIO file (plain or gzip compressed)
    pub file: PathBuf,

    /// Do not descend below this nesting level
    #[arg(long)]
    pub max_depth: Option<u32>,
}

/// List assembled events
#[derive(Debug, Args, Clone)]
pub struct EventsCommand {
    /// Path to the EventIO file (plain or gzip compressed)
    pub file: PathBuf,

    /// Only keep these telescopes (comma separated ids)
    #[arg(long, value_delimiter = ',', value_parser = parse_telescope_id)]
    pub telescopes: Option<Vec<u32>>,

    /// Skip calibration events
    #[arg(long)]
    pub skip_calibration: bool,

    /// Stop after this many events
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Commands that walk a file's events without filters
#[derive(Debug, Args, Clone)]
pub struct LimitCommand {
    /// Path to the EventIO file (plain or gzip compressed)
    pub file: PathBuf,

    /// Stop after this many events
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Parse a telescope id in the range that fits the type encoding
pub fn parse_telescope_id(s: &str) -> Result<u32, String> {
    let id: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid telescope id: {}", s))?;
    if id > crate::core::registry::MAX_TELESCOPE_ID {
        return Err(format!(
            "Telescope id {} is out of range (0..={})",
            id,
            crate::core::registry::MAX_TELESCOPE_ID
        ));
    }
    Ok(id)
}
