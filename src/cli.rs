use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::duplicates::KeepPolicy;

#[derive(Parser, Debug)]
#[command(name = "sweep-dups")]
#[command(about = "Find duplicate files and move the extra copies to a trash staging directory")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./sweep-dups.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write the log to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Move files into the trash staging directory
    Clean(CleanArgs),
    /// List the largest files under one or more directories
    Large(LargeArgs),
    /// Show how much the trash staging directory holds
    TrashSize(TrashArgs),
    /// Answer a JSON request ({"action": "scan" | "clean", ...}) on stdout
    Request {
        /// Request body; read from stdin when omitted
        json: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan for duplicates (default: from config)
    pub path: Option<PathBuf>,

    /// Deepest directory level to list, the root being level 0
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Skip files of this many bytes or fewer
    #[arg(short, long)]
    pub min_size: Option<u64>,

    /// Which copy of each group stays unselected
    #[arg(short, long, value_enum)]
    pub keep: Option<KeepPolicy>,

    /// Print the groups as JSON instead of a report
    #[arg(long)]
    pub json: bool,

    /// Move every selected copy to the trash staging directory after scanning
    #[arg(long)]
    pub clean: bool,
}

#[derive(Args, Debug)]
pub struct TrashArgs {
    /// Trash staging directory (default: from config)
    #[arg(short, long)]
    pub trash_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Files to move
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub trash: TrashArgs,

    /// Print the move report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LargeArgs {
    /// Directories to search (default: from config)
    pub roots: Vec<PathBuf>,

    /// Report files larger than this many MB
    #[arg(short, long)]
    pub threshold_mb: Option<u64>,

    /// Deepest directory level to list
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Maximum number of files to report
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scan_flags() {
        let cli = Cli::parse_from(["sweep-dups", "-v", "scan", "/tmp", "-d", "2", "--keep", "oldest"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.path, Some(PathBuf::from("/tmp")));
                assert_eq!(args.max_depth, Some(2));
                assert_eq!(args.keep, Some(KeepPolicy::Oldest));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
