use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::HumanBytes;
use log::{debug, error, info};

use sweep_dups::cli::{CleanArgs, Command, LargeArgs, ScanArgs, TrashArgs};
use sweep_dups::logging;
use sweep_dups::signal::EXIT_CODE_INTERRUPTED;
use sweep_dups::{
    Cancellation, Cli, Config, SweepError, find_duplicates, find_large_files, format_human_elapsed,
    handle_json, print_results, remove, scan, staging_usage,
};

fn report_removal(report: &sweep_dups::RemovalReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("{}", report.summary().green());
    for failure in &report.failures {
        println!("  {} {}: {}", "failed".red(), failure.path.display(), failure.reason);
    }
    Ok(())
}

fn run_scan(args: ScanArgs, config: &Config, cancel: &Cancellation) -> Result<()> {
    let path = args.path.unwrap_or_else(|| config.scan.default_root.clone());
    // Convert to absolute path for better error messages
    let absolute_path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    if !absolute_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", absolute_path.display());
    }

    let mut options = config.scan_options();
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if let Some(min_size) = args.min_size {
        options.min_size = min_size;
    }
    let keep = args.keep.unwrap_or(config.keep);

    let outcome = scan(&absolute_path, &options, cancel)?;
    let grouped = find_duplicates(outcome.files, &config.hashing, keep, cancel)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&grouped.groups)?);
    } else {
        print_results(&grouped.groups, &absolute_path);
    }

    if args.clean {
        let selected: Vec<PathBuf> = grouped
            .groups
            .iter()
            .flat_map(|g| g.selected_paths().map(|p| p.to_path_buf()))
            .collect();
        if selected.is_empty() {
            info!("Nothing to clean");
        } else {
            let report = remove(&selected, &config.trash.dir)?;
            report_removal(&report, args.json)?;
        }
    }
    Ok(())
}

fn run_clean(args: CleanArgs, config: &Config) -> Result<()> {
    let trash_dir = args.trash.trash_dir.unwrap_or_else(|| config.trash.dir.clone());
    let report = remove(&args.files, &trash_dir)?;
    report_removal(&report, args.json)
}

fn run_large(args: LargeArgs, config: &Config, cancel: &Cancellation) -> Result<()> {
    let roots = if args.roots.is_empty() {
        config.large_files.roots.clone()
    } else {
        args.roots
    };
    let mut options = config.large_files.options;
    if let Some(mb) = args.threshold_mb {
        options = options.with_threshold_mb(mb);
    }
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if let Some(limit) = args.limit {
        options.limit = limit;
    }

    let files = find_large_files(&roots, &options, cancel)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else if files.is_empty() {
        println!("{}", "No large files found!".green());
    } else {
        for file in &files {
            println!(
                "{:>10}  {:<8}  {}",
                HumanBytes(file.size).to_string().yellow(),
                format!("{:?}", file.kind).to_lowercase(),
                file.path.display()
            );
        }
    }
    Ok(())
}

fn run_trash_size(args: TrashArgs, config: &Config) -> Result<()> {
    let trash_dir = args.trash_dir.unwrap_or_else(|| config.trash.dir.clone());
    let usage = staging_usage(&trash_dir)?;
    println!(
        "{}: {} entries, {}",
        trash_dir.display(),
        usage.entries,
        HumanBytes(usage.bytes)
    );
    Ok(())
}

fn run_request(json: Option<String>, config: &Config, cancel: &Cancellation) -> Result<()> {
    let body = match json {
        Some(body) => body,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            body
        }
    };
    let response = handle_json(&body, config, cancel);
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    logging::init(
        logging::level_for(cli.verbose, cli.quiet),
        cli.log_file.as_deref(),
    )?;

    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    debug!("Command line arguments: {:?}", cli);

    let config = Config::load(cli.config.as_deref())?;
    let cancel = Cancellation::install()?;

    let result = match cli.command {
        Command::Scan(args) => run_scan(args, &config, &cancel),
        Command::Clean(args) => run_clean(args, &config),
        Command::Large(args) => run_large(args, &config, &cancel),
        Command::TrashSize(args) => run_trash_size(args, &config),
        Command::Request { json } => run_request(json, &config, &cancel),
    };

    if let Err(e) = &result {
        if matches!(e.downcast_ref::<SweepError>(), Some(SweepError::Cancelled)) {
            error!("Interrupted after {}", format_human_elapsed(start_time.elapsed()));
            std::process::exit(EXIT_CODE_INTERRUPTED);
        }
    }
    result?;

    info!(
        "Program completed successfully in {}",
        format_human_elapsed(start_time.elapsed())
    );
    Ok(())
}
