//! reportpatch - CLI entry point

use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use reportpatch::cli::{Cli, Command};
use reportpatch::config::Config;
use reportpatch::diff::{line_stats, unified_diff};
use reportpatch::patchset::concat_patches;
use reportpatch::{Document, PatchSet, PatchSetLoader, Probe, apply_patches, preview_patches, read_document};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > WARN, so stdout only carries status lines
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

    debug!(?level, "Logging initialized");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(path = %config.target.display(), "reportpatch starting");

    let loader = PatchSetLoader::from_config(&config).context("Failed to load patch sets")?;

    match cli.command {
        Command::List => cmd_list(&loader),
        Command::Show { set } => cmd_show(&loader, &set),
        Command::Apply {
            sets,
            target,
            dry_run,
            diff,
        } => {
            let target = target.unwrap_or_else(|| config.target.clone());
            cmd_apply(&loader, &sets, &target, dry_run, diff)
        }
        Command::Check { set, target } => {
            let target = target.unwrap_or_else(|| config.target.clone());
            cmd_check(&loader, &set, &target)
        }
    }
}

fn cmd_list(loader: &PatchSetLoader) -> Result<()> {
    if loader.is_empty() {
        println!("No patch sets found");
        return Ok(());
    }
    for set in loader.list() {
        println!(
            "{:<22} {:>2} patches  {:<8}  {}",
            set.name.cyan(),
            set.patches.len(),
            set.source.to_string().dimmed(),
            set.description
        );
    }
    Ok(())
}

fn cmd_show(loader: &PatchSetLoader, name: &str) -> Result<()> {
    let set = loader.resolve(name)?;
    println!("{} ({})", set.name.cyan(), set.source.to_string().dimmed());
    if !set.description.is_empty() {
        println!("  {}", set.description);
    }
    for (i, patch) in set.patches.iter().enumerate() {
        println!(
            "{:>3}. {} [{}, {}]",
            i + 1,
            patch.name.yellow(),
            patch.mode,
            patch.anchor.kind()
        );
        println!("       anchor: {}", patch.anchor.describe());
        if let Some(count) = patch.count {
            println!("       count: first {}", count);
        }
        if let Some(guard) = &patch.unless_contains {
            println!("       unless contains: {:?}", guard);
        }
        if let Some(pre) = &patch.precondition {
            println!("       expects: {}", pre.dimmed());
        }
    }
    Ok(())
}

fn resolve_sets(loader: &PatchSetLoader, names: &[String]) -> Result<Vec<PatchSet>> {
    names.iter().map(|name| loader.resolve(name)).collect()
}

fn cmd_apply(loader: &PatchSetLoader, names: &[String], target: &Path, dry_run: bool, diff: bool) -> Result<()> {
    debug!(?names, ?target, dry_run, diff, "cmd_apply: called");
    let sets = resolve_sets(loader, names)?;
    let patches = concat_patches(&sets);

    if dry_run {
        let preview = preview_patches(target, &patches)?;
        if diff {
            print!("{}", unified_diff(&preview.original, &preview.patched, &display_name(target)));
        }
        let applied = preview.reports.iter().filter(|r| r.outcome.is_applied()).count();
        let (ins, del) = line_stats(&preview.original, &preview.patched);
        println!(
            "{} {}: {} applied, {} skipped, {} {} (nothing written)",
            "dry run".yellow(),
            target.display(),
            applied,
            preview.reports.len() - applied,
            format!("+{}", ins).green(),
            format!("-{}", del).red()
        );
        return Ok(());
    }

    let result = apply_patches(target, &patches)?;
    if diff {
        print!("{}", unified_diff(&result.original, &result.patched, &display_name(target)));
    }
    for set in &sets {
        let message = set.message.clone().unwrap_or_else(|| format!("Applied {}", set.name));
        println!("{} {}", "✓".green(), message);
    }
    if result.written {
        println!(
            "  {}: {} applied, {} skipped ({} -> {} bytes)",
            result.path.display(),
            result.applied_count(),
            result.skipped_count(),
            result.bytes_before,
            result.bytes_after
        );
    } else {
        println!("  {}: unchanged", result.path.display());
    }
    Ok(())
}

fn cmd_check(loader: &PatchSetLoader, name: &str, target: &Path) -> Result<()> {
    debug!(%name, ?target, "cmd_check: called");
    let set = loader.resolve(name)?;
    let mut working: Document = read_document(target)?;
    let mut missing = 0usize;

    for patch in &set.patches {
        let probe = working.probe(patch);
        let status = match probe {
            Probe::Present { matches } => format!("found x{}", matches).green(),
            Probe::Guarded => "guarded".yellow(),
            Probe::Absent if patch.is_required() => {
                missing += 1;
                "MISSING".red()
            }
            Probe::Absent => "absent".dimmed(),
        };
        println!("{:<10} {} [{}]", status, patch.name, patch.mode);

        // Later patches expect the shape earlier ones leave behind
        if matches!(probe, Probe::Present { .. }) {
            working.apply(patch)?;
        }
    }

    if missing > 0 {
        return Err(eyre!(
            "{} required anchor(s) missing for '{}' in {}",
            missing,
            set.name,
            target.display()
        ));
    }
    println!("{} {} can be applied to {}", "✓".green(), set.name, target.display());
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.to_string_lossy().trim_start_matches("./").to_string()
}
