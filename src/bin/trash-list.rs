use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use trash_store::prelude::*;

const PROGRAM: &str = "trash-list";

/// Stale records younger than this may belong to a deletion still in progress.
const STALE_GRACE: Duration = Duration::from_secs(5 * 60);

#[derive(Parser, Debug)]
#[command(name = "trash-list", version, about = "List files in the trash")]
struct Cli {
    /// Trash directory holding `files/` and `info/`
    #[arg(long, value_name = "DIR", default_value = trash_store::DEFAULT_TRASH_DIR)]
    trash_dir: PathBuf,

    /// Remove records whose file never reached the trash
    #[arg(long)]
    prune_stale: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{PROGRAM}: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

/// Lists the trash; returns false when some stale record could not be pruned.
fn run(cli: &Cli) -> Result<bool> {
    let config = TrashConfig::resolve(&cli.trash_dir, &RealFileSystem)?;
    if !RealFileSystem.exists(config.info_dir()) {
        return Ok(true);
    }
    let trash = TrashCan::new(config);
    let mut report = trash.reconcile()?;

    let mut clean = true;
    if cli.prune_stale {
        let outcome = trash.prune_stale(&report, STALE_GRACE);
        for entry in &outcome.pruned {
            eprintln!(
                "{PROGRAM}: removed stale record for {}",
                sanitize_user_path(entry.original_path())
            );
        }
        for (entry, err) in &outcome.failed {
            eprintln!(
                "{PROGRAM}: could not remove stale record for {}: {}",
                sanitize_user_path(entry.original_path()),
                describe_error(err)
            );
        }
        clean = outcome.failed.is_empty();
        report.stale.retain(|entry| {
            !outcome
                .pruned
                .iter()
                .any(|p| p.identity() == entry.identity())
        });
    }

    let mut rows: Vec<(&Entry, bool)> = report
        .live
        .iter()
        .map(|entry| (entry, false))
        .chain(report.stale.iter().map(|entry| (entry, true)))
        .collect();
    rows.sort_by(|(a, _), (b, _)| {
        a.deleted_at()
            .cmp(&b.deleted_at())
            .then_with(|| a.original_path().cmp(b.original_path()))
    });

    for (entry, stale) in rows {
        let size = entry.size().map(print_size).unwrap_or_else(|| "-".to_string());
        let marker = if stale { " [stale]" } else { "" };
        println!(
            "{} {:>8} {}{}",
            format_deleted_at(entry.deleted_at()),
            size,
            sanitize_user_path(entry.original_path()),
            marker
        );
    }

    for (path, err) in &report.invalid {
        eprintln!(
            "{PROGRAM}: skipping {}: {}",
            sanitize_user_path(path),
            describe_error(err)
        );
    }
    for path in &report.untracked {
        eprintln!(
            "{PROGRAM}: holding file without a record: {}",
            sanitize_user_path(path)
        );
    }
    Ok(clean)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
