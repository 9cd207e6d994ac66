use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use trash_store::prelude::*;

const PROGRAM: &str = "trash-put";

#[derive(Parser, Debug)]
#[command(name = "trash-put", version, about = "Move a file into the trash")]
struct Cli {
    /// Trash directory holding `files/` and `info/`
    #[arg(long, value_name = "DIR", default_value = trash_store::DEFAULT_TRASH_DIR)]
    trash_dir: PathBuf,

    /// Log each step to stderr
    #[arg(short, long)]
    verbose: bool,

    /// File to move into the trash (only the first one is used)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(path) = cli.paths.first() else {
        println!("Usage: {PROGRAM} [--trash-dir DIR] PATH\n\nPlease provide a file.");
        return ExitCode::SUCCESS;
    };
    if cli.paths.len() > 1 {
        eprintln!(
            "{PROGRAM}: only one file at a time; ignoring {} extra argument(s)",
            cli.paths.len() - 1
        );
    }

    match run(&cli.trash_dir, path) {
        Ok(outcome) => {
            if let Some(warning) = outcome.warning() {
                eprintln!("{PROGRAM}: warning: {}", describe_error(warning));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{PROGRAM}: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(trash_dir: &Path, path: &Path) -> Result<DeletionOutcome> {
    let config = TrashConfig::resolve(trash_dir, &RealFileSystem)?;
    config.ensure_layout(&RealFileSystem)?;
    let config = config.canonicalize(&RealFileSystem)?;
    TrashCan::new(config).put(path)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
