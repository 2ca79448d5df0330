// Takeout Reconcile CLI binary

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::Parser;

use takeout_reconcile::constants::DEFAULT_LOG_FILENAME;
use takeout_reconcile::metadata::exiftool::{self, ExifTool};
use takeout_reconcile::{run_reconcile, RunReport};

#[derive(Parser)]
#[command(name = "takeout-reconcile")]
#[command(about = "Pair photo-backup media with their JSON sidecars and write timestamp-named, tagged copies", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to read from
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Directory to write to
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Run log (appended to on every run)
    #[arg(long, default_value = DEFAULT_LOG_FILENAME)]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_file)?;
    log::info!(
        "Starting run: input={} output={}",
        cli.input_dir.display(),
        cli.output_dir.display()
    );

    let tagger = ExifTool::new();
    if !exiftool::is_available() {
        println!(
            "Warning: exiftool not found at {}; tagging will fail (set TAKEOUT_EXIFTOOL_PATH)",
            tagger.path().display()
        );
        log::warn!("exiftool not available at {}", tagger.path().display());
    }

    let report = run_reconcile(&cli.input_dir, &cli.output_dir, &tagger)
        .with_context(|| format!("Reconcile of {} failed", cli.input_dir.display()))?;

    print_summary(&report, &cli.log_file);
    Ok(())
}

/// Route the `log` facade to the run log file, one `<time> - <LEVEL> - <message>` line per record.
fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Cannot open log file {}", log_file.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .init();

    Ok(())
}

fn print_summary(report: &RunReport, log_file: &Path) {
    println!();
    println!("Reconcile complete:");
    println!("  Media files:      {}", report.media_found);
    println!("  Sidecars:         {}", report.records_found);
    println!("  Pairs:            {}", report.pairs);
    println!("    Tagged:         {}", report.tagged);
    println!("    Copied:         {}", report.copied);
    println!("    Recovered:      {}", report.recovered);
    println!("    Failed:         {}", report.failed);
    println!("  Orphan media:     {}", report.orphan_media_copied + report.orphan_media_failed);
    if report.orphan_media_failed > 0 {
        println!("    Copy failed:    {}", report.orphan_media_failed);
    }
    println!("  Orphan sidecars:  {}", report.orphan_records);
    if report.conflicts > 0 {
        println!("  Conflicts:        {}", report.conflicts);
    }
    println!();
    println!("Details in {}", log_file.display());
}
