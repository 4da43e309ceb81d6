use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;
use usewatch_scan::Config;

#[derive(Parser)]
#[command(name = "usewatch")]
#[command(
    about = "Find imports of sensitive standard library modules across packages",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan package source trees for watched imports
    Scan(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Scan(cfg) => {
            let num_threads = if cfg.jobs > 0 { cfg.jobs } else { rayon::current_num_threads() };
            info!("Running import scan (using {} threads)", num_threads);
            debug!(
                "Config: packages_dir={:?}, src_dir={:?}, output_dir={:?}",
                cfg.packages_dir, cfg.src_dir, cfg.output_dir
            );

            let mut result = usewatch_scan::run_scan(&cfg)?;
            result.check_totals()?;

            let prefix = cfg.results_prefix();
            let written =
                usewatch_scan::save_reports(&mut result, &cfg.output_dir, &prefix, cfg.json)?;
            debug!("Wrote {} report files", written.len());

            let elapsed_ms = start.elapsed().as_millis();

            usewatch_scan::print_summary(&mut stdout, &result)?;
            for path in &written {
                writeln!(stdout, "  {} {}", "→".dimmed(), path.display())?;
            }
            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} files (using {} threads).",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                result.files_scanned.to_string().cyan(),
                num_threads.to_string().cyan()
            )?;
            stdout.flush()?;

            Ok(())
        }
    }
}
