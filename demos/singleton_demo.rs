//! Races several threads on the process-wide singleton and reports what each
//! of them saw.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use solo::resource::{construction_count, publication_state};
use solo::{get_instance, SingletonResource};
use std::sync::Barrier;
use std::thread;
use tracing::info;

#[derive(Parser)]
#[command(name = "singleton_demo")]
#[command(about = "Race threads on a lazily published singleton", long_about = None)]
struct Cli {
    /// Number of threads racing on first access
    #[arg(short, long, default_value_t = 5)]
    threads: usize,

    /// Calls to `get_instance` made by each thread
    #[arg(short, long, default_value_t = 1)]
    calls: usize,

    /// Print a JSON report instead of plain lines
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ThreadReport {
    thread: usize,
    output: String,
    serial: usize,
    address: usize,
}

#[derive(Serialize)]
struct Report {
    threads: usize,
    calls_per_thread: usize,
    constructions: usize,
    identical: bool,
    state: String,
    results: Vec<ThreadReport>,
}

fn validate(cli: &Cli) -> Result<()> {
    if cli.threads == 0 {
        bail!("--threads must be at least 1");
    }
    if cli.calls == 0 {
        bail!("--calls must be at least 1");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    validate(&cli)?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the log subscriber")?;

    info!(threads = cli.threads, calls = cli.calls, "starting race");

    let barrier = Barrier::new(cli.threads);
    let barrier = &barrier;
    let calls = cli.calls;

    let results = thread::scope(|s| {
        let handles: Vec<_> = (1..=cli.threads)
            .map(|idx| {
                s.spawn(move || {
                    barrier.wait();
                    let mut singleton = get_instance();
                    for _ in 1..calls {
                        singleton = get_instance();
                    }
                    let request = i32::try_from(idx).unwrap_or(i32::MAX);
                    ThreadReport {
                        thread: idx,
                        output: singleton.do_something(request),
                        serial: singleton.serial(),
                        address: singleton as *const SingletonResource as usize,
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow::anyhow!("worker thread panicked")))
            .collect::<Result<Vec<_>>>()
    })?;

    let identical = results.windows(2).all(|w| w[0].address == w[1].address);
    let report = Report {
        threads: cli.threads,
        calls_per_thread: calls,
        constructions: construction_count(),
        identical,
        state: format!("{:?}", publication_state()),
        results,
    };

    if cli.json {
        let rendered = serde_json::to_string_pretty(&report).context("failed to render report")?;
        println!("{rendered}");
    } else {
        for entry in &report.results {
            println!("[thread {}] {} (instance #{})", entry.thread, entry.output, entry.serial);
        }
        println!(
            "constructions: {}, same instance everywhere: {}",
            report.constructions, report.identical
        );
    }

    if report.constructions != 1 || !report.identical {
        bail!("singleton invariant violated");
    }

    Ok(())
}
