use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "solo workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the loom model tests (builds with `--cfg loom`)
    Loom {
        /// Only run tests whose name contains this string
        filter: Option<String>,

        /// Bound on thread preemptions explored per model
        #[arg(long, default_value_t = 3)]
        preemptions: usize,
    },
    /// Run the publication benchmarks and summarize them
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

const BENCH_NAME: &str = "publication_benchmark";
const LOOM_TEST: &str = "loom_publication";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Loom { filter, preemptions } => run_loom(filter.as_deref(), preemptions)?,
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_loom(filter: Option<&str>, preemptions: usize) -> Result<()> {
    println!("Running loom models (max preemptions: {preemptions})...");
    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.env("RUSTFLAGS", "--cfg loom")
        .env("LOOM_MAX_PREEMPTIONS", preemptions.to_string())
        .args(["test", "--release", "--test", LOOM_TEST]);

    if let Some(filter) = filter {
        cmd.arg("--").arg(filter);
    }

    let status = cmd.status().context("failed to spawn cargo for loom tests")?;
    if !status.success() {
        anyhow::bail!("loom models failed");
    }

    println!("Loom models passed in {:.2?}", start.elapsed());
    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Running publication benchmarks...");
    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.env("CARGO_INCREMENTAL", "0")
        .args(["bench", "--bench", BENCH_NAME]);

    // Args for the test runner (Criterion) go after --
    cmd.arg("--");
    if quick {
        cmd.arg("--measurement-time").arg("0.5");
        cmd.arg("--noplot");
        cmd.arg("--sample-size").arg("10");
    }

    let status = cmd
        .status()
        .with_context(|| format!("failed to run bench {BENCH_NAME}"))?;
    if !status.success() {
        anyhow::bail!("benchmark {BENCH_NAME} failed");
    }

    println!("Finished in {:.2?}", start.elapsed());
    Ok(())
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    // group -> bench -> mean time in ns
    let mut results: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for group in read_dirs(criterion_dir)? {
        let group_name = file_name(&group);
        if group_name == "report" {
            continue;
        }
        for bench in read_dirs(&group)? {
            let estimates = bench.join("new").join("estimates.json");
            let Ok(content) = fs::read_to_string(&estimates) else {
                continue;
            };
            let parsed: Estimates = serde_json::from_str(&content)
                .with_context(|| format!("malformed {}", estimates.display()))?;
            results
                .entry(group_name.clone())
                .or_default()
                .insert(file_name(&bench), parsed.mean.point_estimate);
        }
    }

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)?;

    writeln!(file, "# Publication Benchmark Report")?;
    for (group, benches) in &results {
        let fastest = benches.values().copied().fold(f64::INFINITY, f64::min);

        writeln!(file, "\n## {group}\n")?;
        writeln!(file, "| Variant | Mean | vs fastest |")?;
        writeln!(file, "|---|---|---|")?;
        for (bench, ns) in benches {
            let rel = if fastest > 0.0 { ns / fastest } else { 0.0 };
            writeln!(file, "| {bench} | {} | **{rel:.2}x** |", format_ns(*ns))?;
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn read_dirs(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("cannot read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn format_ns(ns: f64) -> String {
    if ns >= 1_000_000.0 {
        format!("{:.2} ms", ns / 1_000_000.0)
    } else if ns >= 1_000.0 {
        format!("{:.2} µs", ns / 1_000.0)
    } else {
        format!("{ns:.2} ns")
    }
}
