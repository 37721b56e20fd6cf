use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Memo workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the memo benchmarks and write a markdown report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
    /// Run the loom model tests
    Loom,
    /// Run the test suite with and without the optional features
    Check,
}

const BENCH: &str = "memo_benchmark";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
        Commands::Loom => run_loom()?,
        Commands::Check => run_checks()?,
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!(">>> Running {BENCH}...");
    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("bench").arg("--bench").arg(BENCH);

    // Args for the test runner (Criterion) go after --
    cmd.arg("--");
    if quick {
        cmd.arg("--measurement-time").arg("0.1");
        cmd.arg("--noplot");
        cmd.arg("--sample-size").arg("10");
    }

    let status = cmd.status().context("Failed to spawn cargo bench")?;
    if !status.success() {
        anyhow::bail!("Benchmark run failed");
    }
    println!("Finished {BENCH} in {:.2?}", start.elapsed());
    Ok(())
}

fn run_loom() -> Result<()> {
    println!(">>> Running loom models...");
    let status = Command::new("cargo")
        .env("RUSTFLAGS", "--cfg loom")
        .args(["test", "--test", "loom_memo", "--release"])
        .status()
        .context("Failed to spawn cargo test")?;
    if !status.success() {
        anyhow::bail!("Loom models failed");
    }
    Ok(())
}

/// Feature sets the library test suite must pass under.
const FEATURE_SETS: &[&[&str]] = &[&[], &["--features", "tracing"]];

fn run_checks() -> Result<()> {
    for features in FEATURE_SETS {
        println!(">>> cargo test -p memo {}", features.join(" "));
        let status = Command::new("cargo")
            .args(["test", "-p", "memo"])
            .args(*features)
            .status()
            .context("Failed to spawn cargo test")?;
        if !status.success() {
            anyhow::bail!("Tests failed with {:?}", features);
        }
    }
    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    // group -> function -> mean time (ns)
    let mut results: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    collect_results(criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::io::Write;
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("Failed to create {}", report_path.display()))?;

    writeln!(file, "# Memo Benchmark Report")?;

    for (group, functions) in &results {
        let fastest = functions.values().copied().fold(f64::INFINITY, f64::min);

        writeln!(file, "\n## {group}\n")?;
        writeln!(file, "| Benchmark | Mean | vs fastest |")?;
        writeln!(file, "|---|---|---|")?;
        for (function, mean_ns) in functions {
            let rel = if fastest > 0.0 { mean_ns / fastest } else { 0.0 };
            writeln!(file, "| {function} | {} | **{rel:.2}x** |", format_ns(*mean_ns))?;
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ns(ns: f64) -> String {
    if ns > 1_000_000.0 {
        format!("{:.2} ms", ns / 1_000_000.0)
    } else if ns > 1_000.0 {
        format!("{:.2} µs", ns / 1_000.0)
    } else {
        format!("{ns:.1} ns")
    }
}

/// Walks `target/criterion/<group>/<function>/new/estimates.json`.
fn collect_results(dir: &Path, results: &mut BTreeMap<String, BTreeMap<String, f64>>) -> Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }

        let Some(run_dir) = path.parent() else { continue };
        if run_dir.file_name().and_then(|s| s.to_str()) != Some("new") {
            continue;
        }
        let Some(function_dir) = run_dir.parent() else { continue };
        let Some(group_dir) = function_dir.parent() else { continue };
        let (Some(function), Some(group)) = (dir_name(function_dir), dir_name(group_dir)) else {
            continue;
        };
        if group == "criterion" {
            continue;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let json: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Malformed estimates in {}", path.display()))?;
        if let Some(mean_ns) = json
            .get("mean")
            .and_then(|m| m.get("point_estimate"))
            .and_then(serde_json::Value::as_f64)
        {
            results.entry(group).or_default().insert(function, mean_ns);
        }
    }

    Ok(())
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|s| s.to_str()).map(str::to_owned)
}
