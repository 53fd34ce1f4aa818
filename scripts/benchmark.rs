// scripts/benchmark.rs
use gbm_paths::analytics::terminal_stats::summarize;
use gbm_paths::math_utils::Timer;
use gbm_paths::mc::path_simulator::{simulate_parallel, simulate_seeded};
use gbm_paths::models::params::SimulationParameters;
use std::env;
use std::process::Command;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    memory_gb: f64,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::proc_field("/proc/cpuinfo", "model name")
                .unwrap_or_else(|| "Unknown CPU".to_string()),
            cpu_cores: num_cpus::get(),
            memory_gb: Self::proc_field("/proc/meminfo", "MemTotal")
                .and_then(|v| v.split_whitespace().next()?.parse::<u64>().ok())
                .map(|kb| kb as f64 / (1024.0 * 1024.0))
                .unwrap_or(0.0),
            rust_version: Command::new("rustc")
                .arg("--version")
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown Rust version".to_string()),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    /// `key: value` lookup in a Linux /proc file; `None` elsewhere
    fn proc_field(path: &str, key: &str) -> Option<String> {
        std::fs::read_to_string(path)
            .ok()?
            .lines()
            .find(|line| line.starts_with(key))
            .and_then(|line| line.split(':').nth(1))
            .map(|s| s.trim().to_string())
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: &'static str,
    steps: usize,
    paths: usize,
    time_ms: f64,
    throughput_cells_per_sec: f64,
    mean: f64,
    analytic_mean: f64,
    relative_error: f64,
}

fn run_simulation_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    let path_configs = [1_000, 10_000, 100_000];
    let steps = 100;

    for &paths in &path_configs {
        println!("Running benchmarks with {} paths x {} steps...", paths, steps);

        let params = SimulationParameters {
            s0: 100.0,
            r: 0.05,
            sigma: 0.2,
            t: 1.0,
            steps,
            paths,
            ..Default::default()
        };
        let analytic_mean = params
            .model()
            .expect("Valid configuration")
            .expected_terminal(params.s0, params.t);

        type Runner = fn(&SimulationParameters, u64) -> gbm_paths::SimResult<gbm_paths::PathEnsemble>;
        let runners: [(&'static str, Runner); 2] = [
            ("serial", simulate_seeded),
            ("parallel", simulate_parallel),
        ];

        for (name, run) in runners {
            let timer = Timer::new();
            let ensemble = run(&params, 42).expect("Valid configuration");
            let time_ms = timer.elapsed_ms();
            let stats = summarize(&ensemble).expect("Non-empty ensemble");

            results.push(BenchmarkResult {
                name,
                steps,
                paths,
                time_ms,
                throughput_cells_per_sec: (steps * paths) as f64 / (time_ms / 1000.0),
                mean: stats.mean,
                analytic_mean,
                relative_error: (stats.mean - analytic_mean).abs() / analytic_mean,
            });
        }
    }

    results
}

fn main() {
    println!("gbm-paths benchmark");
    println!("===================\n");

    let system_info = SystemInfo::gather();
    println!("OS: {}", system_info.os);
    println!("CPU: {} ({} cores)", system_info.cpu_model, system_info.cpu_cores);
    println!("Memory: {:.1} GB", system_info.memory_gb);
    println!("Rust: {}", system_info.rust_version);
    println!("RUSTFLAGS: {}", system_info.rustc_flags);
    println!("Rayon threads: {}\n", system_info.rayon_threads);

    let results = run_simulation_benchmarks();

    println!(
        "\n{:<10} {:>6} {:>8} {:>12} {:>16} {:>10} {:>10} {:>10}",
        "mode", "steps", "paths", "time (ms)", "cells/sec", "mean", "analytic", "rel err"
    );
    for r in &results {
        println!(
            "{:<10} {:>6} {:>8} {:>12.3} {:>16.0} {:>10.4} {:>10.4} {:>10.6}",
            r.name,
            r.steps,
            r.paths,
            r.time_ms,
            r.throughput_cells_per_sec,
            r.mean,
            r.analytic_mean,
            r.relative_error
        );
    }
}
