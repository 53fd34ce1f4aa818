// demos/stock_simulation.rs
use chrono::{Duration, NaiveDate};
use gbm_paths::config::{ParameterBounds, SimulationRequest};
use gbm_paths::error::SimError;
use gbm_paths::market_data::{InMemoryProvider, PricePoint};
use gbm_paths::mc::path_simulator::simulate;
use gbm_paths::models::params::SimulationParameters;
use gbm_paths::rng::{self, RecordedDraws};
use gbm_paths::session::SimulationSession;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let ticker = args.get(1).cloned().unwrap_or_else(|| "AAPL".to_string());
    let seed = args
        .get(2)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);

    println!("Monte Carlo Stock Price Simulation");
    println!("==================================\n");

    let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).expect("valid date");
    let session = SimulationSession::new(synthetic_market(as_of), ParameterBounds::default())
        .expect("default bounds are valid");

    let request = SimulationRequest {
        ticker: ticker.clone(),
        ..Default::default()
    };
    let mut rng = rng::seed_rng_from_u64(seed);

    match session.run(&request, as_of, &mut rng) {
        Ok(report) => {
            println!("Closing prices for {}: {} days", report.ticker, report.history.len());
            println!("Latest Stock Price (S_0): {:.2}", report.parameters.s0);
            println!("Strike Price (K): {:.0}", report.parameters.strike);
            println!(
                "r = {:.2}, sigma = {:.2}, T = {:.1}, N = {}, steps = {}",
                report.parameters.r,
                report.parameters.sigma,
                report.parameters.t,
                report.parameters.paths,
                report.parameters.steps
            );

            println!("\nFirst 5 simulated paths (every 20th step):");
            for (j, path) in report.ensemble.iter_paths().take(5).enumerate() {
                let samples: Vec<String> = path
                    .iter()
                    .step_by(20)
                    .map(|s| format!("{:8.2}", s))
                    .collect();
                println!("  path {:>2}: {}", j, samples.join(" "));
            }

            println!(
                "\nSimulated final stock price mean: {:.2}",
                report.statistics.mean
            );
            println!(
                "Simulated final stock price standard deviation: {:.2}",
                report.statistics.std_dev
            );
            println!(
                "Analytic expected final price: {:.2} (MC standard error {:.2})",
                report.expected_terminal,
                report.statistics.standard_error()
            );
        }
        Err(SimError::HistoricalData { ticker, reason }) => {
            println!("Please enter a valid stock ticker ({}: {}).", ticker, reason);
        }
        Err(e) => println!("Simulation failed: {}", e),
    }

    println!("\nError handling");
    println!("--------------");

    let bad = SimulationParameters {
        sigma: -1.0,
        ..Default::default()
    };
    match simulate(&bad, &mut rng::seed_rng_from_u64(seed)) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    let short = SimulationParameters::default();
    match simulate(&short, &mut RecordedDraws::zeros(10)) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) if e.is_retryable() => println!("   ✓ Retryable error: {}", e),
        Err(e) => println!("   Unexpected error type: {}", e),
    }
}

/// A deterministic random walk per ticker, standing in for a market data vendor.
fn synthetic_market(as_of: NaiveDate) -> InMemoryProvider {
    let start = as_of - Duration::days(400);
    let mut provider = InMemoryProvider::new();
    for (ticker, base, seed) in [("AAPL", 180.0, 1u64), ("TSLA", 220.0, 2), ("MSFT", 410.0, 3)] {
        let mut draws = rng::seed_rng_from_u64(seed);
        let mut price: f64 = base;
        let points = (0..=400)
            .map(|d| {
                let z: f64 = rand_distr::Distribution::sample(&rand_distr::StandardNormal, &mut draws);
                price *= (0.015 * z).exp();
                PricePoint::new(start + Duration::days(d), price)
            })
            .collect();
        provider = provider.with_series(ticker, points);
    }
    provider
}
