//! # gbm-paths: Monte Carlo Stock Price Paths
//!
//! Simulates many independent price trajectories of a stock under geometric
//! Brownian motion and reduces them to terminal statistics.
//!
//! ## Key Features
//!
//! - **Exact discretization**: log-space GBM sampling, unbiased for any step count
//! - **Vectorized pipeline**: draws → log-increments → prefix sum → exp over an `ndarray` grid
//! - **Parallel paths**: Rayon across the path dimension with per-path counter-based streams
//! - **Replayable randomness**: any `rand::Rng`, counter streams or a recorded draw sequence
//! - **Historical prices**: provider trait with an explicit `(ticker, start, end)` cache
//!
//! ## Quick Start
//!
//! ```rust
//! use gbm_paths::analytics::terminal_stats::summarize;
//! use gbm_paths::mc::path_simulator::simulate;
//! use gbm_paths::models::params::SimulationParameters;
//! use gbm_paths::rng;
//!
//! let params = SimulationParameters {
//!     s0: 100.0,     // Spot price
//!     r: 0.05,       // Risk-free rate
//!     sigma: 0.2,    // Volatility
//!     t: 1.0,        // Horizon in years
//!     steps: 100,
//!     paths: 500,
//!     ..Default::default()
//! };
//!
//! let mut rng = rng::seed_rng_from_u64(42);
//! let ensemble = simulate(&params, &mut rng).expect("Valid parameters");
//! assert_eq!(ensemble.shape(), (100, 500));
//!
//! let stats = summarize(&ensemble).expect("Non-empty ensemble");
//! println!("Terminal mean: {:.2} ± {:.2}", stats.mean, stats.std_dev);
//! ```

// Module declarations
pub mod analytics;
pub mod config;
pub mod error;
pub mod market_data;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod rng;
pub mod session;

// Re-export commonly used types for convenience
pub use analytics::terminal_stats::{summarize, StdDevConvention, TerminalStatistics};
pub use error::{SimError, SimResult};
pub use mc::ensemble::PathEnsemble;
pub use mc::path_simulator::{simulate, simulate_parallel};
pub use models::params::SimulationParameters;
