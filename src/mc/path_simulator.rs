// src/mc/path_simulator.rs
//! GBM Path Simulator
//!
//! # Math Framework
//!
//! Paths are sampled from the exact solution of
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! ```
//! on the uniform grid `t_i = (i + 1) Δt`, `Δt = T / steps`:
//! ```text
//! ln S[i][j] = ln S_0 + Σ_{k ≤ i} ((r - q - σ²/2) Δt + σ √Δt Z[k][j])
//! ```
//!
//! # Pipeline
//!
//! The whole ensemble is built as dense array passes rather than path by path:
//! 1. Draw a `(steps × paths)` block of N(0,1) values in one request
//! 2. Map each draw to its log-increment
//! 3. Prefix-sum along the time axis, seeded with `ln S_0`
//! 4. Exponentiate element-wise
//!
//! Columns never read each other, so the parallel variant splits passes 2-3
//! by path with one counter-based stream per column.

use crate::error::{SimError, SimResult};
use crate::math_utils::Timer;
use crate::mc::ensemble::PathEnsemble;
use crate::models::params::SimulationParameters;
use crate::rng::{NormalSource, RngFactory};
use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayViewMut1, Axis};
use tracing::debug;

/// Simulate `params.paths` GBM trajectories from one block of draws.
///
/// Draws are consumed in row-major order: the first `paths` draws drive the
/// first step of every path.
///
/// # Errors
///
/// - [`SimError::InvalidParameter`] for `s0 <= 0`, `sigma <= 0`, `t <= 0`,
///   `steps == 0`, `paths == 0` or non-finite inputs
/// - [`SimError::InsufficientRandomness`] if the source cannot deliver
///   `steps * paths` finite draws
/// - [`SimError::NumericalInstability`] if a price overflows or underflows
///
/// Nothing is returned on failure; there is no partial ensemble.
pub fn simulate<S: NormalSource + ?Sized>(
    params: &SimulationParameters,
    rng: &mut S,
) -> SimResult<PathEnsemble> {
    params.validate()?;
    let timer = Timer::new();
    let model = params.model()?;
    let dt = params.dt();
    let requested = params.draw_count()?;

    let mut draws = vec![0.0; requested];
    rng.fill_standard_normal(&mut draws)?;
    if let Some(idx) = draws.iter().position(|z| !z.is_finite()) {
        return Err(SimError::InsufficientRandomness {
            requested,
            available: idx,
            reason: format!("draw {} is not finite ({})", idx, draws[idx]),
        });
    }

    let mut grid = Array2::from_shape_vec((params.steps, params.paths), draws)?;

    let mu_dt = model.log_drift_per_step(dt);
    let vol_dt = model.diffusion_per_step(dt);
    grid.mapv_inplace(|z| mu_dt + vol_dt * z);

    let mut first = grid.row_mut(0);
    first += params.s0.ln();
    grid.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);

    grid.mapv_inplace(f64::exp);
    check_prices(&grid)?;

    debug!(
        steps = params.steps,
        paths = params.paths,
        dt,
        elapsed_ms = timer.elapsed_ms(),
        "simulated GBM ensemble"
    );
    Ok(PathEnsemble::from_prices_unchecked(grid, dt))
}

/// [`simulate`] with a seeded `StdRng` for the whole block.
pub fn simulate_seeded(params: &SimulationParameters, seed: u64) -> SimResult<PathEnsemble> {
    let mut rng = RngFactory::new(seed).create_std_rng();
    simulate(params, &mut rng)
}

/// Parallel simulation across paths.
///
/// Path `j` is driven by `CounterRng::new(seed, j)`, so the ensemble depends
/// only on `seed` and never on the rayon thread count. It is a different
/// ensemble from `simulate_seeded(params, seed)`.
pub fn simulate_parallel(params: &SimulationParameters, seed: u64) -> SimResult<PathEnsemble> {
    params.validate()?;
    let timer = Timer::new();
    let model = params.model()?;
    let dt = params.dt();
    let factory = RngFactory::new(seed);
    let mu_dt = model.log_drift_per_step(dt);
    let vol_dt = model.diffusion_per_step(dt);
    let log_s0 = params.s0.ln();

    let mut grid = Array2::<f64>::zeros((params.steps, params.paths));

    // Pass 1: per-column draws mapped to log-increments
    grid.axis_iter_mut(Axis(1))
        .into_par_iter()
        .enumerate()
        .try_for_each(|(j, mut column)| -> SimResult<()> {
            let mut rng = factory.create_counter_rng(j as u64);
            let mut z = vec![0.0; column.len()];
            rng.fill_standard_normal(&mut z)?;
            for (cell, z) in column.iter_mut().zip(z) {
                *cell = mu_dt + vol_dt * z;
            }
            Ok(())
        })?;

    // Pass 2: prefix sum per path
    grid.axis_iter_mut(Axis(1))
        .into_par_iter()
        .for_each(|column| integrate_log_path(column, log_s0));

    // Pass 3
    grid.par_mapv_inplace(f64::exp);
    check_prices(&grid)?;

    debug!(
        steps = params.steps,
        paths = params.paths,
        dt,
        threads = rayon::current_num_threads(),
        elapsed_ms = timer.elapsed_ms(),
        "simulated GBM ensemble in parallel"
    );
    Ok(PathEnsemble::from_prices_unchecked(grid, dt))
}

fn integrate_log_path(mut column: ArrayViewMut1<'_, f64>, log_s0: f64) {
    let mut acc = log_s0;
    for cell in column.iter_mut() {
        acc += *cell;
        *cell = acc;
    }
}

fn check_prices(grid: &Array2<f64>) -> SimResult<()> {
    match grid.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
        Some(bad) => Err(SimError::NumericalInstability {
            method: "GBM path simulation".to_string(),
            reason: format!("price left the representable positive range: {}", bad),
        }),
        None => Ok(()),
    }
}
