// src/models/gbm.rs
//! Geometric Brownian Motion with a continuous yield
//!
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! S_t  = S_0 exp((r - q - σ²/2) t + σ W_t)
//! ```
//!
//! Sampled on a uniform grid the exact solution gives the log-increment
//! `(r - q - σ²/2) Δt + σ √Δt Z` with `Z ~ N(0,1)`, unbiased for any `Δt`.

use crate::error::{validation::*, SimResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gbm {
    pub r: f64,     // Risk-free rate
    pub q: f64,     // Dividend / convenience yield
    pub sigma: f64, // Annualized volatility
}

impl Gbm {
    pub fn new(r: f64, q: f64, sigma: f64) -> SimResult<Self> {
        validate_finite("r", r)?;
        validate_finite("q", q)?;
        validate_positive("sigma", sigma)?;
        Ok(Gbm { r, q, sigma })
    }

    /// Risk-neutral log drift per unit time, `r - q - σ²/2`
    pub fn log_drift(&self) -> f64 {
        self.r - self.q - 0.5 * self.sigma * self.sigma
    }

    /// Deterministic part of one log-increment
    pub fn log_drift_per_step(&self, dt: f64) -> f64 {
        self.log_drift() * dt
    }

    /// Scale applied to a standard-normal draw in one log-increment
    pub fn diffusion_per_step(&self, dt: f64) -> f64 {
        self.sigma * dt.sqrt()
    }

    pub fn exact_step(&self, s_t: f64, dt: f64, normal_draw: f64) -> f64 {
        s_t * (self.log_drift_per_step(dt) + self.diffusion_per_step(dt) * normal_draw).exp()
    }

    /// The zero-noise curve `S_0 exp((r - q) t)` that paths collapse onto as σ → 0
    pub fn forward(&self, s0: f64, t: f64) -> f64 {
        s0 * ((self.r - self.q) * t).exp()
    }

    /// `E[S_T]`
    pub fn expected_terminal(&self, s0: f64, t: f64) -> f64 {
        self.forward(s0, t)
    }

    /// `Var[S_T] = S_0² e^{2(r-q)T} (e^{σ²T} - 1)`
    pub fn terminal_variance(&self, s0: f64, t: f64) -> f64 {
        let fwd = self.forward(s0, t);
        fwd * fwd * (self.sigma * self.sigma * t).exp_m1()
    }
}
