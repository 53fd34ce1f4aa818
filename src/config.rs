// src/config.rs
//! User-facing simulation inputs and their admissible ranges.

use crate::error::{validation::*, SimError, SimResult};
use crate::models::params::SimulationParameters;

/// Upper limit on the history window, about a century of calendar days
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Admissible ranges of the simulation inputs exposed to users.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterBounds {
    pub rate: (f64, f64),
    pub volatility: (f64, f64),
    pub horizon: (f64, f64),
    pub simulations: (usize, usize),
    pub strike: (f64, f64),
    /// Grid size used for every run
    pub steps: usize,
    /// Days of history fetched before the valuation date
    pub lookback_days: i64,
}

impl ParameterBounds {
    pub fn validate(&self) -> SimResult<()> {
        for (name, (lo, hi)) in [
            ("rate", self.rate),
            ("volatility", self.volatility),
            ("horizon", self.horizon),
            ("strike", self.strike),
        ] {
            validate_finite(name, lo)?;
            validate_finite(name, hi)?;
            if lo > hi {
                return Err(SimError::InvalidParameter {
                    parameter: name.to_string(),
                    value: lo,
                    constraint: format!("lower bound exceeds upper bound {}", hi),
                });
            }
        }
        validate_positive("volatility lower bound", self.volatility.0)?;
        validate_positive("horizon lower bound", self.horizon.0)?;
        validate_count("simulations lower bound", self.simulations.0)?;
        validate_count("steps", self.steps)?;
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(SimError::InvalidParameter {
                parameter: "lookback_days".to_string(),
                value: self.lookback_days as f64,
                constraint: format!("must be in range [1, {}]", MAX_LOOKBACK_DAYS),
            });
        }
        Ok(())
    }

    /// Default strike: 110% of spot, truncated, kept inside the strike range
    pub fn default_strike(&self, s0: f64) -> f64 {
        (s0 * 1.1).trunc().max(self.strike.0).min(self.strike.1)
    }
}

impl Default for ParameterBounds {
    fn default() -> Self {
        ParameterBounds {
            rate: (0.0, 0.1),
            volatility: (0.1, 1.0),
            horizon: (0.1, 5.0),
            simulations: (10, 1000),
            strike: (50.0, 500.0),
            steps: 100,
            lookback_days: 300,
        }
    }
}

/// One user request: a ticker plus the adjustable inputs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationRequest {
    pub ticker: String,
    /// `None` uses [`ParameterBounds::default_strike`]
    pub strike: Option<f64>,
    pub rate: f64,
    pub volatility: f64,
    pub horizon: f64,
    pub simulations: usize,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        SimulationRequest {
            ticker: "AAPL".to_string(),
            strike: None,
            rate: 0.05,
            volatility: 0.2,
            horizon: 1.0,
            simulations: 100,
        }
    }
}

impl SimulationRequest {
    /// Check the ticker and every user input against `bounds`. Needs no spot price.
    pub fn validate(&self, bounds: &ParameterBounds) -> SimResult<()> {
        if self.ticker.trim().is_empty() {
            return Err(SimError::InvalidParameter {
                parameter: "ticker".to_string(),
                value: f64::NAN,
                constraint: "please enter a valid ticker".to_string(),
            });
        }
        validate_range("rate", self.rate, bounds.rate.0, bounds.rate.1)?;
        validate_range("volatility", self.volatility, bounds.volatility.0, bounds.volatility.1)?;
        validate_range("horizon", self.horizon, bounds.horizon.0, bounds.horizon.1)?;
        validate_count_range(
            "simulations",
            self.simulations,
            bounds.simulations.0,
            bounds.simulations.1,
        )?;
        if let Some(k) = self.strike {
            validate_range("strike", k, bounds.strike.0, bounds.strike.1)?;
        }
        Ok(())
    }

    /// Check the request against `bounds` and resolve it into run parameters.
    pub fn to_parameters(
        &self,
        s0: f64,
        bounds: &ParameterBounds,
    ) -> SimResult<SimulationParameters> {
        bounds.validate()?;
        self.validate(bounds)?;
        let strike = self.strike.unwrap_or_else(|| bounds.default_strike(s0));

        let params = SimulationParameters {
            s0,
            strike,
            r: self.rate,
            q: 0.0,
            sigma: self.volatility,
            t: self.horizon,
            steps: bounds.steps,
            paths: self.simulations,
        };
        params.validate()?;
        Ok(params)
    }
}
