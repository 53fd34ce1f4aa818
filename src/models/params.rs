// src/models/params.rs
use crate::error::{validation::*, SimError, SimResult};
use crate::models::gbm::Gbm;

/// Inputs of one simulation run. Together with a draw source they fully
/// determine the resulting ensemble.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationParameters {
    pub s0: f64,
    /// Strike carried for display; the simulator never reads it.
    pub strike: f64,
    pub r: f64,
    pub q: f64,
    pub sigma: f64,
    /// Horizon in years
    pub t: f64,
    pub steps: usize,
    pub paths: usize,
}

impl SimulationParameters {
    /// Validate the simulation inputs
    pub fn validate(&self) -> SimResult<()> {
        validate_positive("s0", self.s0)?;
        validate_finite("strike", self.strike)?;
        validate_finite("r", self.r)?;
        validate_finite("q", self.q)?;
        validate_positive("sigma", self.sigma)?;
        validate_positive("t", self.t)?;
        validate_count("steps", self.steps)?;
        validate_count("paths", self.paths)?;
        self.draw_count().map(|_| ())
    }

    pub fn dt(&self) -> f64 {
        self.t / self.steps as f64
    }

    pub fn model(&self) -> SimResult<Gbm> {
        Gbm::new(self.r, self.q, self.sigma)
    }

    /// `steps * paths`, the number of normal draws one run consumes
    pub fn draw_count(&self) -> SimResult<usize> {
        self.steps
            .checked_mul(self.paths)
            .ok_or_else(|| SimError::InvalidParameter {
                parameter: "steps * paths".to_string(),
                value: self.steps as f64 * self.paths as f64,
                constraint: "grid size overflows usize".to_string(),
            })
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            s0: 100.0,
            strike: 110.0,
            r: 0.05,
            q: 0.0,
            sigma: 0.2,
            t: 1.0,
            steps: 100,
            paths: 100,
        }
    }
}
