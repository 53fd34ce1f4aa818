// src/session.rs
//! End-to-end run: fetch history, take the latest close as `s0`, simulate,
//! summarize.

use crate::analytics::terminal_stats::{summarize, TerminalStatistics};
use crate::config::{ParameterBounds, SimulationRequest};
use crate::error::{SimError, SimResult};
use crate::market_data::{CacheConfig, CachedProvider, HistoricalPriceProvider, PriceHistory};
use crate::mc::ensemble::PathEnsemble;
use crate::mc::path_simulator::simulate;
use crate::models::params::SimulationParameters;
use crate::rng::NormalSource;
use chrono::{NaiveDate, TimeDelta};
use std::sync::Arc;
use tracing::info;

/// Everything a display layer needs from one run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub history: Arc<PriceHistory>,
    pub parameters: SimulationParameters,
    pub ensemble: PathEnsemble,
    pub statistics: TerminalStatistics,
    /// Analytic `E[S_T]` for comparison with `statistics.mean`
    pub expected_terminal: f64,
}

pub struct SimulationSession<P> {
    provider: CachedProvider<P>,
    bounds: ParameterBounds,
}

impl<P: HistoricalPriceProvider> SimulationSession<P> {
    pub fn new(provider: P, bounds: ParameterBounds) -> SimResult<Self> {
        Self::with_cache(provider, bounds, CacheConfig::default())
    }

    pub fn with_cache(provider: P, bounds: ParameterBounds, cache: CacheConfig) -> SimResult<Self> {
        bounds.validate()?;
        Ok(Self {
            provider: CachedProvider::with_config(provider, cache),
            bounds,
        })
    }

    pub fn bounds(&self) -> &ParameterBounds {
        &self.bounds
    }

    pub fn provider(&self) -> &CachedProvider<P> {
        &self.provider
    }

    /// History window ending at `as_of`, served from the cache when possible.
    pub fn history(&self, ticker: &str, as_of: NaiveDate) -> SimResult<Arc<PriceHistory>> {
        let start = TimeDelta::try_days(self.bounds.lookback_days)
            .and_then(|window| as_of.checked_sub_signed(window))
            .ok_or_else(|| SimError::InvalidParameter {
                parameter: "lookback_days".to_string(),
                value: self.bounds.lookback_days as f64,
                constraint: format!("window start before {} is out of the date range", as_of),
            })?;
        self.provider.fetch_shared(ticker, start, as_of)
    }

    pub fn run<S: NormalSource + ?Sized>(
        &self,
        request: &SimulationRequest,
        as_of: NaiveDate,
        rng: &mut S,
    ) -> SimResult<SimulationReport> {
        request.validate(&self.bounds)?;
        let history = self.history(&request.ticker, as_of)?;
        let s0 = history.latest_close()?;
        let parameters = request.to_parameters(s0, &self.bounds)?;

        let ensemble = simulate(&parameters, rng)?;
        let statistics = summarize(&ensemble)?;
        let expected_terminal = parameters.model()?.expected_terminal(s0, parameters.t);

        info!(
            ticker = %request.ticker,
            %as_of,
            s0,
            paths = parameters.paths,
            mean = statistics.mean,
            std_dev = statistics.std_dev,
            "simulation complete"
        );

        Ok(SimulationReport {
            ticker: request.ticker.clone(),
            as_of,
            history,
            parameters,
            ensemble,
            statistics,
            expected_terminal,
        })
    }
}
