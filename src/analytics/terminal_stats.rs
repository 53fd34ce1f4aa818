// src/analytics/terminal_stats.rs
//! Terminal price statistics
//!
//! Reductions over the last row of a [`PathEnsemble`]. The default standard
//! deviation is the population one (divide by `N`): the ensemble is the full
//! set of realized outcomes, not a subsample. The sample convention
//! (divide by `N - 1`) differs by a factor `√(N / (N - 1))`.

use crate::error::{SimError, SimResult};
use crate::mc::ensemble::PathEnsemble;
use statrs::statistics::Statistics;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StdDevConvention {
    /// Divide by `N`
    #[default]
    Population,
    /// Divide by `N - 1`; a single price gives 0
    Sample,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminalStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub paths: usize,
    pub convention: StdDevConvention,
}

impl TerminalStatistics {
    /// Standard error of `mean` as an estimate of `E[S_T]`
    pub fn standard_error(&self) -> f64 {
        self.std_dev / (self.paths as f64).sqrt()
    }
}

/// Mean and population standard deviation of the terminal prices.
pub fn summarize(ensemble: &PathEnsemble) -> SimResult<TerminalStatistics> {
    summarize_with(ensemble, StdDevConvention::Population)
}

pub fn summarize_with(
    ensemble: &PathEnsemble,
    convention: StdDevConvention,
) -> SimResult<TerminalStatistics> {
    let terminal = ensemble.terminal_prices().ok_or(SimError::EmptyEnsemble)?;
    match terminal.as_slice() {
        Some(prices) => summarize_prices(prices, convention),
        None => summarize_prices(&terminal.to_vec(), convention),
    }
}

/// Statistics over a bare slice of terminal prices.
pub fn summarize_prices(
    prices: &[f64],
    convention: StdDevConvention,
) -> SimResult<TerminalStatistics> {
    let paths = prices.len();
    if paths == 0 {
        return Err(SimError::EmptyEnsemble);
    }

    let mean = prices.iter().mean();
    let std_dev = if paths == 1 {
        0.0
    } else {
        match convention {
            StdDevConvention::Population => prices.iter().population_std_dev(),
            StdDevConvention::Sample => prices.iter().std_dev(),
        }
    };

    Ok(TerminalStatistics {
        mean,
        std_dev,
        paths,
        convention,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_population_vs_sample() {
        let prices = [90.0, 100.0, 110.0, 120.0];

        let pop = summarize_prices(&prices, StdDevConvention::Population).unwrap();
        assert_relative_eq!(pop.mean, 105.0);
        assert_relative_eq!(pop.std_dev, 125.0f64.sqrt(), max_relative = 1e-12);

        let sample = summarize_prices(&prices, StdDevConvention::Sample).unwrap();
        assert_relative_eq!(
            sample.std_dev,
            pop.std_dev * (4.0f64 / 3.0).sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_uses_last_row() {
        let ensemble =
            PathEnsemble::from_prices(array![[1.0, 1.0], [2.0, 4.0]], 0.5).unwrap();
        let stats = summarize(&ensemble).unwrap();
        assert_relative_eq!(stats.mean, 3.0);
        assert_relative_eq!(stats.std_dev, 1.0);
        assert_relative_eq!(stats.standard_error(), 1.0 / 2.0f64.sqrt());
    }

    #[test]
    fn test_single_path() {
        let stats = summarize_prices(&[123.45], StdDevConvention::Sample).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.mean, 123.45);
    }

    #[test]
    fn test_empty() {
        assert!(matches!(
            summarize_prices(&[], StdDevConvention::Population),
            Err(SimError::EmptyEnsemble)
        ));

        let no_paths = PathEnsemble::from_prices(Array2::zeros((3, 0)), 0.1).unwrap();
        assert!(matches!(summarize(&no_paths), Err(SimError::EmptyEnsemble)));

        let no_steps = PathEnsemble::from_prices(Array2::zeros((0, 3)), 0.1).unwrap();
        assert!(matches!(summarize(&no_steps), Err(SimError::EmptyEnsemble)));
    }
}
