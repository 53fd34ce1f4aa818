// src/mc/ensemble.rs
use crate::error::{SimError, SimResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Simulated prices on a uniform grid, shape `(steps, paths)`.
///
/// Row `i` holds every path at time `(i + 1) * dt`; the initial price is not
/// stored. Column `j` is one path. All entries are finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnsemble {
    prices: Array2<f64>,
    dt: f64,
}

impl PathEnsemble {
    /// Wrap an existing price grid, checking the positivity invariant.
    ///
    /// A grid with zero columns is accepted so that degenerate inputs reach
    /// the statistics layer and fail there with [`SimError::EmptyEnsemble`].
    pub fn from_prices(prices: Array2<f64>, dt: f64) -> SimResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidParameter {
                parameter: "dt".to_string(),
                value: dt,
                constraint: "must be positive and finite".to_string(),
            });
        }
        if let Some(&bad) = prices.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
            return Err(SimError::InvalidParameter {
                parameter: "price".to_string(),
                value: bad,
                constraint: "every simulated price must be finite and > 0".to_string(),
            });
        }
        Ok(Self { prices, dt })
    }

    pub(crate) fn from_prices_unchecked(prices: Array2<f64>, dt: f64) -> Self {
        Self { prices, dt }
    }

    pub fn steps(&self) -> usize {
        self.prices.nrows()
    }

    pub fn paths(&self) -> usize {
        self.prices.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.prices.dim()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn horizon(&self) -> f64 {
        self.steps() as f64 * self.dt
    }

    pub fn prices(&self) -> ArrayView2<'_, f64> {
        self.prices.view()
    }

    pub fn into_prices(self) -> Array2<f64> {
        self.prices
    }

    /// One simulated trajectory, or `None` past the last path
    pub fn path(&self, j: usize) -> Option<ArrayView1<'_, f64>> {
        (j < self.paths()).then(|| self.prices.column(j))
    }

    /// Trajectories in path order
    pub fn iter_paths(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.prices.axis_iter(Axis(1))
    }

    /// The last row, or `None` for a grid without steps
    pub fn terminal_prices(&self) -> Option<ArrayView1<'_, f64>> {
        self.steps()
            .checked_sub(1)
            .map(|last| self.prices.row(last))
    }

    /// Times `(i + 1) * dt` of each stored row
    pub fn time_grid(&self) -> Array1<f64> {
        (1..=self.steps()).map(|i| i as f64 * self.dt).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accessors() {
        let ensemble =
            PathEnsemble::from_prices(array![[101.0, 99.0], [102.0, 98.0], [103.0, 97.5]], 0.5)
                .unwrap();

        assert_eq!(ensemble.shape(), (3, 2));
        assert_eq!(ensemble.path(1).unwrap().to_vec(), vec![99.0, 98.0, 97.5]);
        assert!(ensemble.path(2).is_none());
        assert_eq!(ensemble.terminal_prices().unwrap().to_vec(), vec![103.0, 97.5]);
        assert_eq!(ensemble.time_grid().to_vec(), vec![0.5, 1.0, 1.5]);
        assert_eq!(ensemble.horizon(), 1.5);
        assert_eq!(ensemble.iter_paths().count(), 2);
    }

    #[test]
    fn test_rejects_non_positive_prices() {
        assert!(PathEnsemble::from_prices(array![[1.0, 0.0]], 0.1).is_err());
        assert!(PathEnsemble::from_prices(array![[1.0, f64::NAN]], 0.1).is_err());
        assert!(PathEnsemble::from_prices(array![[1.0, 2.0]], 0.0).is_err());
    }

    #[test]
    fn test_empty_grids() {
        let no_paths = PathEnsemble::from_prices(Array2::zeros((4, 0)), 0.25).unwrap();
        assert_eq!(no_paths.terminal_prices().unwrap().len(), 0);

        let no_steps = PathEnsemble::from_prices(Array2::zeros((0, 3)), 0.25).unwrap();
        assert!(no_steps.terminal_prices().is_none());
    }
}
