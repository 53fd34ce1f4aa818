// src/market_data/provider.rs
use crate::error::{SimError, SimResult};
use chrono::NaiveDate;
use std::collections::HashMap;

/// One daily close
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices for one ticker in strictly ascending date order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceHistory {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Validate ordering and prices. An empty history is allowed here and
    /// rejected by [`PriceHistory::latest_close`].
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> SimResult<Self> {
        let ticker = ticker.into();
        if let Some(p) = points.iter().find(|p| !(p.close.is_finite() && p.close > 0.0)) {
            return Err(SimError::HistoricalData {
                ticker,
                reason: format!("non-positive close {} on {}", p.close, p.date),
            });
        }
        if let Some(w) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(SimError::HistoricalData {
                ticker,
                reason: format!("dates not ascending: {} then {}", w[0].date, w[1].date),
            });
        }
        Ok(Self { ticker, points })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// The most recent close; the simulation's `s0`
    pub fn latest_close(&self) -> SimResult<f64> {
        self.points
            .last()
            .map(|p| p.close)
            .ok_or_else(|| SimError::HistoricalData {
                ticker: self.ticker.clone(),
                reason: "no prices in the requested window".to_string(),
            })
    }
}

/// Source of historical closing prices.
pub trait HistoricalPriceProvider {
    /// Closes for `ticker` with `start <= date <= end`, ascending.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> SimResult<PriceHistory>;
}

impl<P: HistoricalPriceProvider + ?Sized> HistoricalPriceProvider for &P {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> SimResult<PriceHistory> {
        (**self).fetch(ticker, start, end)
    }
}

/// Serves fixed series from memory, windowed to the requested range.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, Vec<PricePoint>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series; points are sorted by date.
    pub fn with_series(mut self, ticker: &str, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        self.series.insert(ticker.to_uppercase(), points);
        self
    }
}

impl HistoricalPriceProvider for InMemoryProvider {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> SimResult<PriceHistory> {
        if start > end {
            return Err(SimError::HistoricalData {
                ticker: ticker.to_string(),
                reason: format!("start {} is after end {}", start, end),
            });
        }
        let series = self
            .series
            .get(&ticker.to_uppercase())
            .ok_or_else(|| SimError::HistoricalData {
                ticker: ticker.to_string(),
                reason: "unknown ticker".to_string(),
            })?;
        let window = series
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        PriceHistory::new(ticker, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_history_validation() {
        let ok = PriceHistory::new("AAPL", vec![PricePoint::new(day(1), 170.0), PricePoint::new(day(4), 172.5)]);
        assert_eq!(ok.unwrap().latest_close().unwrap(), 172.5);

        let unordered = PriceHistory::new("AAPL", vec![PricePoint::new(day(4), 170.0), PricePoint::new(day(1), 172.5)]);
        assert!(unordered.is_err());

        let duplicate = PriceHistory::new("AAPL", vec![PricePoint::new(day(4), 170.0), PricePoint::new(day(4), 172.5)]);
        assert!(duplicate.is_err());

        let negative = PriceHistory::new("AAPL", vec![PricePoint::new(day(1), -1.0)]);
        assert!(negative.is_err());

        let empty = PriceHistory::new("AAPL", vec![]).unwrap();
        assert!(matches!(empty.latest_close(), Err(SimError::HistoricalData { .. })));
    }

    #[test]
    fn test_in_memory_window() {
        let provider = InMemoryProvider::new().with_series(
            "msft",
            vec![
                PricePoint::new(day(5), 405.0),
                PricePoint::new(day(1), 400.0),
                PricePoint::new(day(3), 402.0),
            ],
        );

        let history = provider.fetch("MSFT", day(2), day(4)).unwrap();
        assert_eq!(history.closes().collect::<Vec<_>>(), vec![402.0]);

        let full = provider.fetch("msft", day(1), day(31)).unwrap();
        assert_eq!(full.len(), 3);
        assert_eq!(full.latest_close().unwrap(), 405.0);

        assert!(provider.fetch("TSLA", day(1), day(31)).is_err());
        assert!(provider.fetch("MSFT", day(5), day(1)).is_err());
    }
}
