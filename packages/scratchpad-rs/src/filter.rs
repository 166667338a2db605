//! Smoothing for the raw state stream
//!
//! A box (moving average) filter over the last N state points, applied between
//! the line parser and the shared state cell. The filter keeps only as much
//! history as the window needs.

use crate::error::{Result, ScratchpadError};
use crate::types::StatePoint;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of points averaged
pub const DEFAULT_WINDOW: usize = 5;

/// Filter mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterMode {
    /// Points pass through unchanged
    Passthrough,
    /// Per-dimension mean over the last `window` points
    MovingAverage { window: usize },
}

impl Default for FilterMode {
    fn default() -> Self {
        Self::MovingAverage {
            window: DEFAULT_WINDOW,
        }
    }
}

impl FilterMode {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::MovingAverage { window: 0 } => Err(ScratchpadError::InvalidConfig(
                "moving average window must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Trailing-window box filter
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    mode: FilterMode,
    /// Retained inputs, most recent first
    history: VecDeque<StatePoint>,
    dimensions: Option<usize>,
}

impl MovingAverageFilter {
    pub fn new(mode: FilterMode) -> Result<Self> {
        mode.validate()?;
        Ok(Self {
            mode,
            history: VecDeque::new(),
            dimensions: None,
        })
    }

    pub fn passthrough() -> Self {
        Self {
            mode: FilterMode::Passthrough,
            history: VecDeque::new(),
            dimensions: None,
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Feed one point and get the smoothed point back.
    ///
    /// The first point fixes the dimensionality; a later point of different
    /// arity is rejected and does not enter the window.
    pub fn process(&mut self, input: &StatePoint) -> Result<StatePoint> {
        let window = match self.mode {
            FilterMode::Passthrough => return Ok(input.clone()),
            FilterMode::MovingAverage { window } => window,
        };

        match self.dimensions {
            Some(expected) => input.ensure_dimensions(expected)?,
            None => self.dimensions = Some(input.len()),
        }

        self.history.push_front(input.clone());
        self.history.truncate(window);

        let count = self.history.len() as f64;
        let mut sums = vec![0.0; input.len()];
        for point in &self.history {
            for (sum, value) in sums.iter_mut().zip(point.components()) {
                *sum += value;
            }
        }

        Ok(StatePoint::new(sums.into_iter().map(|s| s / count).collect()))
    }

    /// Number of points currently retained
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drop history and forget the dimensionality
    pub fn reset(&mut self) {
        self.history.clear();
        self.dimensions = None;
    }
}

impl Default for MovingAverageFilter {
    fn default() -> Self {
        Self {
            mode: FilterMode::default(),
            history: VecDeque::new(),
            dimensions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(values: &[f64]) -> StatePoint {
        StatePoint::new(values.to_vec())
    }

    #[test]
    fn test_window_of_three_running_mean() {
        let mut filter = MovingAverageFilter::new(FilterMode::MovingAverage { window: 3 }).unwrap();

        assert_eq!(filter.process(&point(&[1.0, 0.0])).unwrap(), point(&[1.0, 0.0]));
        assert_eq!(filter.process(&point(&[3.0, 0.0])).unwrap(), point(&[2.0, 0.0]));
        assert_eq!(filter.process(&point(&[5.0, 0.0])).unwrap(), point(&[3.0, 0.0]));
    }

    #[test]
    fn test_old_points_leave_the_window() {
        let mut filter = MovingAverageFilter::new(FilterMode::MovingAverage { window: 2 }).unwrap();

        filter.process(&point(&[10.0])).unwrap();
        filter.process(&point(&[2.0])).unwrap();
        let out = filter.process(&point(&[4.0])).unwrap();

        assert_eq!(out, point(&[3.0]));
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let mut filter = MovingAverageFilter::new(FilterMode::MovingAverage { window: 1 }).unwrap();
        for input in [[0.4, 0.1], [0.0, 0.9], [0.7, 0.7]] {
            let input = point(&input);
            assert_eq!(filter.process(&input).unwrap(), input);
        }
    }

    #[test]
    fn test_passthrough_returns_input() {
        let mut filter = MovingAverageFilter::passthrough();
        for input in [vec![0.4, 0.1, 0.0], vec![1.0], vec![0.2, 0.3]] {
            let input = StatePoint::new(input);
            assert_eq!(filter.process(&input).unwrap(), input);
        }
        assert!(filter.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut filter = MovingAverageFilter::default();
        filter.process(&point(&[0.2, 0.4])).unwrap();

        let err = filter.process(&point(&[0.2, 0.4, 0.6])).unwrap_err();
        assert!(matches!(
            err,
            ScratchpadError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_reset_forgets_dimensions() {
        let mut filter = MovingAverageFilter::default();
        filter.process(&point(&[0.2, 0.4])).unwrap();
        filter.reset();

        assert!(filter.is_empty());
        assert!(filter.process(&point(&[0.1, 0.2, 0.3])).is_ok());
    }

    #[test]
    fn test_zero_window_is_invalid() {
        assert!(MovingAverageFilter::new(FilterMode::MovingAverage { window: 0 }).is_err());
    }

    #[test]
    fn test_default_mode_uses_default_window() {
        assert_eq!(
            MovingAverageFilter::default().mode(),
            FilterMode::MovingAverage {
                window: DEFAULT_WINDOW
            }
        );
    }
}
