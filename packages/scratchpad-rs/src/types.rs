use crate::error::{Result, ScratchpadError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single brain/body state reading: one point in the raw feature space.
///
/// Components are conventionally in `[0, 1]` but the range is not enforced.
/// A `StatePoint` is never edited in place; updates produce a new point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePoint {
    components: Vec<f64>,
}

impl StatePoint {
    pub fn new(components: Vec<f64>) -> Self {
        Self { components }
    }

    /// All-zero point of the given arity
    pub fn zeros(dimensions: usize) -> Self {
        Self {
            components: vec![0.0; dimensions],
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.components.get(index).copied()
    }

    pub fn components(&self) -> &[f64] {
        &self.components
    }

    /// Copy of this point with one component replaced
    pub fn with_component(&self, index: usize, value: f64) -> Result<Self> {
        if index >= self.components.len() {
            return Err(ScratchpadError::IndexOutOfRange {
                index,
                len: self.components.len(),
            });
        }
        let mut components = self.components.clone();
        components[index] = value;
        Ok(Self { components })
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// Only indices present in both points contribute; callers keep arity
    /// fixed for a session so in practice every index matches.
    pub fn distance(&self, other: &StatePoint) -> f64 {
        self.components
            .iter()
            .zip(other.components.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Fail unless this point has exactly `expected` components
    pub fn ensure_dimensions(&self, expected: usize) -> Result<()> {
        if self.components.len() != expected {
            return Err(ScratchpadError::DimensionMismatch {
                expected,
                actual: self.components.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<f64>> for StatePoint {
    fn from(components: Vec<f64>) -> Self {
        Self::new(components)
    }
}

/// Parses one wire record: comma-separated decimals, e.g. `0.25,0.5,1`.
impl FromStr for StatePoint {
    type Err = ScratchpadError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ScratchpadError::Parse("empty state record".to_string()));
        }

        let components = line
            .split(',')
            .map(|token| {
                let token = token.trim();
                token
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| {
                        ScratchpadError::Parse(format!(
                            "'{}' is not a finite number in record '{}'",
                            token, line
                        ))
                    })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self { components })
    }
}

/// Formats as a wire record
impl fmt::Display for StatePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
