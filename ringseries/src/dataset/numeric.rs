//! Arithmetic views and indicators for numeric datasets.

use super::Dataset;
use crate::element::Numeric;
use crate::error::{ArgumentError, ArithmeticError, Result};

impl<T: Numeric> Dataset<T> {
    /// Adds `x` to every element.
    pub fn plus(&self, x: T) -> Self {
        self.map(move |value| value.plus(x))
    }

    /// Subtracts `x` from every element; same as `plus(-x)`.
    pub fn sub(&self, x: T) -> Self {
        self.plus(x.negate())
    }

    /// Multiplies every element by `x`.
    pub fn mul(&self, x: T) -> Self {
        self.map(move |value| value.times(x))
    }

    /// Divides every element by `x`.
    ///
    /// Floating-point division follows IEEE 754.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::DivisionByZero`] if `x` is an integer zero.
    pub fn div(&self, x: T) -> Result<Self> {
        if T::default().divide(x).is_none() {
            return Err(ArithmeticError::DivisionByZero.into());
        }
        Ok(self.try_map(move |value| {
            value
                .divide(x)
                .ok_or_else(|| ArithmeticError::DivisionByZero.into())
        }))
    }

    /// Adjacent differences: element `i` is `v[i] - v[i + 1]`.
    pub fn differences(&self) -> Self {
        self.pairwise(|current, next| current.minus(next))
    }

    /// Adjacent ratios: element `i` is `v[i] / v[i + 1]`.
    ///
    /// Reading an element whose integer divisor is zero fails with
    /// [`ArithmeticError::ZeroDivisor`].
    pub fn ratios(&self) -> Self {
        self.try_pairwise(|index, current, next| {
            current.divide(next).ok_or_else(|| {
                ArithmeticError::ZeroDivisor { index: index + 1 }.into()
            })
        })
    }

    /// Returns this dataset as a plain generic view.
    ///
    /// Numeric datasets are already generic, so this is a cheap clone.
    #[must_use]
    pub fn boxed(&self) -> Self {
        self.clone()
    }
}

impl Dataset<f64> {
    /// Boolean view over adjacent pairs: element `i` is
    /// `crossing(v[i + 1], v[i])`, i.e. the predicate receives the previous
    /// and the current value of a descending series.
    pub fn crosses<P>(&self, crossing: P) -> Dataset<bool>
    where
        P: Fn(f64, f64) -> bool + Send + Sync + 'static,
    {
        self.pairwise(move |current, previous| crossing(previous, current))
    }

    /// Marks where the series moves from at or below `value` to above it.
    pub fn crosses_over(&self, value: f64) -> Dataset<bool> {
        self.crosses(move |prev, curr| prev <= value && curr > value)
    }

    /// Marks where the series moves from at or above `value` to below it.
    pub fn crosses_under(&self, value: f64) -> Dataset<bool> {
        self.crosses(move |prev, curr| prev >= value && curr < value)
    }

    /// Fractal dimension index over the window `[index, index + n)`.
    ///
    /// A flat window yields `1.5`. Values near 1 indicate a trending series,
    /// values near 2 a choppy one.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::NotPositive`] if `n` is zero and
    /// [`crate::error::IndexError::OutOfRange`] if the window runs past the
    /// end of the dataset.
    #[allow(clippy::cast_precision_loss)]
    pub fn fdi(&self, n: usize, index: usize) -> Result<f64> {
        if n == 0 {
            return Err(ArgumentError::NotPositive { name: "n" }.into());
        }
        let window = (0..n)
            .map(|i| self.get(index + i))
            .collect::<Result<Vec<f64>>>()?;

        let (min, max) = window
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        let range = max - min;
        if range == 0.0 {
            return Ok(1.5);
        }

        let step = 1.0 / ((n - 1) as f64).powi(2);
        let length: f64 = window
            .windows(2)
            .map(|pair| {
                let diff = (pair[1] - pair[0]) / range;
                (diff * diff + step).sqrt()
            })
            .sum();

        Ok(1.0 + (length.ln() + 2f64.ln()) / (2.0 * (n - 1) as f64).ln())
    }
}
