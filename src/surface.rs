//! Time Surface - dense activity snapshot around an event
//!
//! The values are produced by an external kernel. This type only carries
//! the matrix and the arithmetic the modifiers and initializers need.

use crate::error::{HotsError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major `width x height` matrix of decayed activity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSurface {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl TimeSurface {
    /// Create a zero-initialized surface.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            values: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Create a surface filled with one value.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            values: vec![value; width * height],
            width,
            height,
        }
    }

    /// Create from row-major values.
    pub fn from_vec(width: usize, height: usize, values: Vec<f32>) -> Result<Self> {
        if values.len() != width * height {
            return Err(HotsError::Config(format!(
                "surface of {}x{} needs {} values, got {}",
                width,
                height,
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            values,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.width + x] = value;
    }

    /// Raw row-major values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn same_shape(&self, other: &TimeSurface) -> bool {
        self.shape() == other.shape()
    }

    /// `self += factor * other`.
    pub fn add_scaled(&mut self, other: &TimeSurface, factor: f32) {
        debug_assert!(self.same_shape(other));
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += factor * b;
        }
    }

    /// Move every value toward `other`: `self += (other - self) * factor`.
    pub fn blend_toward(&mut self, other: &TimeSurface, factor: f32) {
        debug_assert!(self.same_shape(other));
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += (b - *a) * factor;
        }
    }

    pub fn sum(&self) -> f32 {
        self.values.iter().sum()
    }

    /// Euclidean distance to another surface of the same shape.
    pub fn distance(&self, other: &TimeSurface) -> f32 {
        debug_assert!(self.same_shape(other));
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }

    /// Largest absolute difference to another surface.
    pub fn max_abs_diff(&self, other: &TimeSurface) -> f32 {
        debug_assert!(self.same_shape(other));
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_len() {
        assert!(TimeSurface::from_vec(2, 2, vec![0.0; 4]).is_ok());
        assert!(matches!(
            TimeSurface::from_vec(2, 2, vec![0.0; 3]),
            Err(HotsError::Config(_))
        ));
    }

    #[test]
    fn test_row_major_layout() {
        let ts = TimeSurface::from_vec(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(ts.get(2, 0), 2.0);
        assert_eq!(ts.get(0, 1), 3.0);
        assert_eq!(ts.shape(), (3, 2));
    }

    #[test]
    fn test_add_scaled_and_distance() {
        let mut a = TimeSurface::zeros(2, 2);
        let b = TimeSurface::filled(2, 2, 1.0);
        a.add_scaled(&b, 0.5);

        assert!((a.sum() - 2.0).abs() < 1e-6);
        assert!((a.distance(&b) - 1.0).abs() < 1e-6);
        assert!((a.max_abs_diff(&b) - 0.5).abs() < 1e-6);
    }
}
