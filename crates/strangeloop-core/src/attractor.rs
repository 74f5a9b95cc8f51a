//! Rössler attractor signal generation
//!
//! Explicit Euler integration of the three coupled equations, plus the
//! per-axis min/max normalization that maps each coordinate into [0, 1]
//! for the conditioner. Scaling each axis by its own extrema distorts the
//! attractor's classical shape.

use serde::{Deserialize, Serialize};

use crate::instrument::Axis;

/// Rössler system coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RosslerParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for RosslerParams {
    fn default() -> Self {
        Self { a: 0.3, b: 0.21, c: 5.0 }
    }
}

/// The three integrated coordinate series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl AxisSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Borrow one coordinate series by axis label
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Integrate the Rössler system with the explicit Euler method
///
/// `start` is the initial (x, y, z) point and leads each returned series,
/// so the output length is `steps + 1`.
pub fn integrate(
    params: RosslerParams,
    start: (f64, f64, f64),
    steps: usize,
    step_size: f64,
) -> AxisSeries {
    let mut series = AxisSeries {
        x: Vec::with_capacity(steps + 1),
        y: Vec::with_capacity(steps + 1),
        z: Vec::with_capacity(steps + 1),
    };

    let (mut x, mut y, mut z) = start;
    series.x.push(x);
    series.y.push(y);
    series.z.push(z);

    for _ in 0..steps {
        let x_dot = -y - z;
        let y_dot = x + params.a * y;
        let z_dot = params.b + z * (x - params.c);

        x += x_dot * step_size;
        y += y_dot * step_size;
        z += z_dot * step_size;

        series.x.push(x);
        series.y.push(y);
        series.z.push(z);
    }

    series
}

/// Scale a series into [0, 1] by its own extrema
///
/// A constant series has no range to scale by and maps to all zeros.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let (min, max) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if max == min {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_first_step() {
        let params = RosslerParams::default();
        let series = integrate(params, (1.0, 1.0, 1.0), 1, 0.01);
        assert_eq!(series.len(), 2);
        assert_eq!((series.x[0], series.y[0], series.z[0]), (1.0, 1.0, 1.0));

        // x' = -y - z = -2; y' = x + a*y = 1.3; z' = b + z*(x - c) = -3.79
        assert!((series.x[1] - 0.98).abs() < 1e-12);
        assert!((series.y[1] - 1.013).abs() < 1e-12);
        assert!((series.z[1] - 0.9621).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_length() {
        let series = integrate(RosslerParams::default(), (0.1, 0.1, 0.1), 100, 0.01);
        assert_eq!(series.x.len(), 101);
        assert_eq!(series.y.len(), 101);
        assert_eq!(series.z.len(), 101);
    }

    #[test]
    fn test_normalize_range() {
        assert_eq!(normalize(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_constant_axis() {
        assert_eq!(normalize(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalized_orbit_stays_in_unit_range() {
        let series = integrate(RosslerParams::default(), (0.1, 0.1, 0.1), 2000, 0.01);
        for axis in Axis::ALL {
            let normalized = normalize(series.axis(axis));
            assert!(normalized.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }
}
