//! Signal smoothing for landmark trajectories.

use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::types::Position3D;

/// Savitzky-Golay filter for smoothing while preserving peaks
#[derive(Debug, Clone)]
pub struct SavitzkyGolayFilter {
    window_size: usize,
    poly_order: usize,
    /// Row `i` evaluates the window's least-squares polynomial at offset `i`
    projection: DMatrix<f64>,
}

impl SavitzkyGolayFilter {
    /// Create new Savitzky-Golay filter
    ///
    /// # Arguments
    /// * `window_size` - Must be odd and > poly_order
    /// * `poly_order` - Polynomial order (typically 2 or 3)
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        if window_size % 2 == 0 {
            return Err(Error::InvalidFilter(format!(
                "window size must be odd, got {window_size}"
            )));
        }
        if window_size <= poly_order {
            return Err(Error::InvalidFilter(format!(
                "window size {window_size} must exceed polynomial order {poly_order}"
            )));
        }

        let projection = Self::compute_projection(window_size, poly_order)?;

        Ok(Self {
            window_size,
            poly_order,
            projection,
        })
    }

    /// Hat matrix A (AᵀA)⁻¹ Aᵀ of the window's Vandermonde matrix
    fn compute_projection(window_size: usize, poly_order: usize) -> Result<DMatrix<f64>> {
        let half = (window_size / 2) as f64;
        let a = DMatrix::from_fn(window_size, poly_order + 1, |i, j| {
            (i as f64 - half).powi(j as i32)
        });

        let normal = a.transpose() * &a;
        let inverse = normal
            .try_inverse()
            .ok_or_else(|| Error::InvalidFilter("singular normal matrix".to_string()))?;

        Ok(&a * inverse * a.transpose())
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn poly_order(&self) -> usize {
        self.poly_order
    }

    /// Convolution coefficients applied at the center of the window
    pub fn coefficients(&self) -> Vec<f64> {
        self.projection.row(self.window_size / 2).iter().copied().collect()
    }

    /// Filter a signal using Savitzky-Golay smoothing.
    ///
    /// The first and last half-window are evaluated on the polynomial fitted
    /// to the first and last full window. Signals shorter than the window are
    /// returned unchanged.
    pub fn filter_signal(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        let w = self.window_size;
        if n < w {
            return signal.to_vec();
        }

        let half = w / 2;
        let apply = |row: usize, start: usize| -> f64 {
            (0..w)
                .map(|j| self.projection[(row, j)] * signal[start + j])
                .sum()
        };

        (0..n)
            .map(|i| {
                if i < half {
                    apply(i, 0)
                } else if i >= n - half {
                    apply(i - (n - w), n - w)
                } else {
                    apply(half, i - half)
                }
            })
            .collect()
    }

    /// Smooth each coordinate of a 3D trajectory independently
    pub fn filter_positions(&self, positions: &[Position3D]) -> Vec<Position3D> {
        let xs: Vec<f64> = positions.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = positions.iter().map(|p| p.y).collect();
        let zs: Vec<f64> = positions.iter().map(|p| p.z).collect();

        let xs = self.filter_signal(&xs);
        let ys = self.filter_signal(&ys);
        let zs = self.filter_signal(&zs);

        xs.into_iter()
            .zip(ys)
            .zip(zs)
            .map(|((x, y), z)| Position3D::new(x, y, z))
            .collect()
    }
}
