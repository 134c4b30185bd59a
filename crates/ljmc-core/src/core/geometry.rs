use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("Box edge length must be positive and finite, got {0}")]
    InvalidBoxLength(f64),
}

/// A cubic simulation cell with periodic boundaries on all three axes.
///
/// The edge length is validated once on construction, so the wrapping and
/// minimum-image operations below are infallible and cheap enough for the
/// inner loops of the energy evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    length: f64,
}

impl SimulationBox {
    pub fn new(length: f64) -> Result<Self, GeometryError> {
        if !length.is_finite() || length <= 0.0 {
            return Err(GeometryError::InvalidBoxLength(length));
        }
        Ok(Self { length })
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn half_length(&self) -> f64 {
        0.5 * self.length
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.length.powi(3)
    }

    /// Maps every coordinate of `position` into `[0, L)`.
    #[inline]
    pub fn wrap(&self, position: &Point3<f64>) -> Point3<f64> {
        Point3::from(position.coords.map(|x| wrap_coordinate(x, self.length)))
    }

    /// Shortest periodic image of `displacement`, each component in `[-L/2, L/2]`.
    #[inline]
    pub fn minimum_image(&self, displacement: &Vector3<f64>) -> Vector3<f64> {
        let l = self.length;
        displacement.map(|d| d - l * (d / l).round())
    }

    #[inline]
    pub fn distance_squared(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.minimum_image(&(a - b)).norm_squared()
    }

    pub fn contains(&self, position: &Point3<f64>) -> bool {
        position.iter().all(|&x| (0.0..self.length).contains(&x))
    }
}

/// Wraps `position` into a cubic box of edge `box_length`.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidBoxLength`] when `box_length` is not positive.
pub fn wrap(position: &Point3<f64>, box_length: f64) -> Result<Point3<f64>, GeometryError> {
    Ok(SimulationBox::new(box_length)?.wrap(position))
}

/// Minimum-image form of `displacement` in a cubic box of edge `box_length`.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidBoxLength`] when `box_length` is not positive.
pub fn minimum_image(
    displacement: &Vector3<f64>,
    box_length: f64,
) -> Result<Vector3<f64>, GeometryError> {
    Ok(SimulationBox::new(box_length)?.minimum_image(displacement))
}

#[inline]
fn wrap_coordinate(x: f64, length: f64) -> f64 {
    let wrapped = x.rem_euclid(length);
    // rem_euclid of a tiny negative value rounds up to exactly `length`
    if wrapped >= length { 0.0 } else { wrapped }
}
