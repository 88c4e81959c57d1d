//! Falloff law mapping a normalized distance in [0, 1] to an intensity in [0, 1].
//!
//! A piecewise curve through designer-authored control points. Inputs outside the
//! configured domain clamp to the nearest endpoint. Curves are expected to be
//! non-increasing towards the edge of a stamp, but any shape is accepted.

use crate::config::{CurveConfig, Interpolation};
use crate::error::CurveError;

#[derive(Clone, Debug, PartialEq)]
pub struct ResponseCurve {
    /// Sorted by input, never empty.
    points: Vec<(f32, f32)>,
    interpolation: Interpolation,
}

impl ResponseCurve {
    pub fn new(
        control_points: Vec<(f32, f32)>,
        interpolation: Interpolation,
    ) -> Result<Self, CurveError> {
        if control_points.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, &(input, output)) in control_points.iter().enumerate() {
            if !input.is_finite() || !output.is_finite() {
                return Err(CurveError::NonFinite { index });
            }
            if !(0.0..=1.0).contains(&input) || !(0.0..=1.0).contains(&output) {
                return Err(CurveError::OutOfRange {
                    index,
                    input,
                    output,
                });
            }
        }
        let mut points = control_points;
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self {
            points,
            interpolation,
        })
    }

    pub fn from_config(config: &CurveConfig) -> Result<Self, CurveError> {
        Self::new(config.control_points.clone(), config.interpolation)
    }

    /// `output = input` over [0, 1].
    pub fn linear() -> Self {
        Self {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
            interpolation: Interpolation::Linear,
        }
    }

    pub fn control_points(&self) -> &[(f32, f32)] {
        &self.points
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn evaluate(&self, normalized_distance: f32) -> f32 {
        let x = if normalized_distance.is_nan() {
            0.0
        } else {
            normalized_distance
        };

        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }

        // First point strictly right of x; bounded to 1..len by the endpoint checks above.
        let hi = self.points.partition_point(|p| p.0 <= x);
        let (x0, y0) = self.points[hi - 1];
        let (x1, y1) = self.points[hi];
        let span = x1 - x0;
        if span <= 0.0 {
            return y1;
        }
        let t = (x - x0) / span;
        let t = match self.interpolation {
            Interpolation::Linear => t,
            Interpolation::Smooth => t * t * (3.0 - 2.0 * t),
        };
        (y0 + (y1 - y0) * t).clamp(0.0, 1.0)
    }
}
