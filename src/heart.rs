//! Heart curve sampling.
//!
//! The outline is sampled once at startup and never mutated afterwards;
//! particles chase its points for the rest of the session.

use std::f32::consts::TAU;

use egui::Vec2;

/// Point on the parametric heart curve, unscaled.
///
/// x = sin^3(rad), y = -(13 cos(rad) - 5 cos(2 rad) - 2 cos(3 rad) - cos(4 rad))
pub fn heart_point(rad: f32) -> Vec2 {
    let x = rad.sin().powi(3);
    let y = -(13.0 * rad.cos()
        - 5.0 * (2.0 * rad).cos()
        - 2.0 * (3.0 * rad).cos()
        - (4.0 * rad).cos());
    Vec2::new(x, y)
}

/// Fixed, ordered set of attraction targets sampled from the heart curve.
/// Shape-local coordinates, origin at the heart's center.
pub struct Outline {
    points: Vec<Vec2>,
}

impl Outline {
    /// Sample every layer at `detail` radian increments and concatenate.
    /// Each layer contributes ceil(2*pi / detail) points, scaled componentwise.
    pub fn sample(layers: &[[f32; 2]], detail: f32) -> Self {
        let detail = detail.max(0.001);
        let per_layer = (TAU / detail).ceil() as usize;

        let mut points = Vec::with_capacity(per_layer * layers.len());
        for &[sx, sy] in layers {
            for i in 0..per_layer {
                let p = heart_point(i as f32 * detail);
                points.push(Vec2::new(p.x * sx, p.y * sy));
            }
        }

        // A degenerate layer set still yields one target.
        if points.is_empty() {
            points.push(Vec2::ZERO);
        }

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, which must be in range.
    pub fn point(&self, index: usize) -> Vec2 {
        self.points[index]
    }

    /// Wrap any signed index into [0, len).
    pub fn wrap(&self, index: i64) -> usize {
        index.rem_euclid(self.points.len() as i64) as usize
    }
}
