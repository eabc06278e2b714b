// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure coordinate math between padded layout space and screen space.
//!
//! Screen = pan + scale · padded, and padded = raw + translate. Every
//! function here is stateless.

use kurbo::{Point, Size, Vec2};
use treescope_layout::LayoutResult;

use crate::pose::CameraPose;

/// Smallest scale the inverse queries divide by.
const MIN_DIVISOR_SCALE: f64 = 1e-6;

/// Bounds `value` to `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics; if `min > max`, `max` wins.
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Returns `true` if `a` and `b` differ by less than `eps`.
#[must_use]
pub fn nearly_equal(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// Scale at which a `node` box fills `fill` of the more constrained canvas dimension.
///
/// Axes with a non-positive node extent are ignored; if both are, the scale is 1.
#[must_use]
pub fn focus_scale(canvas: Size, node: Size, fill: f64) -> f64 {
    let sx = (node.width > 0.0).then(|| fill * canvas.width / node.width);
    let sy = (node.height > 0.0).then(|| fill * canvas.height / node.height);
    let scale = match (sx, sy) {
        (Some(sx), Some(sy)) => sx.min(sy),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => 1.0,
    };
    if scale.is_finite() { scale } else { 1.0 }
}

/// Pose that puts the padded point `translate + point` at the canvas center.
///
/// This is the one centering formula: every "look at" in the camera goes
/// through it.
#[must_use]
pub fn center_on_point(point: Point, canvas: Size, scale: f64, translate: Vec2) -> CameraPose {
    let padded = point + translate;
    CameraPose::new(
        canvas.width / 2.0 - scale * padded.x,
        canvas.height / 2.0 - scale * padded.y,
        scale,
    )
}

/// Padded-space point currently under the canvas center.
#[must_use]
pub fn world_at_screen_center(pan: Vec2, scale: f64, canvas: Size) -> Point {
    let scale = divisor_scale(scale);
    Point::new(
        (canvas.width / 2.0 - pan.x) / scale,
        (canvas.height / 2.0 - pan.y) / scale,
    )
}

/// Pose at `to_scale` that keeps the padded point `fixed` where it is on screen.
#[must_use]
pub fn zoom_about(pan: Vec2, from_scale: f64, to_scale: f64, fixed: Point) -> CameraPose {
    let shifted = pan + (from_scale - to_scale) * fixed.to_vec2();
    CameraPose::new(shifted.x, shifted.y, to_scale)
}

pub(crate) fn divisor_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > MIN_DIVISOR_SCALE {
        scale
    } else {
        MIN_DIVISOR_SCALE
    }
}

/// The inputs every camera formula needs, captured from a layout and a canvas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CanvasGeometry {
    /// Size of the drawing surface.
    pub canvas: Size,
    /// Offset from raw layout space into padded space.
    pub translate: Vec2,
    /// Size of one node box.
    pub node: Size,
}

impl CanvasGeometry {
    /// Geometry of `layout` drawn on a canvas of its own size.
    #[must_use]
    pub fn from_layout(layout: &LayoutResult) -> Self {
        Self::with_canvas(layout, layout.canvas_size())
    }

    /// Geometry of `layout` drawn on a canvas of size `canvas`.
    #[must_use]
    pub fn with_canvas(layout: &LayoutResult, canvas: Size) -> Self {
        Self {
            canvas,
            translate: layout.translate(),
            node: layout.node_size(),
        }
    }

    /// See [`focus_scale`].
    #[must_use]
    pub fn focus_scale(&self, fill: f64) -> f64 {
        focus_scale(self.canvas, self.node, fill)
    }

    /// See [`center_on_point`]; `point` is in raw layout space.
    #[must_use]
    pub fn center_on(&self, point: Point, scale: f64) -> CameraPose {
        center_on_point(point, self.canvas, scale, self.translate)
    }

    /// See [`world_at_screen_center`].
    #[must_use]
    pub fn world_at_center(&self, pose: &CameraPose) -> Point {
        world_at_screen_center(pose.pan(), pose.scale, self.canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Size = Size::new(1000.0, 800.0);
    const NODE: Size = Size::new(360.0, 180.0);

    #[test]
    fn focus_scale_uses_tighter_axis() {
        let s = focus_scale(CANVAS, NODE, 0.55);
        let expected = f64::min(0.55 * 1000.0 / 360.0, 0.55 * 800.0 / 180.0);
        assert!(nearly_equal(s, expected, 1e-12));
        // Width is the constraint here.
        assert!(nearly_equal(s, 0.55 * 1000.0 / 360.0, 1e-12));
    }

    #[test]
    fn focus_scale_survives_degenerate_sizes() {
        assert_eq!(focus_scale(CANVAS, Size::ZERO, 0.55), 1.0);
        assert!(nearly_equal(
            focus_scale(CANVAS, Size::new(0.0, 200.0), 0.5),
            2.0,
            1e-12
        ));
        assert_eq!(focus_scale(Size::ZERO, NODE, 0.55), 0.0);
    }

    #[test]
    fn centering_round_trips() {
        let translate = Vec2::new(330.0, 230.0);
        for (point, scale) in [
            (Point::new(0.0, 0.0), 1.0),
            (Point::new(-275.6, 320.0), 1.527),
            (Point::new(1234.5, -17.25), 0.45),
            (Point::new(3.0, 9000.0), 2.5),
        ] {
            let pose = center_on_point(point, CANVAS, scale, translate);
            assert_eq!(pose.scale, scale);
            let back = world_at_screen_center(pose.pan(), pose.scale, CANVAS);
            let padded = point + translate;
            assert!(nearly_equal(back.x, padded.x, 1e-6), "{back:?} vs {padded:?}");
            assert!(nearly_equal(back.y, padded.y, 1e-6), "{back:?} vs {padded:?}");
        }
    }

    #[test]
    fn zoom_about_keeps_fixed_point_on_screen() {
        let pan = Vec2::new(-120.0, 45.0);
        let fixed = Point::new(640.0, 410.0);
        for (s0, s1) in [(1.0, 0.8), (0.45, 2.5), (2.5, 0.45), (1.3, 1.3), (0.01, 7.0)] {
            let before = CameraPose::new(pan.x, pan.y, s0).world_to_screen(fixed);
            let after = zoom_about(pan, s0, s1, fixed);
            assert_eq!(after.scale, s1);
            let now = after.world_to_screen(fixed);
            assert!(nearly_equal(before.x, now.x, 1e-9), "{before:?} vs {now:?}");
            assert!(nearly_equal(before.y, now.y, 1e-9), "{before:?} vs {now:?}");
        }
    }

    #[test]
    fn zoom_about_screen_center_keeps_center() {
        let pose = center_on_point(Point::new(10.0, 20.0), CANVAS, 1.5, Vec2::new(100.0, 50.0));
        let z = world_at_screen_center(pose.pan(), pose.scale, CANVAS);
        let zoomed = zoom_about(pose.pan(), pose.scale, 1.2, z);
        let still = world_at_screen_center(zoomed.pan(), zoomed.scale, CANVAS);
        assert!(nearly_equal(still.x, z.x, 1e-9));
        assert!(nearly_equal(still.y, z.y, 1e-9));
    }

    #[test]
    fn inverse_query_tolerates_zero_scale() {
        let p = world_at_screen_center(Vec2::ZERO, 0.0, CANVAS);
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn clamp_bounds_both_ways() {
        assert_eq!(clamp(0.2, 0.45, 2.5), 0.45);
        assert_eq!(clamp(3.0, 0.45, 2.5), 2.5);
        assert_eq!(clamp(1.0, 0.45, 2.5), 1.0);
        assert_eq!(clamp(1.0, 2.0, 0.5), 0.5);
    }
}
