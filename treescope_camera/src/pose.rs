// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera pose and mode.

use alloc::string::String;

use kurbo::{Affine, Point, Vec2};

use crate::transform::{divisor_scale, nearly_equal};

/// Pan offset and uniform zoom applied on top of padded layout space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraPose {
    /// Horizontal pan, in screen units.
    pub x: f64,
    /// Vertical pan, in screen units.
    pub y: f64,
    /// Zoom factor.
    pub scale: f64,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::OVERVIEW
    }
}

impl CameraPose {
    /// The overview pose: no pan, scale 1.
    pub const OVERVIEW: Self = Self::new(0.0, 0.0, 1.0);

    /// Creates a pose.
    #[must_use]
    pub const fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// The pan as a vector.
    #[must_use]
    pub const fn pan(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Linear interpolation from `self` (`t = 0`) to `other` (`t = 1`), per component.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.scale + (other.scale - self.scale) * t,
        )
    }

    /// Returns `true` if every component is within `tolerance` of `other`'s.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        nearly_equal(self.x, other.x, tolerance)
            && nearly_equal(self.y, other.y, tolerance)
            && nearly_equal(self.scale, other.scale, tolerance)
    }

    /// Map from padded space to screen space.
    #[must_use]
    pub fn to_screen_affine(&self) -> Affine {
        Affine::translate(self.pan()) * Affine::scale(self.scale)
    }

    /// Map from raw layout space to screen space, given the layout's `translate`.
    ///
    /// This is `translate(pan) · scale(s) · translate(translate)`, the order a
    /// renderer nests its transforms in.
    #[must_use]
    pub fn to_affine(&self, translate: Vec2) -> Affine {
        self.to_screen_affine() * Affine::translate(translate)
    }

    /// Screen position of a padded-space point.
    #[must_use]
    pub fn world_to_screen(&self, padded: Point) -> Point {
        Point::new(
            self.x + self.scale * padded.x,
            self.y + self.scale * padded.y,
        )
    }

    /// Padded-space point under a screen position.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let scale = divisor_scale(self.scale);
        Point::new((screen.x - self.x) / scale, (screen.y - self.y) / scale)
    }
}

/// What the camera is showing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CameraMode {
    /// The whole tree at scale 1.
    Overview,
    /// One node centered and enlarged.
    Focus(String),
}

impl CameraMode {
    /// Id of the focused node, if any.
    #[must_use]
    pub fn focused_id(&self) -> Option<&str> {
        match self {
            Self::Overview => None,
            Self::Focus(id) => Some(id.as_str()),
        }
    }

    /// Returns `true` in overview mode.
    #[must_use]
    pub fn is_overview(&self) -> bool {
        matches!(self, Self::Overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_matches_component_math() {
        let pose = CameraPose::new(-40.0, 25.0, 1.75);
        let translate = Vec2::new(300.0, 230.0);
        let raw = Point::new(-120.0, 320.0);
        let via_affine = pose.to_affine(translate) * raw;
        let via_fn = pose.world_to_screen(raw + translate);
        assert!((via_affine - via_fn).hypot() < 1e-9);
    }

    #[test]
    fn screen_and_world_are_inverse() {
        let pose = CameraPose::new(12.0, -7.5, 0.8);
        let p = Point::new(410.0, 95.0);
        let back = pose.screen_to_world(pose.world_to_screen(p));
        assert!((back - p).hypot() < 1e-9);
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = CameraPose::OVERVIEW;
        let b = CameraPose::new(100.0, -50.0, 2.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), CameraPose::new(50.0, -25.0, 1.5));
    }

    #[test]
    fn approx_eq_uses_tolerance() {
        let a = CameraPose::new(1.0, 2.0, 1.0);
        assert!(a.approx_eq(&CameraPose::new(1.005, 2.0, 0.995), 1e-2));
        assert!(!a.approx_eq(&CameraPose::new(1.02, 2.0, 1.0), 1e-2));
    }

    #[test]
    fn mode_reports_focus() {
        assert_eq!(CameraMode::Overview.focused_id(), None);
        assert_eq!(CameraMode::Focus("a".into()).focused_id(), Some("a"));
        assert!(CameraMode::Overview.is_overview());
    }
}
