// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Treescope Camera: pan/zoom state and focus transitions over a tree layout.
//!
//! A [`Camera`] shows a [`LayoutResult`](treescope_layout::LayoutResult) on a
//! canvas through a [`CameraPose`] (pan plus uniform scale) and is in one of
//! two [`CameraMode`]s: the whole tree at scale 1, or one node centered and
//! enlarged.
//!
//! - The [`transform`] module holds the stateless math: focus scale,
//!   centering, zoom about a fixed point, and the inverse queries.
//! - [`Camera::focus_node`] runs a three-phase move to a node: ease out about
//!   the screen center, cross to the midpoint between the two nodes, and
//!   settle on the target at focus scale.
//! - [`Camera::zoom_to_overview`] and [`Camera::recenter`] return to the
//!   resting pose of a mode.
//! - [`Navigation`] intents and screen-space clicks resolve to nodes and
//!   then focus them.
//!
//! ## Driving the camera
//!
//! Commands are futures and the camera has no clock. A host polls the
//! futures on a single-threaded executor and calls [`Camera::advance`] with
//! the frame delta; each phase starts when the previous one's tween ends.
//! A newer command supersedes an older one mid-flight, and the older future
//! resolves to [`Transition::Superseded`].
//!
//! ```rust
//! use treescope_camera::transform;
//! use kurbo::{Point, Size, Vec2};
//!
//! let canvas = Size::new(1000.0, 800.0);
//! let scale = transform::focus_scale(canvas, Size::new(360.0, 180.0), 0.55);
//! let pose = transform::center_on_point(Point::ZERO, canvas, scale, Vec2::new(300.0, 200.0));
//!
//! // The padded point lands at the canvas center.
//! let center = pose.world_to_screen(Point::new(300.0, 200.0));
//! assert!((center - Point::new(500.0, 400.0)).hypot() < 1e-9);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies.
//! - `libm`: `no_std` builds that rely on `libm` for floating-point math.
//! - `serde`: derives `Serialize`/`Deserialize` for poses, modes, and
//!   configuration.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod camera;
mod navigation;
mod pose;
pub mod transform;
mod tween;

pub use camera::{Camera, CameraConfig, CameraInit, CameraSnapshot, Phase, Transition};
pub use navigation::{DefaultPolicy, Navigation, NavigationPolicy, WrapMode, ancestry};
pub use pose::{CameraMode, CameraPose};
pub use transform::CanvasGeometry;
pub use tween::{Easing, Tween};
