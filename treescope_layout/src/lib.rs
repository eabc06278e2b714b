// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Treescope Layout: tidy-tree placement for navigable node diagrams.
//!
//! This crate turns a rooted tree of content nodes into 2D positions that a
//! renderer can draw and a camera can navigate.
//!
//! - [`RawNode`] is the nested authoring shape (children embedded).
//! - [`TreeData`] is the validated id-indexed table built from it, with a
//!   [`NodeKind`] assigned to every node by a [`KindResolver`].
//! - [`LayoutResult::compute`] places every node with a tidy-tree algorithm and
//!   derives extents plus a padded canvas that contains every node box.
//!
//! ## Coordinate spaces
//!
//! Positions are box centers in *raw* layout space: the root sits at the
//! origin, depth grows along +y, and x may be negative. Adding
//! [`LayoutResult::translate`] maps a raw point into *padded* space, where
//! every node box lies inside `[0, width] × [0, height]` with one gap of
//! margin on each side. Screen space (pan and zoom) is layered on top of the
//! padded space by `treescope_camera`.
//!
//! ## Placement rules
//!
//! - Siblings sit at least `node_width + gap_x` apart, and depth levels
//!   `node_height + gap_y` apart.
//! - A parent is centered over the span of its children.
//! - Adjacent nodes with different parents get twice the sibling separation,
//!   and either neighbor being a hub multiplies it by
//!   [`LayoutConfig::hub_weight`].
//! - The same tree and config always produce the same positions.
//!
//! ## Example
//!
//! ```rust
//! use treescope_layout::{LayoutConfig, LayoutResult, RawNode};
//!
//! let raw = RawNode::new("root", "Home").with_children([
//!     RawNode::new("projects", "Projects").with_child(RawNode::new("p1", "Compiler")),
//!     RawNode::new("contact", "Contact"),
//! ]);
//!
//! let layout = LayoutResult::from_raw(&raw, &LayoutConfig::default()).unwrap();
//! assert_eq!(layout.len(), 4);
//! assert_eq!(layout.nodes()[0].id, "root");
//!
//! // Every box fits inside the padded canvas.
//! let p1 = layout.index_of("p1").unwrap();
//! let center = layout.padded_position(p1).unwrap();
//! assert!(center.x > 0.0 && center.x < layout.width());
//! ```
//!
//! Malformed tables are rejected before layout:
//!
//! ```rust
//! use treescope_layout::{LayoutError, NodeKind, TreeData, TreeNode};
//!
//! let err = TreeData::from_parts([TreeNode::new("a", "A", NodeKind::Root)], "x").unwrap_err();
//! assert!(matches!(err, LayoutError::MissingRoot { .. }));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies.
//! - `libm`: `no_std` builds that rely on `libm` for floating-point math.
//! - `serde`: derives `Serialize`/`Deserialize` for [`RawNode`], [`TreeNode`],
//!   [`NodeKind`], and [`LayoutConfig`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod kind;
mod layout;
mod tidy;
mod tree;

pub use error::LayoutError;
pub use kind::{DefaultResolver, KindResolver, NodeKind};
pub use layout::{LayoutConfig, LayoutIx, LayoutNode, LayoutResult, Link};
pub use tree::{RawNode, TreeData, TreeNode};
