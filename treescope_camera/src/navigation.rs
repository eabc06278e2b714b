// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolving navigation intents to layout nodes.
//!
//! Structural intents ([`Navigation::Parent`], [`Navigation::NextSibling`], …)
//! follow the tree. Directional intents ([`Navigation::Up`], …) pick the
//! nearest node in that direction on the laid-out diagram and fall back to
//! the matching structural move when nothing lies that way.

use smallvec::SmallVec;
use treescope_layout::{LayoutIx, LayoutResult};

/// A request to move focus relative to the current node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Navigation {
    /// The parent of the current node.
    Parent,
    /// The first child of the current node.
    FirstChild,
    /// The child at this position among the current node's children.
    Child(usize),
    /// The sibling after the current node.
    NextSibling,
    /// The sibling before the current node.
    PrevSibling,
    /// The root.
    Root,
    /// The nearest node above.
    Up,
    /// The nearest node below.
    Down,
    /// The nearest node to the left.
    Left,
    /// The nearest node to the right.
    Right,
}

/// What sibling moves do at the ends of a sibling list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapMode {
    /// Stop at the first and last sibling.
    Never,
    /// Wrap from the last sibling to the first and back.
    #[default]
    Siblings,
}

/// Chooses the node a navigation intent lands on.
pub trait NavigationPolicy {
    /// Target of `navigation` starting at `origin`, or `None` if there is nowhere to go.
    fn next(
        &self,
        layout: &LayoutResult,
        origin: LayoutIx,
        navigation: Navigation,
    ) -> Option<LayoutIx>;
}

/// Tree-structural moves plus nearest-in-direction spatial moves.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultPolicy {
    /// Wrap behavior for sibling moves.
    pub wrap: WrapMode,
}

impl NavigationPolicy for DefaultPolicy {
    fn next(
        &self,
        layout: &LayoutResult,
        origin: LayoutIx,
        navigation: Navigation,
    ) -> Option<LayoutIx> {
        let node = layout.node(origin)?;
        match navigation {
            Navigation::Parent => node.parent,
            Navigation::FirstChild => node.children.first().copied(),
            Navigation::Child(n) => node.children.get(n).copied(),
            Navigation::NextSibling => self.sibling(layout, origin, Step::Forward),
            Navigation::PrevSibling => self.sibling(layout, origin, Step::Backward),
            Navigation::Root => layout.first().map(|_| LayoutIx::ROOT),
            Navigation::Up | Navigation::Down | Navigation::Left | Navigation::Right => {
                next_directional(layout, origin, navigation).or_else(|| {
                    let fallback = match navigation {
                        Navigation::Up => Navigation::Parent,
                        Navigation::Down => Navigation::FirstChild,
                        Navigation::Left => Navigation::PrevSibling,
                        _ => Navigation::NextSibling,
                    };
                    self.next(layout, origin, fallback)
                })
            }
        }
    }
}

#[derive(Copy, Clone)]
enum Step {
    Forward,
    Backward,
}

impl DefaultPolicy {
    fn sibling(&self, layout: &LayoutResult, origin: LayoutIx, step: Step) -> Option<LayoutIx> {
        let parent = layout.node(layout.node(origin)?.parent?)?;
        let siblings = parent.children.as_slice();
        let pos = siblings.iter().position(|&s| s == origin)?;
        let last = siblings.len() - 1;
        let wrap = self.wrap == WrapMode::Siblings;
        let next = match step {
            Step::Forward if pos < last => pos + 1,
            Step::Forward if wrap => 0,
            Step::Backward if pos > 0 => pos - 1,
            Step::Backward if wrap => last,
            _ => return None,
        };
        (next != pos).then(|| siblings[next])
    }
}

fn next_directional(
    layout: &LayoutResult,
    origin: LayoutIx,
    direction: Navigation,
) -> Option<LayoutIx> {
    let oc = layout.node(origin)?.position;

    let mut best: Option<LayoutIx> = None;
    let mut best_score = f64::INFINITY;

    for (ix, candidate) in layout.iter() {
        if ix == origin {
            continue;
        }
        let d = candidate.position - oc;
        let (primary, secondary, forward_sign) = match direction {
            Navigation::Right => (d.x, d.y, 1.0),
            Navigation::Left => (d.x, d.y, -1.0),
            Navigation::Down => (d.y, d.x, 1.0),
            Navigation::Up => (d.y, d.x, -1.0),
            _ => return None,
        };

        // Only the forward half-plane counts.
        if forward_sign * primary <= 0.0 {
            continue;
        }

        // Favor closer candidates and penalize off-axis motion.
        let score = primary.abs() + 4.0 * secondary.abs();
        if score.is_finite() && score < best_score {
            best_score = score;
            best = Some(ix);
        }
    }

    best
}

/// The path from the root down to `ix`, both ends included.
///
/// Empty if `ix` is not in `layout`.
#[must_use]
pub fn ancestry(layout: &LayoutResult, ix: LayoutIx) -> SmallVec<[LayoutIx; 8]> {
    let mut path = SmallVec::new();
    let mut cursor = layout.node(ix).map(|_| ix);
    while let Some(current) = cursor {
        path.push(current);
        cursor = layout.node(current).and_then(|n| n.parent);
    }
    path.reverse();
    path
}
