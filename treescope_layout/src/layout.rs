// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout results: placed nodes, links, extents, and the padded canvas.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{CubicBez, Point, Rect, Size, Vec2};

use crate::error::LayoutError;
use crate::kind::NodeKind;
use crate::tidy::Tidy;
use crate::tree::{RawNode, TreeData};

/// Sizing parameters for a layout.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Width of every node box.
    pub node_width: f64,
    /// Height of every node box.
    pub node_height: f64,
    /// Horizontal gap between sibling boxes.
    pub gap_x: f64,
    /// Vertical gap between depth levels.
    pub gap_y: f64,
    /// Extra separation factor applied when either neighbor is a hub.
    ///
    /// `1.0` disables the weighting.
    pub hub_weight: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 360.0,
            node_height: 180.0,
            gap_x: 64.0,
            gap_y: 140.0,
            hub_weight: 1.3,
        }
    }
}

impl LayoutConfig {
    /// Size of one node box.
    #[must_use]
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    fn separation(&self, a: NodeKind, b: NodeKind, siblings: bool) -> f64 {
        let base = if siblings { 1.0 } else { 2.0 };
        if a.is_hub() || b.is_hub() {
            base * self.hub_weight
        } else {
            base
        }
    }
}

/// Index of a node within a [`LayoutResult`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutIx(u32);

impl LayoutIx {
    /// The root is always first.
    pub const ROOT: Self = Self(0);

    /// Position in [`LayoutResult::nodes`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(idx: usize) -> Self {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "LayoutIx uses 32-bit indices by design."
        )]
        Self(idx as u32)
    }
}

/// A placed node.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    /// Id of the source [`TreeNode`](crate::TreeNode).
    pub id: String,
    /// Title of the source node.
    pub title: String,
    /// Kind of the source node.
    pub kind: NodeKind,
    /// Center of the node box in raw layout space.
    pub position: Point,
    /// Distance from the root.
    pub depth: u32,
    /// Parent, or `None` for the root.
    pub parent: Option<LayoutIx>,
    /// Children in display order.
    pub children: Vec<LayoutIx>,
}

/// A parent→child edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    /// The parent.
    pub source: LayoutIx,
    /// The child.
    pub target: LayoutIx,
}

/// The complete output of one layout pass.
///
/// A result is never patched: when the tree or the sizing parameters change,
/// compute a new one and replace the old one wholesale.
#[derive(Clone, Debug, Default)]
pub struct LayoutResult {
    nodes: Vec<LayoutNode>,
    links: Vec<Link>,
    by_id: HashMap<String, LayoutIx>,
    config: LayoutConfig,
    width: f64,
    height: f64,
    translate: Vec2,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl LayoutResult {
    /// A layout with no nodes and a zero-sized canvas.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lays out a nested tree with the default kind resolver.
    pub fn from_raw(raw: &RawNode, config: &LayoutConfig) -> Result<Self, LayoutError> {
        Ok(Self::compute(&TreeData::from_raw(raw)?, config))
    }

    /// Lays out validated tree data.
    pub fn compute(tree: &TreeData, config: &LayoutConfig) -> Self {
        let mut tidy = Tidy::new();
        let mut nodes: Vec<LayoutNode> = Vec::with_capacity(tree.len());
        let mut links = Vec::with_capacity(tree.len().saturating_sub(1));

        // Pre-order walk; ids resolve because `TreeData` is validated.
        let mut stack = vec![(tree.root(), None::<LayoutIx>, 0_u32)];
        while let Some((node, parent, depth)) = stack.pop() {
            let idx = tidy.push(parent.map(LayoutIx::index));
            let ix = LayoutIx::from_index(idx);
            if let Some(parent) = parent {
                nodes[parent.index()].children.push(ix);
                links.push(Link {
                    source: parent,
                    target: ix,
                });
            }
            nodes.push(LayoutNode {
                id: node.id.clone(),
                title: node.title.clone(),
                kind: node.kind,
                position: Point::ZERO,
                depth,
                parent,
                children: Vec::new(),
            });
            for child in node.children.iter().rev() {
                if let Some(child) = tree.get(child) {
                    stack.push((child, Some(ix), depth + 1));
                }
            }
        }

        if nodes.len() < tree.len() {
            tracing::warn!(
                unreachable = tree.len() - nodes.len(),
                root = tree.root_id(),
                "nodes not reachable from the root are left out of the layout"
            );
        }

        let kinds: Vec<NodeKind> = nodes.iter().map(|n| n.kind).collect();
        let units = tidy.place(|a, b, siblings| config.separation(kinds[a], kinds[b], siblings));

        let dx = config.node_width + config.gap_x;
        let dy = config.node_height + config.gap_y;
        for (node, x) in nodes.iter_mut().zip(units) {
            node.position = Point::new(x * dx, f64::from(node.depth) * dy);
        }

        let mut result = Self {
            by_id: nodes
                .iter()
                .enumerate()
                .map(|(i, n)| (n.id.clone(), LayoutIx::from_index(i)))
                .collect(),
            nodes,
            links,
            config: *config,
            ..Self::default()
        };
        result.measure();
        tracing::debug!(
            nodes = result.nodes.len(),
            width = result.width,
            height = result.height,
            "computed tree layout"
        );
        result
    }

    /// Scans positions once for extents, then derives the padded canvas.
    fn measure(&mut self) {
        let Some(first) = self.nodes.first() else {
            return;
        };
        let mut bounds = Rect::from_points(first.position, first.position);
        for node in &self.nodes[1..] {
            bounds = bounds.union_pt(node.position);
        }
        self.min_x = bounds.x0;
        self.max_x = bounds.x1;
        self.min_y = bounds.y0;
        self.max_y = bounds.y1;

        let c = &self.config;
        self.width = bounds.width() + c.node_width + 2.0 * c.gap_x;
        self.height = bounds.height() + c.node_height + 2.0 * c.gap_y;
        self.translate = Vec2::new(
            -(bounds.x0 - c.node_width / 2.0) + c.gap_x,
            -(bounds.y0 - c.node_height / 2.0) + c.gap_y,
        );
    }

    /// All nodes, depth-first pre-order; the root is first.
    #[must_use]
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// All parent→child links, in the order their children were placed.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Nodes paired with their indices, in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (LayoutIx, &LayoutNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (LayoutIx::from_index(i), n))
    }

    /// Number of placed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing was placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sizing parameters this layout was computed with.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Size of one node box.
    #[must_use]
    pub fn node_size(&self) -> Size {
        self.config.node_size()
    }

    /// Canvas width: raw extent plus one box and two gaps.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height: raw extent plus one box and two gaps.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Canvas size as a [`Size`].
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Offset from raw layout space into padded canvas space.
    #[must_use]
    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    /// Horizontal offset from raw into padded space.
    #[must_use]
    pub fn translate_x(&self) -> f64 {
        self.translate.x
    }

    /// Vertical offset from raw into padded space.
    #[must_use]
    pub fn translate_y(&self) -> f64 {
        self.translate.y
    }

    /// Smallest raw x.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Largest raw x.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Smallest raw y.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Largest raw y.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Raw extents of node centers.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Index of the node with `id`.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<LayoutIx> {
        self.by_id.get(id).copied()
    }

    /// Node at `ix`.
    #[must_use]
    pub fn node(&self, ix: LayoutIx) -> Option<&LayoutNode> {
        self.nodes.get(ix.index())
    }

    /// Node with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LayoutNode> {
        self.index_of(id).and_then(|ix| self.node(ix))
    }

    /// The root, or `None` for an empty layout.
    #[must_use]
    pub fn first(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    /// Raw position of the node with `id`.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<Point> {
        self.get(id).map(|n| n.position)
    }

    /// Title of the node with `id`.
    #[must_use]
    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|n| n.title.as_str())
    }

    /// Parent of the node with `id`.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&LayoutNode> {
        self.get(id)?.parent.and_then(|p| self.node(p))
    }

    /// Children of the node with `id`, in display order.
    pub fn children_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a LayoutNode> + use<'a> {
        let children = self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[]);
        children.iter().filter_map(|&c| self.node(c))
    }

    /// Raw-space box of the node at `ix`.
    #[must_use]
    pub fn node_rect(&self, ix: LayoutIx) -> Option<Rect> {
        self.node(ix)
            .map(|n| Rect::from_center_size(n.position, self.node_size()))
    }

    /// Padded-space center of the node at `ix`.
    #[must_use]
    pub fn padded_position(&self, ix: LayoutIx) -> Option<Point> {
        self.node(ix).map(|n| n.position + self.translate)
    }

    /// Topmost node whose box contains `point`, given in padded space.
    ///
    /// Later nodes are drawn over earlier ones, so they win ties.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<LayoutIx> {
        let raw = point - self.translate;
        let half = self.node_size().to_vec2() / 2.0;
        self.nodes.iter().enumerate().rev().find_map(|(i, n)| {
            let d = raw - n.position;
            (d.x.abs() <= half.x && d.y.abs() <= half.y).then(|| LayoutIx::from_index(i))
        })
    }

    /// Connector curve for `link` in raw layout space.
    ///
    /// Runs from the bottom edge of the parent box to the top edge of the
    /// child box. Both control points sit at the horizontal midpoint between
    /// the endpoints, one level with each end.
    #[must_use]
    pub fn link_curve(&self, link: &Link) -> Option<CubicBez> {
        let source = self.node(link.source)?.position;
        let target = self.node(link.target)?.position;
        let half_h = self.config.node_height / 2.0;
        let p0 = Point::new(source.x, source.y + half_h);
        let p3 = Point::new(target.x, target.y - half_h);
        let mid_x = (p0.x + p3.x) / 2.0;
        Some(CubicBez::new(
            p0,
            Point::new(mid_x, p0.y),
            Point::new(mid_x, p3.y),
            p3,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn abab() -> RawNode {
        // root -> [A -> [A1], B]
        RawNode::new("root", "Root").with_children([
            RawNode::new("A", "A").with_child(RawNode::new("A1", "A1")),
            RawNode::new("B", "B"),
        ])
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn places_small_tree() {
        let layout = LayoutResult::from_raw(&abab(), &LayoutConfig::default()).unwrap();
        let ids: Vec<&str> = layout.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["root", "A", "A1", "B"]);

        // A is a hub, so A and B sit 1.3 separation units apart.
        let dx = 360.0 + 64.0;
        let a = layout.position_of("A").unwrap();
        let b = layout.position_of("B").unwrap();
        let a1 = layout.position_of("A1").unwrap();
        assert!(close(a.x, -0.65 * dx));
        assert!(close(b.x, 0.65 * dx));
        assert!(close(a1.x, a.x));
        assert_eq!(layout.position_of("root").unwrap(), Point::ZERO);
        assert_eq!(a1.y, 2.0 * (180.0 + 140.0));

        assert_eq!(layout.links().len(), 3);
        assert_eq!(layout.parent_of("A1").unwrap().id, "A");
        let children: Vec<&str> = layout.children_of("root").map(|n| n.id.as_str()).collect();
        assert_eq!(children, ["A", "B"]);
    }

    #[test]
    fn hub_weight_is_configurable() {
        let config = LayoutConfig {
            hub_weight: 1.0,
            ..LayoutConfig::default()
        };
        let layout = LayoutResult::from_raw(&abab(), &config).unwrap();
        let dx = 360.0 + 64.0;
        assert!(close(layout.position_of("B").unwrap().x, 0.5 * dx));
    }

    #[test]
    fn extents_and_canvas() {
        let config = LayoutConfig::default();
        let layout = LayoutResult::from_raw(&abab(), &config).unwrap();
        let dx = 360.0 + 64.0;
        assert!(close(layout.min_x(), -0.65 * dx));
        assert!(close(layout.max_x(), 0.65 * dx));
        assert_eq!(layout.min_y(), 0.0);
        assert_eq!(layout.max_y(), 640.0);
        assert!(close(layout.width(), 1.3 * dx + 360.0 + 128.0));
        assert_eq!(layout.height(), 640.0 + 180.0 + 280.0);
        assert!(close(layout.translate_x(), 0.65 * dx + 180.0 + 64.0));
        assert_eq!(layout.translate_y(), 90.0 + 140.0);
    }

    #[test]
    fn boxes_fit_inside_canvas() {
        let raw = RawNode::new("root", "Root").with_children([
            RawNode::new("projects", "Projects").with_children([
                RawNode::new("p1", "P1"),
                RawNode::new("p2", "P2").with_child(RawNode::new("p2a", "P2a")),
                RawNode::new("p3", "P3"),
            ]),
            RawNode::new("about", "About"),
            RawNode::new("experience", "Experience").with_children([
                RawNode::new("e1", "E1"),
                RawNode::new("e2", "E2"),
            ]),
        ]);
        let layout = LayoutResult::from_raw(&raw, &LayoutConfig::default()).unwrap();
        let canvas = Rect::from_origin_size(Point::ZERO, layout.canvas_size());
        for i in 0..layout.len() {
            let ix = LayoutIx::from_index(i);
            let rect = layout.node_rect(ix).unwrap() + layout.translate();
            assert!(
                canvas.contains(rect.origin()) && canvas.contains(Point::new(rect.x1, rect.y1)),
                "{rect:?} escapes {canvas:?}"
            );
        }
    }

    #[test]
    fn siblings_never_overlap() {
        let raw = RawNode::new("root", "Root").with_children(
            (0..6).map(|i| {
                RawNode::new(alloc::format!("n{i}"), "N")
                    .with_children((0..i).map(|j| RawNode::new(alloc::format!("n{i}-{j}"), "L")))
            }),
        );
        let config = LayoutConfig::default();
        let layout = LayoutResult::from_raw(&raw, &config).unwrap();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for node in layout.nodes() {
            let depth = node.depth as usize;
            if rows.len() <= depth {
                rows.resize(depth + 1, Vec::new());
            }
            rows[depth].push(node.position.x);
        }
        for row in rows {
            for pair in row.windows(2) {
                assert!(pair[1] - pair[0] >= config.node_width + config.gap_x - 1e-9);
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let tree = TreeData::from_raw(&abab()).unwrap();
        let config = LayoutConfig::default();
        let first = LayoutResult::compute(&tree, &config);
        let second = LayoutResult::compute(&tree.clone(), &config);
        assert_eq!(first.nodes(), second.nodes());
    }

    #[test]
    fn from_parts_and_from_raw_agree() {
        let tree = TreeData::from_parts(
            [
                TreeNode::new("root", "Root", NodeKind::Root).with_children(["A", "B"]),
                TreeNode::new("A", "A", NodeKind::Hub).with_children(["A1"]),
                TreeNode::new("A1", "A1", NodeKind::About),
                TreeNode::new("B", "B", NodeKind::About),
            ],
            "root",
        )
        .unwrap();
        let config = LayoutConfig::default();
        let a = LayoutResult::compute(&tree, &config);
        let b = LayoutResult::from_raw(&abab(), &config).unwrap();
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn unreachable_nodes_are_skipped() {
        let tree = TreeData::from_parts(
            [
                TreeNode::new("root", "Root", NodeKind::Root),
                TreeNode::new("orphan", "Orphan", NodeKind::About),
            ],
            "root",
        )
        .unwrap();
        let layout = LayoutResult::compute(&tree, &LayoutConfig::default());
        assert_eq!(layout.len(), 1);
        assert!(layout.get("orphan").is_none());
    }

    #[test]
    fn hit_test_finds_box_under_point() {
        let layout = LayoutResult::from_raw(&abab(), &LayoutConfig::default()).unwrap();
        let b = layout.index_of("B").unwrap();
        let center = layout.padded_position(b).unwrap();
        assert_eq!(layout.hit_test(center + Vec2::new(170.0, -80.0)), Some(b));
        assert_eq!(layout.hit_test(Point::ZERO), None);
    }

    #[test]
    fn link_curve_joins_box_edges() {
        let layout = LayoutResult::from_raw(&abab(), &LayoutConfig::default()).unwrap();
        let link = layout.links()[0];
        let curve = layout.link_curve(&link).unwrap();
        assert_eq!(curve.p0, Point::new(0.0, 90.0));
        let a = layout.position_of("A").unwrap();
        assert_eq!(curve.p3, Point::new(a.x, a.y - 90.0));
        assert_eq!(curve.p1.y, curve.p0.y);
        assert_eq!(curve.p2.y, curve.p3.y);
    }

    #[test]
    fn empty_layout_is_all_zero() {
        let layout = LayoutResult::empty();
        assert!(layout.is_empty());
        assert_eq!(layout.canvas_size(), Size::ZERO);
        assert_eq!(layout.translate(), Vec2::ZERO);
        assert!(layout.first().is_none());
    }
}
