// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building layouts from JSON trees.

use std::collections::HashMap;

use kurbo::Rect;
use treescope_camera::CameraConfig;
use treescope_layout::{
    LayoutConfig, LayoutError, LayoutResult, NodeKind, RawNode, TreeData, TreeNode,
};

const SAMPLE: &str = include_str!("../data/portfolio.json");

fn sample() -> RawNode {
    serde_json::from_str(SAMPLE).unwrap()
}

#[test]
fn camel_case_fields_are_read() {
    let raw = sample();
    assert_eq!(raw.image_url.as_deref(), Some("/assets/robin.jpg"));
    let tree = TreeData::from_raw(&raw).unwrap();
    let project = tree.get("proj-1").unwrap();
    assert_eq!(project.image_url.as_deref(), Some("/assets/sieve-thumb.png"));
    assert_eq!(project.href.as_deref(), Some("/projects/sieve"));
    assert_eq!(tree.get("edu-1").unwrap().description.as_deref(), Some("Minor in applied math."));
}

#[test]
fn kinds_follow_structure() {
    let tree = TreeData::from_raw(&sample()).unwrap();
    let kind = |id: &str| tree.get(id).unwrap().kind;
    assert_eq!(kind("root"), NodeKind::Root);
    assert_eq!(kind("projects"), NodeKind::Hub);
    assert_eq!(kind("experience"), NodeKind::Hub);
    assert_eq!(kind("proj-2"), NodeKind::Project);
    assert_eq!(kind("exp-1"), NodeKind::Experience);
    assert_eq!(kind("edu-1"), NodeKind::Education);
    assert_eq!(kind("about"), NodeKind::About);
    assert_eq!(kind("contact"), NodeKind::Contact);
}

#[test]
fn every_non_root_node_has_one_parent() {
    let tree = TreeData::from_raw(&sample()).unwrap();
    let mut claims: HashMap<&str, usize> = HashMap::new();
    for node in tree.iter() {
        for child in &node.children {
            *claims.entry(child.as_str()).or_default() += 1;
        }
    }
    for node in tree.iter() {
        let expected = usize::from(node.id != tree.root_id());
        assert_eq!(claims.get(node.id.as_str()).copied().unwrap_or(0), expected, "{}", node.id);
    }
}

#[test]
fn every_box_fits_the_padded_canvas() {
    let layout = LayoutResult::from_raw(&sample(), &LayoutConfig::default()).unwrap();
    assert_eq!(layout.len(), 11);
    let canvas = Rect::from_origin_size((0.0, 0.0), layout.canvas_size());
    for (ix, _) in layout.iter() {
        let rect = layout.node_rect(ix).unwrap() + layout.translate();
        assert!(canvas.contains(rect.origin()), "{rect:?} outside {canvas:?}");
        assert!(rect.x1 <= canvas.x1 + 1e-9 && rect.y1 <= canvas.y1 + 1e-9);
    }
}

#[test]
fn layout_is_deterministic() {
    let config = LayoutConfig::default();
    let a = LayoutResult::from_raw(&sample(), &config).unwrap();
    let b = LayoutResult::from_raw(&sample(), &config).unwrap();
    assert_eq!(a.nodes(), b.nodes());
    assert_eq!(a.links(), b.links());
    assert_eq!(a.canvas_size(), b.canvas_size());
}

#[test]
fn duplicate_ids_are_rejected() {
    let json = r#"{"id": "root", "title": "R", "children": [
        {"id": "a", "title": "A"},
        {"id": "b", "title": "B", "children": [{"id": "a", "title": "A again"}]}
    ]}"#;
    let raw: RawNode = serde_json::from_str(json).unwrap();
    assert_eq!(
        TreeData::from_raw(&raw).unwrap_err(),
        LayoutError::DuplicateId { id: "a".into() }
    );
}

#[test]
fn missing_root_is_a_configuration_error() {
    let nodes = [
        TreeNode::new("a", "A", NodeKind::Root).with_children(["b"]),
        TreeNode::new("b", "B", NodeKind::About),
    ];
    let err = TreeData::from_parts(nodes, "x").unwrap_err();
    assert_eq!(err, LayoutError::MissingRoot { id: "x".into() });
    assert_eq!(err.to_string(), "root node `x` is not present in the node table");
}

#[test]
fn configs_fill_in_defaults() {
    let layout: LayoutConfig = serde_json::from_str(r#"{"gap_x": 32.0, "hub_weight": 1.0}"#).unwrap();
    assert_eq!(layout.gap_x, 32.0);
    assert_eq!(layout.hub_weight, 1.0);
    assert_eq!(layout.node_width, LayoutConfig::default().node_width);

    let camera: CameraConfig = serde_json::from_str(r#"{"focus_fill": 0.7}"#).unwrap();
    assert_eq!(camera.focus_fill, 0.7);
    assert_eq!(camera.settle_duration, CameraConfig::default().settle_duration);
}
