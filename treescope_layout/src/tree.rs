// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree data: the nested authoring shape and the validated id-indexed table.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::error::LayoutError;
use crate::kind::{DefaultResolver, KindResolver, NodeKind};

/// A node in the nested authoring shape, with its children embedded.
///
/// With the `serde` feature, this deserializes from JSON such as
/// `{"id": "root", "title": "Home", "children": [...]}`; field names are
/// camel case (`imageUrl`).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawNode {
    /// Unique id.
    pub id: String,
    /// Title shown in the card header.
    pub title: String,
    /// Optional subtitle.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub subtitle: Option<String>,
    /// Optional longer description.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    /// Optional image shown on the card.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub image_url: Option<String>,
    /// Optional link target.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub href: Option<String>,
    /// Children, in display order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<RawNode>,
}

impl RawNode {
    /// Creates a leaf with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Appends a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Sets the subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// A node in the id-indexed table.
///
/// Children are referenced by id; [`TreeData`] guarantees they resolve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TreeNode {
    /// Unique id.
    pub id: String,
    /// Title shown in the card header.
    pub title: String,
    /// Kind assigned by the resolver when the table was built.
    pub kind: NodeKind,
    /// Optional subtitle.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub subtitle: Option<String>,
    /// Optional longer description.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    /// Optional image shown on the card.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub image_url: Option<String>,
    /// Optional link target.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub href: Option<String>,
    /// Child ids, in display order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<String>,
}

impl TreeNode {
    /// Creates a childless node.
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            subtitle: None,
            description: None,
            image_url: None,
            href: None,
            children: Vec::new(),
        }
    }

    /// Appends child ids.
    #[must_use]
    pub fn with_children<S: Into<String>>(mut self, children: impl IntoIterator<Item = S>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    fn from_raw(raw: &RawNode, kind: NodeKind) -> Self {
        Self {
            id: raw.id.clone(),
            title: raw.title.clone(),
            kind,
            subtitle: raw.subtitle.clone(),
            description: raw.description.clone(),
            image_url: raw.image_url.clone(),
            href: raw.href.clone(),
            children: raw.children.iter().map(|c| c.id.clone()).collect(),
        }
    }
}

/// A validated rooted tree stored as a node table.
///
/// Every child id resolves, every node has at most one parent, the root has
/// none, and there are no cycles. Nodes that are not reachable from the root
/// may exist in the table; layout ignores them.
#[derive(Clone, Debug)]
pub struct TreeData {
    nodes_by_id: HashMap<String, TreeNode>,
    parents: HashMap<String, String>,
    root_id: String,
}

impl TreeData {
    /// Builds tree data from a nested node, classifying nodes with [`DefaultResolver`].
    pub fn from_raw(raw: &RawNode) -> Result<Self, LayoutError> {
        Self::from_raw_with(raw, &DefaultResolver)
    }

    /// Builds tree data from a nested node, classifying nodes with `resolver`.
    ///
    /// Returns [`LayoutError::DuplicateId`] if an id occurs twice anywhere in
    /// the nested input.
    pub fn from_raw_with<R>(raw: &RawNode, resolver: &R) -> Result<Self, LayoutError>
    where
        R: KindResolver + ?Sized,
    {
        let mut nodes_by_id = HashMap::new();
        let mut parents = HashMap::new();
        let mut stack: Vec<(&RawNode, Option<&str>)> = vec![(raw, None)];

        while let Some((node, parent_id)) = stack.pop() {
            let kind = resolver.resolve(node, parent_id);
            if nodes_by_id
                .insert(node.id.clone(), TreeNode::from_raw(node, kind))
                .is_some()
            {
                return Err(LayoutError::DuplicateId {
                    id: node.id.clone(),
                });
            }
            if let Some(parent_id) = parent_id {
                parents.insert(node.id.clone(), parent_id.to_owned());
            }
            // Reversed so the first child is visited first.
            for child in node.children.iter().rev() {
                stack.push((child, Some(node.id.as_str())));
            }
        }

        Ok(Self {
            nodes_by_id,
            parents,
            root_id: raw.id.clone(),
        })
    }

    /// Builds tree data from an already-normalized node table.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = TreeNode>,
        root_id: impl Into<String>,
    ) -> Result<Self, LayoutError> {
        let root_id = root_id.into();
        let mut nodes_by_id = HashMap::new();
        for node in nodes {
            let id = node.id.clone();
            if nodes_by_id.insert(id.clone(), node).is_some() {
                return Err(LayoutError::DuplicateId { id });
            }
        }
        if !nodes_by_id.contains_key(&root_id) {
            return Err(LayoutError::MissingRoot { id: root_id });
        }

        let parents = check_links(&nodes_by_id, &root_id)?;
        Ok(Self {
            nodes_by_id,
            parents,
            root_id,
        })
    }

    /// The root id.
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        // Construction guarantees the root is present.
        &self.nodes_by_id[self.root_id.as_str()]
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes_by_id.get(id)
    }

    /// Child ids of `id`, or `None` if `id` is unknown.
    #[must_use]
    pub fn children_of(&self, id: &str) -> Option<&[String]> {
        self.get(id).map(|n| n.children.as_slice())
    }

    /// Parent id of `id`. `None` for the root, unparented nodes, and unknown ids.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Title of `id`, if known.
    #[must_use]
    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|n| n.title.as_str())
    }

    /// Number of nodes in the table, including unreachable ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes_by_id.len()
    }

    /// Returns `true` if the table is empty. Never true for constructed data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes_by_id.is_empty()
    }

    /// Iterates all nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes_by_id.values()
    }
}

/// Checks child links and returns the child-to-parent map.
///
/// Checks run in sorted-id order so the same malformed input always reports
/// the same error.
fn check_links(
    nodes_by_id: &HashMap<String, TreeNode>,
    root_id: &str,
) -> Result<HashMap<String, String>, LayoutError> {
    let mut ids: Vec<&String> = nodes_by_id.keys().collect();
    ids.sort();

    let mut parents: HashMap<String, String> = HashMap::new();
    for id in &ids {
        let node = &nodes_by_id[*id];
        for child in &node.children {
            if !nodes_by_id.contains_key(child) {
                return Err(LayoutError::DanglingChild {
                    parent: node.id.clone(),
                    child: child.clone(),
                });
            }
            if child == root_id || *child == node.id {
                return Err(LayoutError::Cycle { id: child.clone() });
            }
            if let Some(first) = parents.insert(child.clone(), node.id.clone()) {
                return Err(LayoutError::MultipleParents {
                    child: child.clone(),
                    first,
                    second: node.id.clone(),
                });
            }
        }
    }

    // Every node now has at most one parent, so a node that cannot reach
    // the root by walking up either ends at a parentless node or loops.
    let reachable = reachable_from(nodes_by_id, root_id);
    for id in &ids {
        if reachable.contains(id.as_str()) {
            continue;
        }
        let mut seen: HashSet<&str> = HashSet::new();
        let mut cursor = id.as_str();
        while let Some(parent) = parents.get(cursor) {
            if !seen.insert(cursor) {
                return Err(LayoutError::Cycle {
                    id: cursor.to_owned(),
                });
            }
            cursor = parent.as_str();
        }
    }
    Ok(parents)
}

fn reachable_from<'a>(nodes: &'a HashMap<String, TreeNode>, root_id: &'a str) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = nodes.get(id) {
            stack.extend(node.children.iter().map(String::as_str));
        }
    }
    seen
}
