// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds and the resolver policy that assigns them.

use kurbo::Size;

use crate::tree::RawNode;

/// The closed set of node kinds a tree can contain.
///
/// Layout only asks [`NodeKind::is_hub`]; everything else about a kind is for
/// renderers to match on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    /// The single node without a parent.
    Root,
    /// A content-light node that exists to group its children.
    Hub,
    /// A project entry.
    Project,
    /// A work experience entry.
    Experience,
    /// An education entry.
    Education,
    /// A free-form content page.
    About,
    /// Contact details.
    Contact,
}

impl NodeKind {
    /// Returns `true` for structural grouping nodes.
    #[must_use]
    pub const fn is_hub(self) -> bool {
        matches!(self, Self::Hub)
    }

    /// Preferred card size for this kind.
    ///
    /// Width is shared by every kind so cards line up in a row; height varies
    /// with how much content a kind usually carries.
    #[must_use]
    pub const fn card_size(self) -> Size {
        let height = match self {
            Self::Root => 200.0,
            Self::Hub => 140.0,
            Self::Project | Self::Experience | Self::Education => 180.0,
            Self::About | Self::Contact => 160.0,
        };
        Size::new(360.0, height)
    }
}

/// Policy assigning a [`NodeKind`] to each node while tree data is built.
///
/// A resolver sees the raw node and the id of its parent (`None` for the
/// root). It must be a pure function of that input.
pub trait KindResolver {
    /// Classify `node`, whose parent has id `parent_id`.
    fn resolve(&self, node: &RawNode, parent_id: Option<&str>) -> NodeKind;
}

impl<F> KindResolver for F
where
    F: Fn(&RawNode, Option<&str>) -> NodeKind,
{
    fn resolve(&self, node: &RawNode, parent_id: Option<&str>) -> NodeKind {
        self(node, parent_id)
    }
}

/// Resolver for portfolio-shaped trees.
///
/// Children of the `projects`, `experience`, and `education` sections take the
/// matching kind, the `about` and `contact` ids are recognized directly, other
/// nodes with children are hubs, and remaining leaves fall back to
/// [`NodeKind::About`].
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultResolver;

impl KindResolver for DefaultResolver {
    fn resolve(&self, node: &RawNode, parent_id: Option<&str>) -> NodeKind {
        let Some(parent_id) = parent_id else {
            return NodeKind::Root;
        };
        match (parent_id, node.id.as_str()) {
            ("projects", _) => NodeKind::Project,
            ("experience", _) => NodeKind::Experience,
            ("education", _) => NodeKind::Education,
            (_, "about") => NodeKind::About,
            (_, "contact") => NodeKind::Contact,
            _ if !node.children.is_empty() => NodeKind::Hub,
            _ => NodeKind::About,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolver_follows_structure() {
        let leaf = RawNode::new("proj-1", "SEM App");
        let hub = RawNode::new("misc", "Misc").with_child(RawNode::new("x", "X"));

        assert_eq!(DefaultResolver.resolve(&hub, None), NodeKind::Root);
        assert_eq!(
            DefaultResolver.resolve(&leaf, Some("projects")),
            NodeKind::Project
        );
        assert_eq!(
            DefaultResolver.resolve(&leaf, Some("experience")),
            NodeKind::Experience
        );
        assert_eq!(DefaultResolver.resolve(&hub, Some("root")), NodeKind::Hub);
        assert_eq!(
            DefaultResolver.resolve(&RawNode::new("contact", "Contact"), Some("root")),
            NodeKind::Contact
        );
        assert_eq!(DefaultResolver.resolve(&leaf, Some("root")), NodeKind::About);
    }

    #[test]
    fn section_parent_wins_over_children() {
        // A project with sub-pages is still a project, not a hub.
        let project = RawNode::new("proj-2", "Portfolio").with_child(RawNode::new("p", "Page"));
        assert_eq!(
            DefaultResolver.resolve(&project, Some("projects")),
            NodeKind::Project
        );
        assert!(!NodeKind::Project.is_hub());
    }

    #[test]
    fn closures_are_resolvers() {
        let all_hubs = |_: &RawNode, _: Option<&str>| NodeKind::Hub;
        assert_eq!(all_hubs.resolve(&RawNode::new("a", "A"), None), NodeKind::Hub);
    }

    #[test]
    fn card_sizes_share_width() {
        assert_eq!(NodeKind::Root.card_size(), Size::new(360.0, 200.0));
        assert_eq!(NodeKind::Hub.card_size().height, 140.0);
        assert_eq!(NodeKind::Contact.card_size().width, 360.0);
    }
}
