// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors raised while building tree data.

use alloc::string::String;

/// A malformed tree was handed to the layout engine.
///
/// These are configuration errors: the input cannot describe a single rooted
/// tree, so no layout is produced. They are never raised for navigation input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The root id is not present in the node table.
    #[error("root node `{id}` is not present in the node table")]
    MissingRoot {
        /// The requested root id.
        id: String,
    },
    /// A node lists a child id that is not present in the node table.
    #[error("node `{parent}` references undefined child `{child}`")]
    DanglingChild {
        /// The node holding the reference.
        parent: String,
        /// The undefined child id.
        child: String,
    },
    /// A node is listed as a child of two different parents.
    #[error("node `{child}` is a child of both `{first}` and `{second}`")]
    MultipleParents {
        /// The node with more than one parent.
        child: String,
        /// The first parent that claimed it.
        first: String,
        /// The second parent that claimed it.
        second: String,
    },
    /// Following child links from `id` leads back to `id`.
    #[error("node `{id}` is part of a cycle")]
    Cycle {
        /// A node on the cycle.
        id: String,
    },
    /// Two nodes share the same id.
    #[error("node id `{id}` is used more than once")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },
}
