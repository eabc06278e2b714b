// Copyright 2025 the Treescope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tidy-tree placement (Buchheim, Jünger, and Leipert's linear-time Walker).
//!
//! Nodes live in a pre-order arena: index 0 is the root and every parent
//! precedes its descendants. Placement works in separation units; the caller
//! scales the result into layout space.

use alloc::vec;
use alloc::vec::Vec;

/// Arena slot with the per-node scratch state of the two walks.
#[derive(Clone, Debug)]
struct Slot {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    /// Ancestor pointer used to find the subtree to shift.
    ancestor: usize,
    /// Default ancestor while this node's children are apportioned.
    default_ancestor: Option<usize>,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
}

/// Builder-side view of the tree being placed.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tidy {
    slots: Vec<Slot>,
}

impl Tidy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a node under `parent`. Nodes must be pushed in pre-order.
    pub(crate) fn push(&mut self, parent: Option<usize>) -> usize {
        let idx = self.slots.len();
        let number = match parent {
            Some(p) => {
                let siblings = &mut self.slots[p].children;
                siblings.push(idx);
                siblings.len() - 1
            }
            None => 0,
        };
        self.slots.push(Slot {
            parent,
            children: Vec::new(),
            number,
            ancestor: idx,
            default_ancestor: None,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
        });
        idx
    }

    /// Places every node and returns x in separation units, indexed like the arena.
    ///
    /// `separation(a, b, siblings)` gives the minimum distance between the
    /// centers of adjacent nodes `a` and `b` on the same level. The root is
    /// placed at 0.
    pub(crate) fn place(mut self, separation: impl Fn(usize, usize, bool) -> f64) -> Vec<f64> {
        if self.slots.is_empty() {
            return Vec::new();
        }
        for v in self.post_order() {
            self.first_walk(v, &separation);
        }

        let mut x = vec![0.0; self.slots.len()];
        // Arena order is pre-order, so each parent's modifier is final before
        // its children read it.
        let root_offset = -self.slots[0].prelim;
        for v in 0..self.slots.len() {
            let inherited = match self.slots[v].parent {
                Some(p) => self.slots[p].modifier,
                None => root_offset,
            };
            x[v] = self.slots[v].prelim + inherited;
            self.slots[v].modifier += inherited;
        }
        x
    }

    fn post_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.slots.len());
        let mut stack = vec![(0_usize, 0_usize)];
        while let Some((v, next_child)) = stack.pop() {
            if let Some(&child) = self.slots[v].children.get(next_child) {
                stack.push((v, next_child + 1));
                stack.push((child, 0));
            } else {
                order.push(v);
            }
        }
        order
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let slot = &self.slots[v];
        let p = slot.parent?;
        slot.number
            .checked_sub(1)
            .map(|i| self.slots[p].children[i])
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.slots[v].children.first().copied().or(self.slots[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.slots[v].children.last().copied().or(self.slots[v].thread)
    }

    fn first_walk(&mut self, v: usize, separation: &impl Fn(usize, usize, bool) -> f64) {
        let w = self.left_sibling(v);
        let first_child = self.slots[v].children.first().copied();
        let last_child = self.slots[v].children.last().copied();

        if let (Some(first), Some(last)) = (first_child, last_child) {
            self.execute_shifts(v);
            let midpoint = (self.slots[first].prelim + self.slots[last].prelim) / 2.0;
            if let Some(w) = w {
                self.slots[v].prelim = self.slots[w].prelim + separation(v, w, true);
                self.slots[v].modifier = self.slots[v].prelim - midpoint;
            } else {
                self.slots[v].prelim = midpoint;
            }
        } else if let Some(w) = w {
            self.slots[v].prelim = self.slots[w].prelim + separation(v, w, true);
        }

        if let Some(p) = self.slots[v].parent {
            let start = self.slots[p]
                .default_ancestor
                .unwrap_or(self.slots[p].children[0]);
            let ancestor = self.apportion(v, w, start, separation);
            self.slots[p].default_ancestor = Some(ancestor);
        }
    }

    /// Pushes the subtree of `v` right until it clears the subtrees to its left.
    fn apportion(
        &mut self,
        v: usize,
        w: Option<usize>,
        mut ancestor: usize,
        separation: &impl Fn(usize, usize, bool) -> f64,
    ) -> usize {
        let Some(w) = w else {
            return ancestor;
        };
        let Some(p) = self.slots[v].parent else {
            return ancestor;
        };

        // i = inside, o = outside; p = right subtree (v), m = left forest.
        let mut vip = Some(v);
        let mut vop = v;
        let mut vim = Some(w);
        let mut vom = self.slots[p].children[0];
        let mut sip = self.slots[v].modifier;
        let mut sop = self.slots[v].modifier;
        let mut sim = self.slots[w].modifier;
        let mut som = self.slots[vom].modifier;

        loop {
            vim = vim.and_then(|n| self.next_right(n));
            vip = vip.and_then(|n| self.next_left(n));
            let (Some(im), Some(ip)) = (vim, vip) else {
                break;
            };
            // Both outer contours run at least as deep as the inner ones.
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vom = om;
            vop = op;
            self.slots[vop].ancestor = v;

            let siblings = self.slots[im].parent == self.slots[ip].parent;
            let shift = self.slots[im].prelim + sim - self.slots[ip].prelim - sip
                + separation(im, ip, siblings);
            if shift > 0.0 {
                let moved = self.next_ancestor(im, v, ancestor);
                self.move_subtree(moved, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.slots[im].modifier;
            sip += self.slots[ip].modifier;
            som += self.slots[vom].modifier;
            sop += self.slots[vop].modifier;
        }

        if let Some(im) = vim
            && self.next_right(vop).is_none()
        {
            self.slots[vop].thread = Some(im);
            self.slots[vop].modifier += sim - sop;
        }
        if let Some(ip) = vip
            && self.next_left(vom).is_none()
        {
            self.slots[vom].thread = Some(ip);
            self.slots[vom].modifier += sip - som;
            ancestor = v;
        }
        ancestor
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.slots[vim].ancestor;
        if self.slots[candidate].parent == self.slots[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let span = self.slots[wp].number - self.slots[wm].number;
        #[allow(
            clippy::cast_precision_loss,
            reason = "Sibling counts are far below 2^52."
        )]
        let change = shift / span as f64;
        self.slots[wp].change -= change;
        self.slots[wp].shift += shift;
        self.slots[wm].change += change;
        self.slots[wp].prelim += shift;
        self.slots[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = core::mem::take(&mut self.slots[v].children);
        for &w in children.iter().rev() {
            let slot = &mut self.slots[w];
            slot.prelim += shift;
            slot.modifier += shift;
            change += slot.change;
            shift += slot.shift + change;
        }
        self.slots[v].children = children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(_: usize, _: usize, siblings: bool) -> f64 {
        if siblings { 1.0 } else { 2.0 }
    }

    #[test]
    fn single_node_sits_at_origin() {
        let mut tidy = Tidy::new();
        tidy.push(None);
        assert_eq!(tidy.place(unit), vec![0.0]);
    }

    #[test]
    fn parent_is_centered_over_children() {
        let mut tidy = Tidy::new();
        let root = tidy.push(None);
        tidy.push(Some(root));
        tidy.push(Some(root));
        tidy.push(Some(root));
        assert_eq!(tidy.place(unit), vec![0.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn cousins_get_double_separation() {
        // root -> [a -> [a1], b -> [b1]]
        let mut tidy = Tidy::new();
        let root = tidy.push(None);
        let a = tidy.push(Some(root));
        tidy.push(Some(a));
        let b = tidy.push(Some(root));
        tidy.push(Some(b));
        let x = tidy.place(unit);
        // a1 and b1 are cousins, so they end up 2 apart, dragging a and b with them.
        assert_eq!(x[2], -1.0);
        assert_eq!(x[4], 1.0);
        assert_eq!(x[1], -1.0);
        assert_eq!(x[3], 1.0);
        assert_eq!(x[0], 0.0);
    }

    #[test]
    fn wide_left_subtree_pushes_right_sibling() {
        // root -> [a -> [a1, a2, a3], b]
        let mut tidy = Tidy::new();
        let root = tidy.push(None);
        let a = tidy.push(Some(root));
        for _ in 0..3 {
            tidy.push(Some(a));
        }
        tidy.push(Some(root));
        let x = tidy.place(unit);
        let (a, b) = (x[1], x[5]);
        assert!(b - a >= 1.0, "siblings overlap: a={a} b={b}");
        assert_eq!(x[0], 0.0);
        assert_eq!((x[1] + x[5]) / 2.0, 0.0);
        // Grandchildren are evenly spaced under a.
        assert_eq!(x[3] - x[2], 1.0);
        assert_eq!(x[4] - x[3], 1.0);
        assert_eq!(x[3], x[1]);
    }

    #[test]
    fn middle_subtrees_are_spread_evenly() {
        // root -> [a -> [a1, a2], b, c, d -> [d1, d2]]
        let mut tidy = Tidy::new();
        let root = tidy.push(None);
        let a = tidy.push(Some(root));
        tidy.push(Some(a));
        tidy.push(Some(a));
        tidy.push(Some(root));
        tidy.push(Some(root));
        let d = tidy.push(Some(root));
        tidy.push(Some(d));
        tidy.push(Some(d));
        let x = tidy.place(unit);
        let gaps = [x[4] - x[1], x[5] - x[4], x[6] - x[5]];
        assert!((gaps[0] - gaps[1]).abs() < 1e-9, "{gaps:?}");
        assert!((gaps[1] - gaps[2]).abs() < 1e-9, "{gaps:?}");
        // a2 and d1 are separated by at least the cousin distance.
        assert!(x[7] - x[3] >= 2.0 - 1e-9);
    }
}
