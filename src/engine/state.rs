use tracing::debug;

use super::hierarchy::{MapTree, NodeId};
use super::search::SearchFilter;

/// Which nodes a bulk expand/collapse touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpandScope {
    Everything,
    /// The node and all of its descendants.
    Subtree(NodeId),
    /// Descendants only; the node itself keeps its state.
    Descendants(NodeId),
}

/// Owns the view state layered over a [`MapTree`]: expansion, selection, filter.
///
/// None of these touch the dataset; they only decide what is visible and how
/// it is drawn.
#[derive(Clone, Debug)]
pub struct TreeState {
    tree: MapTree,
    selected: Option<NodeId>,
    search: SearchFilter,
    revision: u64,
}

impl TreeState {
    pub fn new(tree: MapTree) -> Self {
        Self {
            tree,
            selected: None,
            search: SearchFilter::default(),
            revision: 0,
        }
    }

    pub fn tree(&self) -> &MapTree {
        &self.tree
    }

    pub(super) fn tree_mut(&mut self) -> &mut MapTree {
        &mut self.tree
    }

    /// Bumped on every change to the visible set.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Flips expansion of a node with children; a no-op for anything else.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        let Some(node) = self.tree.node_mut(id) else {
            return false;
        };
        if !node.has_children() {
            return false;
        }

        node.expanded = !node.expanded;
        debug!(node = %node.key, expanded = node.expanded, "toggled");
        self.revision += 1;
        true
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        let flips = self
            .tree
            .node(id)
            .is_some_and(|node| node.has_children() && node.expanded != expanded);
        flips && self.toggle(id)
    }

    /// Returns how many nodes changed.
    pub fn set_all(&mut self, expanded: bool, scope: ExpandScope) -> usize {
        let targets = match scope {
            ExpandScope::Everything => self.tree.ids().collect::<Vec<_>>(),
            ExpandScope::Subtree(id) => self.subtree(id),
            ExpandScope::Descendants(id) => self.subtree(id).into_iter().skip(1).collect(),
        };

        let mut changed = 0;
        for id in targets {
            if let Some(node) = self.tree.node_mut(id)
                && node.has_children()
                && node.expanded != expanded
            {
                node.expanded = expanded;
                changed += 1;
            }
        }

        if changed > 0 {
            self.revision += 1;
        }
        debug!(expanded, ?scope, changed, "bulk expansion");
        changed
    }

    /// Children that take part in layout: none while collapsed.
    pub fn visible_children(&self, id: NodeId) -> &[NodeId] {
        match self.tree.node(id) {
            Some(node) if node.expanded => &node.children,
            _ => &[],
        }
    }

    /// Pre-order walk from the root through expanded nodes only.
    pub fn visible_ids(&self) -> Vec<NodeId> {
        let mut visible = Vec::new();
        let mut stack = vec![self.tree.root()];
        while let Some(id) = stack.pop() {
            visible.push(id);
            stack.extend(self.visible_children(id).iter().rev().copied());
        }
        visible
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.tree.node(id).is_some()
            && self.tree.ancestors(id).all(|ancestor| {
                self.tree
                    .node(ancestor)
                    .is_some_and(|node| node.expanded)
            })
    }

    /// Parent/child pairs where both ends are visible.
    pub fn visible_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.visible_ids()
            .into_iter()
            .flat_map(|parent| {
                self.visible_children(parent)
                    .iter()
                    .map(move |child| (parent, *child))
            })
            .collect()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Selection never changes expansion. Unknown handles are ignored.
    pub fn select(&mut self, id: Option<NodeId>) -> bool {
        if id.is_some_and(|id| self.tree.node(id).is_none()) || self.selected == id {
            return false;
        }
        self.selected = id;
        true
    }

    pub fn search(&self) -> &SearchFilter {
        &self.search
    }

    pub fn set_search(&mut self, query: &str) {
        if self.search.query() != query {
            self.search = SearchFilter::new(query);
        }
    }

    /// Drawn faded because an active search does not match it.
    pub fn is_dimmed(&self, id: NodeId) -> bool {
        self.search.is_active()
            && self
                .tree
                .node(id)
                .is_some_and(|node| !self.search.matches(&node.display_name))
    }

    pub fn search_results(&self) -> Vec<NodeId> {
        self.search.ranked(
            self.tree
                .ids()
                .filter_map(|id| self.tree.node(id).map(|node| (id, node.display_name.as_str()))),
        )
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if self.tree.node(id).is_none() {
            return Vec::new();
        }

        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            stack.extend(self.tree.children(current).iter().rev().copied());
        }
        ids
    }
}
