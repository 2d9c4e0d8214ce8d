use std::collections::HashMap;

use eframe::egui::{Color32, Pos2};
use tracing::{info, warn};

use crate::dataset::{Dataset, ROOT_ID};

const ROOT_ACCENT: Color32 = Color32::WHITE;
const DEFAULT_ACCENT: Color32 = Color32::from_rgb(0x66, 0xfc, 0xf1);

/// Stable handle of a node inside a [`MapTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Cluster,
    Leaf,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Cluster => "cluster",
            Self::Leaf => "leaf",
        }
    }
}

#[derive(Clone, Debug)]
pub struct TreeNode {
    pub key: String,
    pub kind: NodeKind,
    pub display_name: String,
    pub subtitle: String,
    pub accent: Color32,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub expanded: bool,
    pub position: Pos2,
    pub previous_position: Pos2,
}

impl TreeNode {
    fn new(key: &str, kind: NodeKind, display_name: &str, subtitle: &str, accent: Color32) -> Self {
        Self {
            key: key.to_owned(),
            kind,
            display_name: display_name.to_owned(),
            subtitle: subtitle.to_owned(),
            accent,
            parent: None,
            children: Vec::new(),
            expanded: kind != NodeKind::Cluster,
            position: Pos2::ZERO,
            previous_position: Pos2::ZERO,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Has children that are currently hidden.
    pub fn is_collapsed(&self) -> bool {
        self.has_children() && !self.expanded
    }
}

/// Non-fatal problems found while linking the dataset into a tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataWarning {
    #[error("node `{node}` references unknown parent `{parent}`; attached to root")]
    DanglingParent { node: String, parent: String },
    #[error("node `{node}` names itself as parent; attached to root")]
    SelfParent { node: String },
    #[error("node `{node}` is part of a parent cycle; attached to root")]
    ParentCycle { node: String },
    #[error("duplicate id `{id}` skipped")]
    DuplicateId { id: String },
}

/// Arena of tree nodes; handles are dense indices and the root is always the first.
#[derive(Clone, Debug)]
pub struct MapTree {
    nodes: Vec<TreeNode>,
    index_by_key: HashMap<String, NodeId>,
}

impl MapTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub(super) fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.index_by_key.get(key).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Walks upwards from the parent of `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn cluster_of(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|candidate| {
                self.node(*candidate)
                    .is_some_and(|node| node.kind == NodeKind::Cluster)
            })
    }

    /// `(key, parent key)` for every node in handle order.
    pub fn parent_links(&self) -> Vec<(&str, Option<&str>)> {
        self.nodes
            .iter()
            .map(|node| {
                let parent = node
                    .parent
                    .and_then(|parent| self.node(parent))
                    .map(|parent| parent.key.as_str());
                (node.key.as_str(), parent)
            })
            .collect()
    }

    fn reachable_from_root(&self) -> Vec<bool> {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut reachable[id.0], true) {
                continue;
            }
            stack.extend(self.children(id).iter().copied());
        }
        reachable
    }

    fn attach(&mut self, child: NodeId, parent: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn reparent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(previous) = self.nodes[child.0].parent {
            self.nodes[previous.0]
                .children
                .retain(|sibling| *sibling != child);
        }
        self.attach(child, parent);
    }
}

#[derive(Clone, Debug)]
pub struct BuiltTree {
    pub tree: MapTree,
    pub warnings: Vec<DataWarning>,
}

/// Links clusters under a synthetic root and nodes under their declared parents.
///
/// Nothing is dropped: nodes whose parent cannot be resolved (unknown id, self
/// reference, cycle) end up directly under the root and are reported in
/// [`BuiltTree::warnings`]. Only duplicated ids are skipped. Clusters start
/// collapsed, every other node starts expanded.
pub fn build_tree(dataset: &Dataset) -> BuiltTree {
    let capacity = 1 + dataset.clusters.len() + dataset.nodes.len();
    let mut tree = MapTree {
        nodes: Vec::with_capacity(capacity),
        index_by_key: HashMap::with_capacity(capacity),
    };
    let mut warnings = Vec::new();

    tree.nodes.push(TreeNode::new(
        ROOT_ID,
        NodeKind::Root,
        &dataset.root.name,
        &dataset.root.subtitle,
        ROOT_ACCENT,
    ));
    tree.index_by_key.insert(ROOT_ID.to_owned(), MapTree::ROOT);

    for (ordinal, cluster) in dataset.clusters.iter().enumerate() {
        if tree.index_by_key.contains_key(&cluster.id) {
            warnings.push(DataWarning::DuplicateId {
                id: cluster.id.clone(),
            });
            continue;
        }

        let id = NodeId(tree.nodes.len());
        let subtitle = format!("SECTOR {:02}", ordinal + 1);
        let accent = parse_accent(&cluster.id, &cluster.color);
        tree.nodes.push(TreeNode::new(
            &cluster.id,
            NodeKind::Cluster,
            &cluster.name,
            &subtitle,
            accent,
        ));
        tree.index_by_key.insert(cluster.id.clone(), id);
        tree.attach(id, MapTree::ROOT);
    }

    let mut declared = Vec::with_capacity(dataset.nodes.len());
    for record in &dataset.nodes {
        if tree.index_by_key.contains_key(&record.id) {
            warnings.push(DataWarning::DuplicateId {
                id: record.id.clone(),
            });
            continue;
        }

        let id = NodeId(tree.nodes.len());
        tree.nodes.push(TreeNode::new(
            &record.id,
            NodeKind::Leaf,
            &record.name,
            &record.one_liner,
            DEFAULT_ACCENT,
        ));
        tree.index_by_key.insert(record.id.clone(), id);
        declared.push((id, record.parent.as_str()));
    }

    for &(id, parent_key) in &declared {
        let parent = match tree.find(parent_key) {
            Some(parent) if parent == id => {
                warnings.push(DataWarning::SelfParent {
                    node: tree.nodes[id.0].key.clone(),
                });
                MapTree::ROOT
            }
            Some(parent) => parent,
            None => {
                warnings.push(DataWarning::DanglingParent {
                    node: tree.nodes[id.0].key.clone(),
                    parent: parent_key.to_owned(),
                });
                MapTree::ROOT
            }
        };
        tree.attach(id, parent);
    }

    // Each reparent makes a whole cycle reachable, so this runs once per cycle.
    loop {
        let reachable = tree.reachable_from_root();
        let Some(&(orphan, _)) = declared.iter().find(|(id, _)| !reachable[id.0]) else {
            break;
        };
        warnings.push(DataWarning::ParentCycle {
            node: tree.nodes[orphan.0].key.clone(),
        });
        tree.reparent(orphan, MapTree::ROOT);
    }

    for &(id, _) in &declared {
        tree.nodes[id.0].accent = tree
            .cluster_of(id)
            .map_or(DEFAULT_ACCENT, |cluster| tree.nodes[cluster.0].accent);
    }

    for warning in &warnings {
        warn!(%warning, "dataset quality");
    }
    info!(
        nodes = tree.len(),
        clusters = dataset.clusters.len(),
        warnings = warnings.len(),
        "hierarchy built"
    );

    BuiltTree { tree, warnings }
}

fn parse_accent(cluster: &str, color: &str) -> Color32 {
    Color32::from_hex(color).unwrap_or_else(|_| {
        warn!(cluster, color, "unparsable cluster color, using default accent");
        DEFAULT_ACCENT
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dataset::parse_dataset;

    fn dataset(raw: &str) -> Dataset {
        parse_dataset(raw).unwrap()
    }

    fn two_clusters() -> Dataset {
        dataset(
            r##"{
                "clusters": [
                    { "id": "C1", "name": "First", "color": "#ff0000" },
                    { "id": "C2", "name": "Second", "color": "#00ff00" }
                ],
                "nodes": [
                    { "id": "A", "parent": "C1", "name": "Alpha" },
                    { "id": "B", "parent": "C1", "name": "Beta" },
                    { "id": "D", "parent": "A", "name": "Delta" }
                ]
            }"##,
        )
    }

    #[test]
    fn clusters_attach_to_root_in_dataset_order() {
        let built = build_tree(&two_clusters());
        let tree = &built.tree;
        let cluster_keys = tree
            .children(tree.root())
            .iter()
            .map(|id| tree.node(*id).unwrap().key.as_str())
            .collect::<Vec<_>>();

        assert_eq!(cluster_keys, vec!["C1", "C2"]);
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn initial_policy_collapses_clusters_only() {
        let built = build_tree(&two_clusters());
        let tree = &built.tree;

        assert!(tree.node(tree.root()).unwrap().expanded);
        assert!(!tree.node(tree.find("C1").unwrap()).unwrap().expanded);
        assert!(tree.node(tree.find("A").unwrap()).unwrap().expanded);
    }

    #[test]
    fn nested_nodes_inherit_cluster_accent() {
        let built = build_tree(&two_clusters());
        let tree = &built.tree;
        let delta = tree.node(tree.find("D").unwrap()).unwrap();

        assert_eq!(delta.accent, Color32::from_rgb(255, 0, 0));
        assert_eq!(delta.kind, NodeKind::Leaf);
        assert_eq!(tree.cluster_of(tree.find("D").unwrap()), tree.find("C1"));
        assert_eq!(tree.node(tree.root()).unwrap().accent, ROOT_ACCENT);
    }

    #[test]
    fn dangling_parent_is_attached_to_root_and_reported() {
        let built = build_tree(&dataset(
            r##"{
                "clusters": [{ "id": "C1", "name": "First", "color": "#ff0000" }],
                "nodes": [{ "id": "X", "parent": "NOPE", "name": "Lost" }]
            }"##,
        ));
        let tree = &built.tree;
        let lost = tree.find("X").unwrap();

        assert_eq!(tree.parent(lost), Some(tree.root()));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(lost).unwrap().accent, DEFAULT_ACCENT);
        assert_eq!(
            built.warnings,
            vec![DataWarning::DanglingParent {
                node: "X".to_owned(),
                parent: "NOPE".to_owned(),
            }]
        );
    }

    #[test]
    fn explicit_root_parent_is_not_a_warning() {
        let built = build_tree(&dataset(r#"{ "nodes": [{ "id": "A", "parent": "ROOT", "name": "A" }] }"#));
        assert!(built.warnings.is_empty());
        assert_eq!(built.tree.parent(built.tree.find("A").unwrap()), Some(MapTree::ROOT));
    }

    #[test]
    fn parent_cycles_are_broken_at_the_first_member() {
        let built = build_tree(&dataset(
            r#"{
                "nodes": [
                    { "id": "A", "parent": "B", "name": "A" },
                    { "id": "B", "parent": "A", "name": "B" },
                    { "id": "S", "parent": "S", "name": "Self" }
                ]
            }"#,
        ));
        let tree = &built.tree;
        let a = tree.find("A").unwrap();
        let b = tree.find("B").unwrap();

        assert_eq!(tree.parent(a), Some(tree.root()));
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.children(a), &[b]);
        assert_eq!(
            built.warnings,
            vec![
                DataWarning::SelfParent {
                    node: "S".to_owned()
                },
                DataWarning::ParentCycle {
                    node: "A".to_owned()
                },
            ]
        );
    }

    #[test]
    fn duplicate_ids_are_skipped() {
        let built = build_tree(&dataset(
            r##"{
                "clusters": [{ "id": "C1", "name": "First", "color": "#ff0000" }],
                "nodes": [
                    { "id": "C1", "parent": "ROOT", "name": "Clash" },
                    { "id": "ROOT", "name": "Clash" }
                ]
            }"##,
        ));

        assert_eq!(built.tree.len(), 2);
        assert_eq!(built.warnings.len(), 2);
    }

    #[test]
    fn bad_color_falls_back_to_default_accent() {
        let built = build_tree(&dataset(
            r#"{ "clusters": [{ "id": "C1", "name": "First", "color": "teal-ish" }] }"#,
        ));
        let cluster = built.tree.node(built.tree.find("C1").unwrap()).unwrap();
        assert_eq!(cluster.accent, DEFAULT_ACCENT);
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn rebuilding_yields_identical_structure() {
        let source = two_clusters();
        let first = build_tree(&source);
        let second = build_tree(&source);
        assert_eq!(first.tree.parent_links(), second.tree.parent_links());
    }

    #[test]
    fn empty_dataset_builds_a_lone_root() {
        let built = build_tree(&Dataset::default());
        assert_eq!(built.tree.len(), 1);
        assert!(built.tree.children(built.tree.root()).is_empty());
    }
}
