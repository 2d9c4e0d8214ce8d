use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parent id that attaches a node directly under the synthetic root.
pub const ROOT_ID: &str = "ROOT";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Dataset {
    #[serde(default)]
    pub root: RootRecord,
    #[serde(default)]
    pub clusters: Vec<ClusterRecord>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<RelationshipEdge>,
    #[serde(default)]
    pub refs: HashMap<String, Reference>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RootRecord {
    pub name: String,
    #[serde(default = "default_root_subtitle")]
    pub subtitle: String,
}

impl Default for RootRecord {
    fn default() -> Self {
        Self {
            name: "Knowledge Map".to_owned(),
            subtitle: default_root_subtitle(),
        }
    }
}

fn default_root_subtitle() -> String {
    "SYSTEM ROOT".to_owned()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClusterRecord {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default = "default_parent")]
    pub parent: String,
    pub name: String,
    #[serde(default)]
    pub one_liner: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub canonical_refs: Vec<String>,
    #[serde(default)]
    pub recent_refs: Vec<String>,
}

fn default_parent() -> String {
    ROOT_ID.to_owned()
}

fn default_difficulty() -> u8 {
    3
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Enables,
    Uses,
    RelatedTo,
}

impl RelationshipKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Enables => "enables",
            Self::Uses => "uses",
            Self::RelatedTo => "related to",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelationshipEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub year: u16,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub access: Option<String>,
}

impl Reference {
    pub fn byline(&self) -> String {
        match self.authors.first() {
            Some(author) if self.authors.len() > 1 => {
                format!("{author} et al. [{}]", self.year)
            }
            Some(author) => format!("{author} [{}]", self.year),
            None => format!("[{}]", self.year),
        }
    }
}

impl Dataset {
    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&ClusterRecord> {
        self.clusters.iter().find(|cluster| cluster.id == id)
    }

    pub fn incoming(&self, id: &str) -> Vec<&RelationshipEdge> {
        self.edges.iter().filter(|edge| edge.target == id).collect()
    }

    pub fn outgoing(&self, id: &str) -> Vec<&RelationshipEdge> {
        self.edges.iter().filter(|edge| edge.source == id).collect()
    }

    /// Canonical references first, then recent ones; unknown ids are skipped.
    pub fn references_of(&self, id: &str) -> Vec<&Reference> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };

        node.canonical_refs
            .iter()
            .chain(node.recent_refs.iter())
            .filter_map(|reference| self.refs.get(reference))
            .collect()
    }
}
