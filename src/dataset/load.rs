use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::model::Dataset;

const BUILTIN_DATASET: &str = include_str!("../../assets/robotics-core.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    Builtin,
    File(PathBuf),
}

impl DatasetSource {
    pub fn label(&self) -> String {
        match self {
            Self::Builtin => "built-in robotics map".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }

    pub fn load(&self) -> Result<Dataset> {
        let dataset = match self {
            Self::Builtin => {
                parse_dataset(BUILTIN_DATASET).context("built-in dataset is malformed")?
            }
            Self::File(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read dataset {}", path.display()))?;
                parse_dataset(&raw)
                    .with_context(|| format!("failed to parse dataset {}", path.display()))?
            }
        };

        info!(
            source = %self.label(),
            clusters = dataset.clusters.len(),
            nodes = dataset.nodes.len(),
            edges = dataset.edges.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    serde_json::from_str(raw).context("invalid dataset JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ROOT_ID, RelationshipKind};

    #[test]
    fn builtin_dataset_parses() {
        let dataset = DatasetSource::Builtin.load().unwrap();
        assert_eq!(dataset.clusters.len(), 7);
        assert_eq!(dataset.nodes.len(), 60);
        assert!(dataset.edges.iter().any(|edge| edge.kind == RelationshipKind::Uses));
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let dataset = parse_dataset(
            r##"{
                "clusters": [{ "id": "C1", "name": "One", "color": "#112233" }],
                "nodes": [{ "id": "A", "name": "Alpha" }]
            }"##,
        )
        .unwrap();

        let node = dataset.node("A").unwrap();
        assert_eq!(node.parent, ROOT_ID);
        assert_eq!(node.difficulty, 3);
        assert!(node.one_liner.is_empty());
        assert_eq!(dataset.root.subtitle, "SYSTEM ROOT");
        assert!(dataset.edges.is_empty());
    }

    #[test]
    fn relationship_kinds_use_snake_case() {
        let dataset = parse_dataset(
            r#"{ "edges": [{ "id": "E1", "source": "A", "target": "B", "type": "related_to" }] }"#,
        )
        .unwrap();
        assert_eq!(dataset.edges[0].kind, RelationshipKind::RelatedTo);
        let unknown_kind =
            r#"{ "edges": [{ "id": "E1", "source": "A", "target": "B", "type": "blocks" }] }"#;
        assert!(parse_dataset(unknown_kind).is_err());
    }

    #[test]
    fn references_follow_canonical_then_recent_order() {
        let dataset = DatasetSource::Builtin.load().unwrap();
        let ids = dataset
            .references_of("N48")
            .into_iter()
            .map(|reference| reference.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["R146", "R028"]);
        assert!(dataset.references_of("missing").is_empty());
    }
}
