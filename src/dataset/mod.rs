mod load;
mod model;

pub use load::{DatasetSource, parse_dataset};
pub use model::{
    ClusterRecord, Dataset, NodeRecord, ROOT_ID, Reference, RelationshipEdge, RelationshipKind,
    RootRecord,
};
