//! Collapsible knowledge-map diagram: dataset model plus the layout, routing,
//! animation and camera engine behind the desktop viewer.

pub mod dataset;
pub mod engine;
