use std::collections::HashSet;

use eframe::egui::{Pos2, Rect, vec2};
use knowledge_map::dataset::{DatasetSource, parse_dataset};
use knowledge_map::engine::{
    Camera, CameraConfig, CameraTransform, DataWarning, EngineConfig, ExpandScope, MapEngine,
    Orientation, RenderFrame, ZoomCommand, build_tree,
};
use pretty_assertions::assert_eq;

const SETTLED: f64 = 5.0;

fn two_cluster_engine() -> MapEngine {
    let dataset = parse_dataset(
        r##"{
            "clusters": [
                { "id": "C1", "name": "Perception", "color": "#66fcf1" },
                { "id": "C2", "name": "Empty", "color": "#ff7f50" }
            ],
            "nodes": [
                { "id": "L1", "parent": "C1", "name": "Visual odometry" },
                { "id": "L2", "parent": "C1", "name": "Lidar SLAM" }
            ]
        }"##,
    )
    .unwrap();
    MapEngine::new(dataset, EngineConfig::default(), Orientation::Horizontal, 0.0)
}

fn viewport() -> Rect {
    Rect::from_min_size(Pos2::ZERO, vec2(1280.0, 800.0))
}

fn settled_frame(engine: &mut MapEngine, at: f64) -> RenderFrame {
    engine.frame(at, viewport());
    engine.frame(at + SETTLED, viewport())
}

#[test]
fn expand_then_collapse_restores_the_visible_set() {
    let mut engine = two_cluster_engine();
    let c1 = engine.tree().find("C1").unwrap();

    let initial = settled_frame(&mut engine, 0.0);
    assert_eq!(initial.nodes.len(), 3);
    let c1_before = initial.node(c1).unwrap().position;

    assert!(engine.toggle(c1, 10.0));
    let expanded = settled_frame(&mut engine, 10.0);
    assert_eq!(expanded.nodes.len(), 5);
    assert_eq!(expanded.edges.len(), 4);

    assert!(engine.toggle(c1, 20.0));
    let collapsed = settled_frame(&mut engine, 20.0);
    assert_eq!(collapsed.nodes.len(), 3);
    assert_eq!(engine.tree().find("C1"), Some(c1));
    assert_eq!(collapsed.node(c1).unwrap().position, c1_before);
}

#[test]
fn five_zoom_ins_from_point_nine_stop_at_the_upper_bound() {
    let mut camera = Camera::new(CameraConfig::default());
    camera.set_transform(CameraTransform {
        translate: vec2(0.0, 0.0),
        scale: 0.9,
    });

    for step in 0..5 {
        camera.apply(ZoomCommand::In, viewport(), Orientation::Horizontal, step as f64);
        camera.tick(step as f64 + 1.0);
    }
    assert_eq!(camera.transform(10.0).scale, 3.0);
}

#[test]
fn engine_zoom_commands_are_clamped_through_the_handshake() {
    let mut engine = two_cluster_engine();
    let mut now = 0.0;
    for _ in 0..6 {
        assert!(engine.request_zoom(ZoomCommand::In));
        engine.frame(now, viewport());
        now += 1.0;
    }
    let frame = engine.frame(now, viewport());
    assert_eq!(frame.transform.scale, 3.0);

    for _ in 0..12 {
        assert!(engine.request_zoom(ZoomCommand::Out));
        engine.frame(now, viewport());
        now += 1.0;
    }
    assert_eq!(engine.frame(now, viewport()).transform.scale, 0.1);
}

#[test]
fn orientation_flip_keeps_selection_and_expansion() {
    let mut engine = two_cluster_engine();
    let c1 = engine.tree().find("C1").unwrap();
    let leaf = engine.tree().find("L2").unwrap();
    engine.toggle(c1, 0.0);
    engine.select(Some(leaf));
    let before = settled_frame(&mut engine, 0.0);
    let camera_before = before.transform;

    assert!(engine.set_orientation(Orientation::Vertical, 10.0));
    let after = settled_frame(&mut engine, 10.0);

    assert_eq!(engine.selected(), Some(leaf));
    assert!(engine.tree().node(c1).unwrap().expanded);
    assert_eq!(after.nodes.len(), before.nodes.len());
    assert_eq!(after.transform, camera_before);
    assert_ne!(
        after.node(leaf).unwrap().position,
        before.node(leaf).unwrap().position
    );
    assert!(after.node(leaf).unwrap().selected);
}

#[test]
fn orphans_are_kept_under_the_root() {
    let dataset = parse_dataset(
        r##"{
            "clusters": [{ "id": "C1", "name": "One", "color": "#123456" }],
            "nodes": [
                { "id": "A", "parent": "C1", "name": "Attached" },
                { "id": "O", "parent": "C9", "name": "Orphan" }
            ]
        }"##,
    )
    .unwrap();
    let built = build_tree(&dataset);
    let orphan = built.tree.find("O").unwrap();

    assert_eq!(built.tree.len(), 1 + dataset.clusters.len() + dataset.nodes.len());
    assert_eq!(built.tree.parent(orphan), Some(built.tree.root()));
    assert_eq!(
        built.warnings,
        vec![DataWarning::DanglingParent {
            node: "O".to_owned(),
            parent: "C9".to_owned(),
        }]
    );

    let mut engine = MapEngine::new(dataset, EngineConfig::default(), Orientation::Horizontal, 0.0);
    assert_eq!(engine.warnings().len(), 1);
    assert_eq!(settled_frame(&mut engine, 0.0).nodes.len(), 3);
}

#[test]
fn edges_only_join_visible_nodes() {
    let mut engine = MapEngine::new(
        DatasetSource::Builtin.load().unwrap(),
        EngineConfig::default(),
        Orientation::Vertical,
        0.0,
    );
    let root = engine.tree().root();
    engine.set_all(true, ExpandScope::Everything, 0.0);
    let first_cluster = engine.tree().children(root)[0];
    engine.toggle(first_cluster, 0.0);

    let frame = settled_frame(&mut engine, 0.0);
    let visible = frame.nodes.iter().map(|node| node.id).collect::<HashSet<_>>();

    assert_eq!(frame.edges.len(), frame.nodes.len() - 1);
    for edge in &frame.edges {
        assert!(visible.contains(&edge.parent) && visible.contains(&edge.child));
    }
    assert!(!visible.contains(&engine.tree().children(first_cluster)[0]));
}

#[test]
fn a_second_toggle_mid_animation_does_not_jump() {
    let mut engine = two_cluster_engine();
    let c1 = engine.tree().find("C1").unwrap();
    let leaf = engine.tree().find("L1").unwrap();
    settled_frame(&mut engine, 0.0);

    engine.toggle(c1, 10.0);
    let midway = engine.frame(10.2, viewport());
    engine.toggle(c1, 10.2);
    let resumed = engine.frame(10.2, viewport());

    for node in &midway.nodes {
        let continued = resumed.node(node.id).unwrap();
        assert_eq!(continued.position, node.position);
        assert_eq!(continued.opacity, node.opacity);
    }
    assert!(resumed.animating);

    let done = engine.frame(20.0, viewport());
    assert!(done.node(leaf).is_none());
}

#[test]
fn search_dims_without_changing_the_layout() {
    let mut engine = two_cluster_engine();
    let c1 = engine.tree().find("C1").unwrap();
    engine.toggle(c1, 0.0);
    let before = settled_frame(&mut engine, 0.0);

    engine.set_search("slam");
    let after = engine.frame(10.0, viewport());

    assert_eq!(after.nodes.len(), before.nodes.len());
    for node in &after.nodes {
        assert_eq!(node.position, before.node(node.id).unwrap().position);
        let name = &engine.tree().node(node.id).unwrap().display_name;
        assert_eq!(node.dimmed, name != "Lidar SLAM");
    }
}
