use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2};
use tracing::{debug, info};

use super::animation::{AnimatedNode, Phase, TransitionAnimator};
use super::camera::{Camera, CameraTransform, ZoomCommand};
use super::config::EngineConfig;
use super::edges::{Polyline, node_rect, route, toggle_center};
use super::hierarchy::{DataWarning, MapTree, NodeId, NodeKind, build_tree};
use super::layout::{Orientation, TreeLayout, layout};
use super::state::{ExpandScope, TreeState};
use crate::dataset::{ClusterRecord, Dataset, NodeRecord, RelationshipEdge};

/// Hit radius of the expand/collapse button, in world units.
const TOGGLE_RADIUS: f32 = 14.0;
/// Nodes fainter than this cannot be clicked.
const HIT_OPACITY: f32 = 0.5;

pub type NodeSelectedCallback = Box<dyn FnMut(Option<NodeId>)>;
pub type ZoomHandledCallback = Box<dyn FnMut(ZoomCommand)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleState {
    Expanded,
    Collapsed,
}

/// Everything the surface needs to draw one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeVisual {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Anchor in world space.
    pub position: Pos2,
    /// Box in world space.
    pub rect: Rect,
    pub toggle_center: Pos2,
    pub opacity: f32,
    pub phase: Phase,
    pub selected: bool,
    pub dimmed: bool,
    /// `None` for nodes without children.
    pub toggle: Option<ToggleState>,
}

/// A structural parent/child edge in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVisual {
    pub parent: NodeId,
    pub child: NodeId,
    pub points: Polyline,
    pub opacity: f32,
}

/// One sampled frame: world geometry plus the camera to project it with.
#[derive(Clone, Debug)]
pub struct RenderFrame {
    pub viewport: Rect,
    pub transform: CameraTransform,
    pub orientation: Orientation,
    pub nodes: Vec<NodeVisual>,
    pub edges: Vec<EdgeVisual>,
    /// More frames are needed to finish a transition.
    pub animating: bool,
}

impl RenderFrame {
    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        self.transform.world_to_screen(world, self.viewport)
    }

    pub fn rect_to_screen(&self, world: Rect) -> Rect {
        self.transform.world_rect_to_screen(world, self.viewport)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeVisual> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Node(NodeId),
    Toggle(NodeId),
}

/// Owns the dataset, the tree state, the animator and the camera, and keeps
/// them consistent across events.
///
/// Every structural mutation recomputes the layout once and hands the
/// resulting visibility diff to the animator in the same call; `frame` only
/// samples.
pub struct MapEngine {
    dataset: Dataset,
    config: EngineConfig,
    orientation: Orientation,
    state: TreeState,
    layout: TreeLayout,
    animator: TransitionAnimator,
    camera: Camera,
    warnings: Vec<DataWarning>,
    pending_zoom: Option<ZoomCommand>,
    last_frame: f64,
    on_node_selected: Option<NodeSelectedCallback>,
    on_zoom_handled: Option<ZoomHandledCallback>,
}

impl MapEngine {
    pub fn new(dataset: Dataset, config: EngineConfig, orientation: Orientation, now: f64) -> Self {
        let built = build_tree(&dataset);
        let mut engine = Self {
            dataset,
            config,
            orientation,
            state: TreeState::new(built.tree),
            layout: TreeLayout::default(),
            animator: TransitionAnimator::new(config.transition_secs),
            camera: Camera::new(config.camera),
            warnings: built.warnings,
            pending_zoom: None,
            last_frame: now,
            on_node_selected: None,
            on_zoom_handled: None,
        };
        engine.relayout(now);
        engine
    }

    pub fn on_node_selected(&mut self, callback: impl FnMut(Option<NodeId>) + 'static) {
        self.on_node_selected = Some(Box::new(callback));
    }

    pub fn on_zoom_handled(&mut self, callback: impl FnMut(ZoomCommand) + 'static) {
        self.on_zoom_handled = Some(Box::new(callback));
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tree(&self) -> &MapTree {
        self.state.tree()
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Data-quality problems found by the last build.
    pub fn warnings(&self) -> &[DataWarning] {
        &self.warnings
    }

    /// Swaps the dataset wholesale. Collapse state starts over; the camera and,
    /// when its id survives, the selection are kept.
    pub fn reload(&mut self, dataset: Dataset, now: f64) {
        let selected_key = self
            .state
            .selected()
            .and_then(|id| self.state.tree().node(id))
            .map(|node| node.key.clone());
        let query = self.state.search().query().to_owned();

        let built = build_tree(&dataset);
        self.dataset = dataset;
        self.warnings = built.warnings;
        self.state = TreeState::new(built.tree);
        self.state.set_search(&query);
        if let Some(key) = selected_key {
            self.select_by_key(&key);
        }

        info!(
            nodes = self.state.tree().len(),
            warnings = self.warnings.len(),
            "dataset reloaded"
        );
        self.animator.reset();
        self.relayout(now);
    }

    pub fn toggle(&mut self, id: NodeId, now: f64) -> bool {
        if !self.state.toggle(id) {
            return false;
        }
        self.relayout(now);
        true
    }

    pub fn set_all(&mut self, expanded: bool, scope: ExpandScope, now: f64) -> usize {
        let changed = self.state.set_all(expanded, scope);
        if changed > 0 {
            self.relayout(now);
        }
        changed
    }

    /// Only moves nodes; the camera is left alone until the caller asks for a fit.
    pub fn set_orientation(&mut self, orientation: Orientation, now: f64) -> bool {
        if self.orientation == orientation {
            return false;
        }
        debug!(orientation = orientation.label(), "orientation changed");
        self.orientation = orientation;
        self.relayout(now);
        true
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.state.selected()
    }

    pub fn select(&mut self, id: Option<NodeId>) -> bool {
        self.state.select(id)
    }

    pub fn select_by_key(&mut self, key: &str) -> bool {
        match self.state.tree().find(key) {
            Some(id) => self.state.select(Some(id)),
            None => false,
        }
    }

    pub fn set_search(&mut self, query: &str) {
        self.state.set_search(query);
    }

    pub fn is_dimmed(&self, id: NodeId) -> bool {
        self.state.is_dimmed(id)
    }

    pub fn search_results(&self) -> Vec<NodeId> {
        self.state.search_results()
    }

    /// Queues a camera command for the next [`frame`](Self::frame).
    ///
    /// Returns `false` and drops the command while an earlier one has not been
    /// handled yet.
    pub fn request_zoom(&mut self, command: ZoomCommand) -> bool {
        if self.pending_zoom.is_some() {
            debug!(command = command.label(), "zoom command dropped");
            return false;
        }
        self.pending_zoom = Some(command);
        true
    }

    pub fn pending_zoom(&self) -> Option<ZoomCommand> {
        self.pending_zoom
    }

    pub fn pan_by(&mut self, delta: Vec2, now: f64) {
        self.camera.pan_by(delta, now);
    }

    pub fn zoom_at(&mut self, pointer: Pos2, scroll: f32, viewport: Rect, now: f64) {
        self.camera.zoom_at(pointer, scroll, viewport, now);
    }

    pub fn frame(&mut self, now: f64, viewport: Rect) -> RenderFrame {
        self.last_frame = now;
        self.camera.center_initial(viewport);

        if let Some(command) = self.pending_zoom.take() {
            self.camera.apply(command, viewport, self.orientation, now);
            if let Some(callback) = self.on_zoom_handled.as_mut() {
                callback(command);
            }
        }
        self.camera.tick(now);

        if !self.animator.is_settled() && !self.animator.is_animating(now) {
            self.animator.settle(self.state.tree_mut());
        }

        let samples = self.animator.sample(now);
        let by_id = samples
            .iter()
            .map(|sample| (sample.id, *sample))
            .collect::<HashMap<_, _>>();

        let nodes = samples
            .iter()
            .filter_map(|sample| self.node_visual(sample))
            .collect::<Vec<_>>();

        let edges = samples
            .iter()
            .filter_map(|child| {
                let parent = self.state.tree().parent(child.id)?;
                let from = by_id.get(&parent)?;
                Some(EdgeVisual {
                    parent,
                    child: child.id,
                    points: route(
                        from.position,
                        child.position,
                        self.orientation,
                        self.config.node_size,
                    ),
                    opacity: child.opacity.min(from.opacity),
                })
            })
            .collect::<Vec<_>>();

        RenderFrame {
            viewport,
            transform: self.camera.transform(now),
            orientation: self.orientation,
            nodes,
            edges,
            animating: self.camera.is_animating(now) || self.animator.is_animating(now),
        }
    }

    /// What sits under `screen` as of the last frame; the toggle button wins
    /// over the node body it overlaps.
    pub fn hit_test(&self, screen: Pos2, viewport: Rect) -> Option<Hit> {
        let world = self
            .camera
            .transform(self.last_frame)
            .screen_to_world(screen, viewport);

        self.animator
            .sample(self.last_frame)
            .iter()
            .rev()
            .filter(|sample| sample.phase != Phase::Exiting && sample.opacity >= HIT_OPACITY)
            .find_map(|sample| {
                let node = self.state.tree().node(sample.id)?;
                let size = self.config.node_size;
                if node.has_children()
                    && toggle_center(sample.position, self.orientation, size).distance(world)
                        <= TOGGLE_RADIUS
                {
                    return Some(Hit::Toggle(sample.id));
                }
                node_rect(sample.position, self.orientation, size)
                    .contains(world)
                    .then_some(Hit::Node(sample.id))
            })
    }

    /// Node body selects and reports the node; the button toggles it.
    pub fn activate(&mut self, hit: Hit, now: f64) {
        match hit {
            Hit::Node(id) => {
                self.state.select(Some(id));
                if let Some(callback) = self.on_node_selected.as_mut() {
                    callback(Some(id));
                }
            }
            Hit::Toggle(id) => {
                self.toggle(id, now);
            }
        }
    }

    /// Dataset record behind a tree node; `None` for the root and clusters.
    pub fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        let node = self.state.tree().node(id)?;
        match node.kind {
            NodeKind::Leaf => self.dataset.node(&node.key),
            NodeKind::Root | NodeKind::Cluster => None,
        }
    }

    pub fn cluster_record(&self, id: NodeId) -> Option<&ClusterRecord> {
        let cluster = self.state.tree().cluster_of(id)?;
        self.dataset.cluster(&self.state.tree().node(cluster)?.key)
    }

    /// `(incoming, outgoing)` relationship edges of a node.
    pub fn relationships_of(&self, id: NodeId) -> (Vec<&RelationshipEdge>, Vec<&RelationshipEdge>) {
        match self.state.tree().node(id) {
            Some(node) => (
                self.dataset.incoming(&node.key),
                self.dataset.outgoing(&node.key),
            ),
            None => (Vec::new(), Vec::new()),
        }
    }

    fn node_visual(&self, sample: &AnimatedNode) -> Option<NodeVisual> {
        let node = self.state.tree().node(sample.id)?;
        let size = self.config.node_size;
        let toggle = node.has_children().then_some(if node.expanded {
            ToggleState::Expanded
        } else {
            ToggleState::Collapsed
        });

        Some(NodeVisual {
            id: sample.id,
            kind: node.kind,
            position: sample.position,
            rect: node_rect(sample.position, self.orientation, size),
            toggle_center: toggle_center(sample.position, self.orientation, size),
            opacity: sample.opacity,
            phase: sample.phase,
            selected: self.state.selected() == Some(sample.id),
            dimmed: self.state.is_dimmed(sample.id),
            toggle,
        })
    }

    fn relayout(&mut self, now: f64) {
        let visible = self.state.visible_ids();
        let placed = layout(
            self.state.tree().root(),
            |id| self.state.visible_children(id),
            self.orientation,
            &self.config,
        );
        self.animator
            .begin(self.state.tree_mut(), &visible, &placed, now);
        self.layout = placed;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::dataset::parse_dataset;

    fn engine() -> MapEngine {
        let dataset = parse_dataset(
            r##"{
                "clusters": [
                    { "id": "C1", "name": "One", "color": "#ff0000" },
                    { "id": "C2", "name": "Two", "color": "#00ff00" }
                ],
                "nodes": [
                    { "id": "A", "parent": "C1", "name": "Alpha" },
                    { "id": "B", "parent": "C1", "name": "Beta" }
                ],
                "edges": [
                    { "id": "E1", "source": "A", "target": "B", "type": "enables" }
                ]
            }"##,
        )
        .unwrap();
        MapEngine::new(dataset, EngineConfig::default(), Orientation::Horizontal, 0.0)
    }

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(1200.0, 800.0))
    }

    #[test]
    fn first_frame_grows_clusters_out_of_the_root() {
        let mut engine = engine();
        let frame = engine.frame(0.0, viewport());

        assert_eq!(frame.nodes.len(), 3);
        assert_eq!(frame.edges.len(), 2);
        assert!(frame.animating);
        for node in &frame.nodes {
            assert_eq!(node.position, Pos2::ZERO);
        }

        let settled = engine.frame(1.0, viewport());
        assert!(!settled.animating);
        assert!(settled.nodes.iter().all(|node| node.opacity == 1.0));
    }

    #[test]
    fn zoom_handshake_consumes_one_command_per_frame() {
        let mut engine = engine();
        let handled = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&handled);
        engine.on_zoom_handled(move |command| sink.borrow_mut().push(command));

        assert!(engine.request_zoom(ZoomCommand::In));
        assert!(!engine.request_zoom(ZoomCommand::Out));
        engine.frame(0.0, viewport());

        assert_eq!(*handled.borrow(), vec![ZoomCommand::In]);
        assert_eq!(engine.pending_zoom(), None);
        assert!(engine.request_zoom(ZoomCommand::Fit));
    }

    #[test]
    fn clicking_a_body_selects_and_clicking_the_button_toggles() {
        let mut engine = engine();
        let reported = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&reported);
        engine.on_node_selected(move |id| *sink.borrow_mut() = Some(id));

        let frame = engine.frame(10.0, viewport());
        let c1 = engine.tree().find("C1").unwrap();
        let visual = *frame.node(c1).unwrap();

        let body = frame.to_screen(visual.rect.center());
        let hit = engine.hit_test(body, viewport());
        assert_eq!(hit, Some(Hit::Node(c1)));
        engine.activate(Hit::Node(c1), 10.0);
        assert_eq!(engine.selected(), Some(c1));
        assert_eq!(*reported.borrow(), Some(Some(c1)));
        assert!(!engine.tree().node(c1).unwrap().expanded);

        let button = frame.to_screen(visual.toggle_center);
        assert_eq!(engine.hit_test(button, viewport()), Some(Hit::Toggle(c1)));
        engine.activate(Hit::Toggle(c1), 10.0);
        assert!(engine.tree().node(c1).unwrap().expanded);
        assert_eq!(engine.selected(), Some(c1));
    }

    #[test]
    fn empty_canvas_hits_nothing() {
        let mut engine = engine();
        engine.frame(10.0, viewport());
        assert_eq!(engine.hit_test(pos2(1.0, 1.0), viewport()), None);
    }

    #[test]
    fn reload_keeps_selection_and_resets_collapse_state() {
        let mut engine = engine();
        let c1 = engine.tree().find("C1").unwrap();
        engine.toggle(c1, 0.0);
        engine.select_by_key("B");

        let dataset = engine.dataset().clone();
        engine.reload(dataset, 1.0);

        let c1 = engine.tree().find("C1").unwrap();
        assert!(!engine.tree().node(c1).unwrap().expanded);
        assert_eq!(engine.selected(), engine.tree().find("B"));
    }

    #[test]
    fn relationships_are_listed_both_ways() {
        let engine = engine();
        let a = engine.tree().find("A").unwrap();
        let b = engine.tree().find("B").unwrap();

        let (incoming, outgoing) = engine.relationships_of(a);
        assert!(incoming.is_empty());
        assert_eq!(outgoing.len(), 1);
        assert_eq!(engine.relationships_of(b).0[0].id, "E1");
        assert_eq!(engine.record(a).map(|record| record.name.as_str()), Some("Alpha"));
        assert_eq!(engine.cluster_record(a).map(|cluster| cluster.id.as_str()), Some("C1"));
    }
}
