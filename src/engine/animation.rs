use std::collections::{HashMap, HashSet};

use eframe::egui::Pos2;
use eframe::egui::emath::easing;
use tracing::trace;

use super::hierarchy::{MapTree, NodeId};
use super::layout::TreeLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Entering,
    Updating,
    Exiting,
}

/// Three-way split between the previous and the current visible set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityDiff {
    /// In current visible order.
    pub entering: Vec<NodeId>,
    /// In current visible order.
    pub updating: Vec<NodeId>,
    /// Sorted by handle.
    pub exiting: Vec<NodeId>,
}

impl VisibilityDiff {
    pub fn between(previous: &HashSet<NodeId>, current: &[NodeId]) -> Self {
        let (updating, entering) = current
            .iter()
            .copied()
            .partition::<Vec<_>, _>(|id| previous.contains(id));

        let current_set = current.iter().copied().collect::<HashSet<_>>();
        let mut exiting = previous
            .iter()
            .copied()
            .filter(|id| !current_set.contains(id))
            .collect::<Vec<_>>();
        exiting.sort_unstable();

        Self {
            entering,
            updating,
            exiting,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.exiting.is_empty()
    }
}

/// One node's sampled state at a point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedNode {
    pub id: NodeId,
    pub position: Pos2,
    pub opacity: f32,
    pub phase: Phase,
}

#[derive(Clone, Copy, Debug)]
struct Track {
    phase: Phase,
    from: Pos2,
    to: Pos2,
    from_opacity: f32,
    to_opacity: f32,
}

impl Track {
    fn at(&self, t: f32) -> (Pos2, f32) {
        let position = self.from.lerp(self.to, t);
        let opacity = self.from_opacity + (self.to_opacity - self.from_opacity) * t;
        (position, opacity)
    }
}

#[derive(Clone, Copy, Debug)]
struct Clock {
    start: f64,
    duration: f64,
}

impl Clock {
    fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0) as f32
    }
}

/// Per-node enter/update/exit tweens driven by one shared clock.
///
/// The animator's memory is the last visible set and the tracks it started
/// from it. Each [`begin`](Self::begin) samples the tracks at `now` first, so a
/// structural change arriving mid-transition continues from where nodes are on
/// screen instead of jumping back to where they started.
#[derive(Clone, Debug)]
pub struct TransitionAnimator {
    duration: f64,
    tracks: HashMap<NodeId, Track>,
    draw_order: Vec<NodeId>,
    previous_visible: HashSet<NodeId>,
    clock: Option<Clock>,
}

impl TransitionAnimator {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            tracks: HashMap::new(),
            draw_order: Vec::new(),
            previous_visible: HashSet::new(),
            clock: None,
        }
    }

    pub fn previous_visible(&self) -> &HashSet<NodeId> {
        &self.previous_visible
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.clock.is_some_and(|clock| clock.progress(now) < 1.0)
    }

    /// No transition has been started since the last [`settle`](Self::settle).
    pub fn is_settled(&self) -> bool {
        self.clock.is_none()
    }

    /// Linear progress of the running transition; 1.0 when idle.
    pub fn progress(&self, now: f64) -> f32 {
        self.clock.map_or(1.0, |clock| clock.progress(now))
    }

    /// Forgets everything, so the next [`begin`](Self::begin) treats every node as entering.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.draw_order.clear();
        self.previous_visible.clear();
        self.clock = None;
    }

    /// Starts a transition towards `layout` for the nodes in `visible`.
    pub fn begin(
        &mut self,
        tree: &mut MapTree,
        visible: &[NodeId],
        layout: &TreeLayout,
        now: f64,
    ) -> VisibilityDiff {
        let sampled = self
            .sample(now)
            .into_iter()
            .map(|node| (node.id, node))
            .collect::<HashMap<_, _>>();
        let diff = VisibilityDiff::between(&self.previous_visible, visible);
        let visible_set = visible.iter().copied().collect::<HashSet<_>>();

        let mut tracks = HashMap::with_capacity(visible.len() + diff.exiting.len());

        for &id in visible {
            let Some(to) = layout.position(id) else {
                continue;
            };
            let track = match sampled.get(&id) {
                Some(current) => Track {
                    phase: if current.phase == Phase::Exiting {
                        Phase::Entering
                    } else if self.previous_visible.contains(&id) {
                        Phase::Updating
                    } else {
                        current.phase
                    },
                    from: current.position,
                    to,
                    from_opacity: current.opacity,
                    to_opacity: 1.0,
                },
                None => {
                    let birth = tree
                        .ancestors(id)
                        .find_map(|ancestor| {
                            sampled
                                .get(&ancestor)
                                .map(|node| node.position)
                                .or_else(|| layout.position(ancestor))
                        })
                        .unwrap_or(to);
                    Track {
                        phase: Phase::Entering,
                        from: birth,
                        to,
                        from_opacity: 0.0,
                        to_opacity: 1.0,
                    }
                }
            };

            if let Some(node) = tree.node_mut(id) {
                node.previous_position = track.from;
                node.position = to;
            }
            tracks.insert(id, track);
        }

        // Nodes leaving now, plus nodes still fading out from an earlier change.
        let mut leaving = diff.exiting.clone();
        leaving.extend(
            self.draw_order
                .iter()
                .copied()
                .filter(|id| {
                    !visible_set.contains(id)
                        && !self.previous_visible.contains(id)
                        && sampled.contains_key(id)
                }),
        );

        for &id in &leaving {
            let Some(current) = sampled.get(&id) else {
                continue;
            };
            let to = tree
                .ancestors(id)
                .find(|ancestor| visible_set.contains(ancestor))
                .and_then(|ancestor| layout.position(ancestor))
                .unwrap_or(current.position);
            tracks.insert(
                id,
                Track {
                    phase: Phase::Exiting,
                    from: current.position,
                    to,
                    from_opacity: current.opacity,
                    to_opacity: 0.0,
                },
            );
        }

        trace!(
            entering = diff.entering.len(),
            updating = diff.updating.len(),
            exiting = leaving.len(),
            "transition started"
        );

        self.draw_order = leaving
            .into_iter()
            .filter(|id| tracks.contains_key(id))
            .chain(visible.iter().copied().filter(|id| tracks.contains_key(id)))
            .collect();
        self.tracks = tracks;
        self.previous_visible = visible_set;
        self.clock = Some(Clock {
            start: now,
            duration: self.duration,
        });

        diff
    }

    /// Every tracked node at `now`, exiting nodes first so survivors draw on top.
    pub fn sample(&self, now: f64) -> Vec<AnimatedNode> {
        let t = easing::cubic_in_out(self.progress(now));
        self.draw_order
            .iter()
            .filter_map(|id| self.sample_at(*id, t))
            .collect()
    }

    pub fn sample_node(&self, id: NodeId, now: f64) -> Option<AnimatedNode> {
        self.sample_at(id, easing::cubic_in_out(self.progress(now)))
    }

    /// Ends the running transition: drops faded-out nodes and commits
    /// `previous_position` for everything still visible.
    pub fn settle(&mut self, tree: &mut MapTree) {
        self.tracks.retain(|_, track| track.phase != Phase::Exiting);
        self.draw_order.retain(|id| self.tracks.contains_key(id));

        for (id, track) in &mut self.tracks {
            track.phase = Phase::Updating;
            track.from = track.to;
            track.from_opacity = track.to_opacity;
            if let Some(node) = tree.node_mut(*id) {
                node.previous_position = node.position;
            }
        }
        self.clock = None;
    }

    fn sample_at(&self, id: NodeId, t: f32) -> Option<AnimatedNode> {
        let track = self.tracks.get(&id)?;
        let (position, opacity) = track.at(t);
        Some(AnimatedNode {
            id,
            position,
            opacity,
            phase: track.phase,
        })
    }
}
