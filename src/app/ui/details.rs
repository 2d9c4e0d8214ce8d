use eframe::egui::{self, Color32, RichText, Ui};
use knowledge_map::engine::NodeKind;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let mut close = false;
        let mut jump_to = None;

        ui.horizontal(|ui| {
            ui.heading("Node Details");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("✕").clicked() {
                    close = true;
                }
            });
        });
        ui.add_space(6.0);

        let Some(selected) = self.engine.selected() else {
            ui.label("Select a node on the map.");
            return;
        };
        let Some(node) = self.engine.tree().node(selected) else {
            ui.label("Selected node no longer exists.");
            return;
        };

        if let Some(cluster) = self.engine.cluster_record(selected) {
            ui.label(
                RichText::new(cluster.name.as_str())
                    .color(Color32::BLACK)
                    .background_color(node.accent)
                    .small(),
            );
        }
        ui.label(RichText::new(node.display_name.as_str()).strong().size(18.0));
        ui.small(format!("{} · {}", node.key, node.kind.label()));
        ui.add_space(6.0);

        match self.engine.record(selected) {
            Some(record) => {
                if !record.one_liner.is_empty() {
                    ui.label(record.one_liner.as_str());
                }
                ui.label(format!("Difficulty: {}/5", record.difficulty));
                if !record.tags.is_empty() {
                    ui.label(format!("Tags: {}", record.tags.join(", ")));
                }
                if !record.keywords.is_empty() {
                    ui.small(format!("Keywords: {}", record.keywords.join(", ")));
                }
                if !record.prerequisites.is_empty() {
                    ui.horizontal_wrapped(|ui| {
                        ui.label("Prerequisites:");
                        for prerequisite in &record.prerequisites {
                            if ui.link(prerequisite.as_str()).clicked() {
                                jump_to = Some(prerequisite.clone());
                            }
                        }
                    });
                }
            }
            None => {
                let children = self.engine.tree().children(selected).len();
                let noun = match node.kind {
                    NodeKind::Root => "clusters",
                    NodeKind::Cluster | NodeKind::Leaf => "topics",
                };
                ui.label(node.subtitle.as_str());
                ui.label(format!("{children} {noun}"));
            }
        }

        let dataset = self.engine.dataset();
        let name_of = |key: &str| {
            dataset
                .node(key)
                .map_or_else(|| key.to_owned(), |record| record.name.clone())
        };
        let (incoming, outgoing) = self.engine.relationships_of(selected);

        ui.separator();
        ui.label(RichText::new("Relationships").strong());
        if incoming.is_empty() && outgoing.is_empty() {
            ui.small("None recorded.");
        }
        for edge in &incoming {
            ui.horizontal(|ui| {
                ui.label("←");
                if ui.link(name_of(&edge.source)).clicked() {
                    jump_to = Some(edge.source.clone());
                }
                ui.small(edge.kind.label());
            });
        }
        for edge in &outgoing {
            ui.horizontal(|ui| {
                ui.label("→");
                if ui.link(name_of(&edge.target)).clicked() {
                    jump_to = Some(edge.target.clone());
                }
                ui.small(edge.kind.label());
            });
        }

        let references = dataset.references_of(&node.key);
        if !references.is_empty() {
            ui.separator();
            ui.label(RichText::new("References").strong());
            egui::ScrollArea::vertical().show(ui, |ui| {
                for reference in references {
                    ui.label(RichText::new(reference.title.as_str()).strong());
                    ui.small(reference.byline());
                    if let Some(url) = &reference.url {
                        ui.hyperlink_to(url.as_str(), url.as_str());
                    }
                    ui.add_space(4.0);
                }
            });
        }

        if close {
            self.engine.select(None);
            self.details_open.set(false);
        } else if let Some(key) = jump_to {
            self.focus_node(&key);
        }
    }
}
