use eframe::egui::{self, Align, Layout, RichText, Ui};
use knowledge_map::engine::{ExpandScope, ZoomCommand};
use tracing::debug;

use super::super::ViewModel;

const SEARCH_RESULT_ROWS: usize = 60;

impl ViewModel {
    pub(in crate::app) fn draw_command_bar(
        &mut self,
        ui: &mut Ui,
        now: f64,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        ui.horizontal(|ui| {
            let root = self.engine.tree().root();
            let title = self
                .engine
                .tree()
                .node(root)
                .map(|node| node.display_name.clone())
                .unwrap_or_default();
            ui.heading(title);
            ui.separator();

            let search = ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Search nodes")
                    .desired_width(220.0),
            );
            if search.changed() {
                self.engine.set_search(&self.search);
            }
            if !self.search.is_empty() && ui.small_button("✕").clicked() {
                self.search.clear();
                self.engine.set_search("");
            }
            ui.separator();

            let zoom_idle = self.queued_zoom.is_none() && !self.zoom_in_flight.get();
            if ui
                .add_enabled(zoom_idle, egui::Button::new("＋"))
                .on_hover_text("Zoom in")
                .clicked()
            {
                self.issue_zoom(ZoomCommand::In);
            }
            if ui
                .add_enabled(zoom_idle, egui::Button::new("－"))
                .on_hover_text("Zoom out")
                .clicked()
            {
                self.issue_zoom(ZoomCommand::Out);
            }
            if ui.add_enabled(zoom_idle, egui::Button::new("Fit")).clicked() {
                self.issue_zoom(ZoomCommand::Fit);
            }

            let orientation = self.engine.orientation();
            if ui
                .button(format!("Layout: {}", orientation.label()))
                .on_hover_text("Flip the tree and refit")
                .clicked()
            {
                self.engine.set_orientation(orientation.flipped(), now);
                self.issue_zoom(ZoomCommand::Fit);
            }
            ui.separator();

            if ui.button("Expand all").clicked() {
                self.engine.set_all(true, ExpandScope::Everything, now);
            }
            if ui.button("Collapse all").clicked() {
                self.engine.set_all(false, ExpandScope::Descendants(root), now);
            }
            ui.separator();

            ui.toggle_value(&mut self.show_legend, "Legend");
            if ui.button(format!("Theme: {}", self.theme.label())).clicked() {
                self.theme = self.theme.toggled();
                self.theme.apply(ui.ctx());
                debug!(theme = self.theme.label(), "theme changed");
            }
            let reload_button = ui.add_enabled(!is_reloading, egui::Button::new("Reload dataset"));
            if reload_button.clicked() {
                *reload_requested = true;
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let warnings = self.engine.warnings();
                if !warnings.is_empty() {
                    let summary = warnings
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n");
                    ui.label(
                        RichText::new(format!("⚠ {} data warnings", warnings.len()))
                            .color(ui.visuals().warn_fg_color),
                    )
                    .on_hover_text(summary);
                }
                ui.label(format!("nodes: {}", self.engine.tree().len()));
                ui.label(format!("source: {}", self.source_label));
            });
        });
    }

    pub(in crate::app) fn draw_search_results(&mut self, ui: &mut Ui) {
        let results = self.engine.search_results();
        ui.heading("Matches");
        ui.small(format!("{} for \"{}\"", results.len(), self.search.trim()));
        ui.separator();

        let mut picked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for id in results.iter().take(SEARCH_RESULT_ROWS) {
                let Some(node) = self.engine.tree().node(*id) else {
                    continue;
                };
                let selected = self.engine.selected() == Some(*id);
                let label = format!("{}  {}", node.key, node.display_name);
                if ui.selectable_label(selected, label).clicked() {
                    picked = Some(node.key.clone());
                }
            }
            if results.len() > SEARCH_RESULT_ROWS {
                ui.small(format!("… {} more", results.len() - SEARCH_RESULT_ROWS));
            }
        });

        if let Some(key) = picked {
            self.focus_node(&key);
        }
    }
}
